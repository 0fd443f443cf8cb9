//! Application state management for shopadmin.
//!
//! This module contains the `App` struct that wires the session store, auth
//! gate, login flow and route guard together, and runs the product and
//! settings operations behind the guard.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{
    AuthGate, Clock, FileSessionStore, GateStatus, KeyringSessionStore, LoginError, LoginFlow,
    Session, SessionStore, SystemClock,
};
use crate::config::{Config, SessionBackend};
use crate::models::{BrandingSettings, FormErrors, Product, ProductDraft};
use crate::router::{AuthState, Navigation, RouteGuard, View};
use crate::scope::ViewScope;

/// Failure of a view operation, with user-facing copy as its message.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Session expired or missing, please log in")]
    SessionRequired,

    #[error("{0}")]
    Invalid(FormErrors),

    #[error("{message}")]
    Api {
        message: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Request cancelled")]
    Cancelled,
}

impl ViewError {
    fn api(message: &'static str, source: ApiError) -> Self {
        error!(error = %source, transport = source.is_transport(), "{}", message);
        ViewError::Api { message, source }
    }
}

/// Main application state container
pub struct App {
    pub config: Config,
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    guard: RouteGuard,
    login_flow: LoginFlow,
    /// Write `last_username` back to the config file after login.
    persist_config: bool,

    /// View the user is currently on.
    pub current_view: View,
    /// Last product list fetched for the products view.
    pub products: Vec<Product>,
    /// Last settings fetched for the settings view.
    pub settings: Option<BrandingSettings>,
}

impl App {
    /// Create the application from configuration, using the configured
    /// session backend and the system clock.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config.api_url()?, config.request_timeout())?;
        let store: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::File => Arc::new(FileSessionStore::new(config.data_dir()?)),
            SessionBackend::Keyring => Arc::new(KeyringSessionStore::new()?),
        };
        let mut app = Self::with_parts(config, api, store, Arc::new(SystemClock));
        app.persist_config = true;
        Ok(app)
    }

    pub fn with_parts(
        config: Config,
        api: ApiClient,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = AuthGate::new(store.clone(), clock.clone());
        let login_flow = LoginFlow::new(api.clone(), store.clone(), clock);
        Self {
            config,
            api,
            store,
            guard: RouteGuard::new(gate),
            login_flow,
            persist_config: false,
            current_view: View::Login,
            products: Vec::new(),
            settings: None,
        }
    }

    pub fn gate(&self) -> &AuthGate {
        self.guard.gate()
    }

    pub fn auth_state(&self) -> AuthState {
        self.guard.auth_state()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state(), AuthState::Authenticated)
    }

    pub fn session_status(&self) -> GateStatus {
        self.gate().status()
    }

    /// Navigate to `view` through the route guard.
    pub fn navigate(&mut self, view: View) -> Navigation {
        let nav = self.guard.navigate(view);
        self.current_view = nav.view();
        nav
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and move to the landing view.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        scope: &ViewScope,
    ) -> Result<Session, LoginError> {
        let session = match scope.run(self.login_flow.login(username, password)).await {
            Some(result) => result?,
            None => return Err(LoginError::Cancelled),
        };

        self.config.last_username = Some(username.to_string());
        if self.persist_config {
            if let Err(e) = Config::remember_username(username) {
                warn!(error = %e, "Failed to save config");
            }
        }

        self.navigate(View::landing());
        Ok(session)
    }

    /// Clear the stored token and expiry. No API call is made.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear()?;
        self.products.clear();
        self.settings = None;
        self.current_view = View::Login;
        info!("Logged out");
        Ok(())
    }

    /// API client carrying the current bearer token, if the guard lets
    /// `view` render.
    fn authorize(&mut self, view: View) -> Result<ApiClient, ViewError> {
        if self.navigate(view).is_redirect() {
            return Err(ViewError::SessionRequired);
        }
        match self.store.read() {
            Ok(Some(session)) => Ok(self.api.with_token(session.token)),
            Ok(None) => Err(ViewError::SessionRequired),
            Err(e) => {
                warn!(error = %e, "Session unreadable after gate check");
                Err(ViewError::SessionRequired)
            }
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn load_products(&mut self, scope: &ViewScope) -> Result<&[Product], ViewError> {
        let api = self.authorize(View::Products)?;
        let products = scope
            .run(api.list_products())
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error loading products", e))?;
        self.products = products;
        Ok(&self.products)
    }

    pub async fn create_product(
        &mut self,
        draft: &ProductDraft,
        scope: &ViewScope,
    ) -> Result<&[Product], ViewError> {
        draft.validate().map_err(ViewError::Invalid)?;
        let api = self.authorize(View::Products)?;
        let product = draft.to_product(None);
        scope
            .run(api.create_product(&product))
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error saving product", e))?;
        info!(name = %product.product_name, "Product created");
        self.load_products(scope).await
    }

    pub async fn update_product(
        &mut self,
        id: &str,
        draft: &ProductDraft,
        scope: &ViewScope,
    ) -> Result<&[Product], ViewError> {
        draft.validate().map_err(ViewError::Invalid)?;
        let api = self.authorize(View::Products)?;
        let product = draft.to_product(Some(id));
        scope
            .run(api.update_product(id, &product))
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error saving product", e))?;
        info!(id, "Product updated");
        self.load_products(scope).await
    }

    pub async fn delete_product(
        &mut self,
        id: &str,
        scope: &ViewScope,
    ) -> Result<&[Product], ViewError> {
        let api = self.authorize(View::Products)?;
        scope
            .run(api.delete_product(id))
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error deleting product", e))?;
        info!(id, "Product deleted");
        self.load_products(scope).await
    }

    /// Look up a product in the last fetched list.
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_deref() == Some(id))
    }

    // =========================================================================
    // Branding settings
    // =========================================================================

    pub async fn load_settings(&mut self, scope: &ViewScope) -> Result<&BrandingSettings, ViewError> {
        let api = self.authorize(View::Settings)?;
        let settings = scope
            .run(api.fetch_settings())
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error loading settings", e))?;
        Ok(&*self.settings.insert(settings))
    }

    pub async fn save_settings(
        &mut self,
        settings: BrandingSettings,
        scope: &ViewScope,
    ) -> Result<(), ViewError> {
        settings.validate().map_err(ViewError::Invalid)?;
        let api = self.authorize(View::Settings)?;
        scope
            .run(api.save_settings(&settings))
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::api("Error saving settings", e))?;
        info!("Settings saved");
        self.settings = Some(settings);
        Ok(())
    }
}
