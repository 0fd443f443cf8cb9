//! API client for the catalog admin REST API.
//!
//! This module provides the `ApiClient` struct for logging in and for the
//! product and branding-settings endpoints.

use std::time::Duration;

use futures::future;
use reqwest::{header, Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{BrandingSettings, Product};

use super::ApiError;

const PRODUCTS_PATH: &str = "products";

/// Branding settings endpoint paths
const TITLE_PATH: &str = "titulo";
const LOGO_PATH: &str = "logo";
const BANNER_PATH: &str = "cintillo";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    user: &'a str,
    pass: &'a str,
}

#[derive(Debug, Serialize)]
struct SettingValue<'a> {
    valor: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct TitleResponse {
    #[serde(default)]
    titulo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LogoResponse {
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BannerResponse {
    #[serde(default)]
    cintillo: Option<String>,
}

/// Client for the catalog admin API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`. `timeout` of `None` keeps the
    /// transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Append `segments` to the base URL, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidRequest(format!("Invalid path segment {:?}", bad)));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Unusable token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, method = %method, "Sending JSON");
        let response = self
            .client
            .request(method, url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Login =====

    /// Exchange a username and password digest for a login response.
    ///
    /// Only `200 OK` counts as success; the whole JSON body is returned.
    pub async fn login(&self, user: &str, pass_digest: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["login"])?;
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&LoginRequest {
                user,
                pass: pass_digest,
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        Ok(response.json().await?)
    }

    // ===== Products =====

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(&[PRODUCTS_PATH]).await
    }

    pub async fn create_product(&self, product: &Product) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::POST, &[PRODUCTS_PATH], product)
            .await
    }

    pub async fn update_product(&self, id: &str, product: &Product) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::PUT, &[PRODUCTS_PATH, id], product)
            .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&[PRODUCTS_PATH, id])?;
        let response = self
            .client
            .delete(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Branding settings =====

    /// Fetch title, logo and banner concurrently. Missing fields read as empty.
    pub async fn fetch_settings(&self) -> Result<BrandingSettings, ApiError> {
        let (title, logo, banner) = future::try_join3(
            self.get::<TitleResponse>(&[TITLE_PATH]),
            self.get::<LogoResponse>(&[LOGO_PATH]),
            self.get::<BannerResponse>(&[BANNER_PATH]),
        )
        .await?;

        Ok(BrandingSettings {
            title: title.titulo.unwrap_or_default(),
            logo: logo.logo.unwrap_or_default(),
            banner: banner.cintillo.unwrap_or_default(),
        })
    }

    /// Save all three settings concurrently. Every request runs to
    /// completion; the first failure is returned.
    pub async fn save_settings(&self, settings: &BrandingSettings) -> Result<(), ApiError> {
        let (title, logo, banner) = future::join3(
            self.send_json(
                reqwest::Method::POST,
                &[TITLE_PATH],
                &SettingValue {
                    valor: &settings.title,
                },
            ),
            self.send_json(
                reqwest::Method::POST,
                &[LOGO_PATH],
                &SettingValue {
                    valor: &settings.logo,
                },
            ),
            self.send_json(
                reqwest::Method::POST,
                &[BANNER_PATH],
                &SettingValue {
                    valor: &settings.banner,
                },
            ),
        )
        .await;

        title?;
        logo?;
        banner?;
        Ok(())
    }
}
