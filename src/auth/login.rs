use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

use super::clock::Clock;
use super::digest::legacy_credential_transform;
use super::session::{Session, SessionStore};

/// Session lifetime from issuance. Absolute; nothing renews it.
pub const SESSION_TTL_MINUTES: i64 = 5;

/// User-facing copy for every credential or transport failure.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Username and password required")]
    MissingCredentials,

    /// The endpoint answered with anything but 200.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials(#[source] ApiError),

    /// 200, but no usable `token` in the body.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    MissingToken,

    /// No HTTP response at all. Shown with the same copy as a rejection.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    TransientNetworkFailure(#[source] ApiError),

    #[error("Failed to save session: {0}")]
    Storage(#[source] anyhow::Error),

    /// The view was disposed before the exchange finished; nothing was stored.
    #[error("Login cancelled")]
    Cancelled,
}

impl LoginError {
    /// Short tag for logs, where the variants must stay distinguishable.
    pub fn kind(&self) -> &'static str {
        match self {
            LoginError::MissingCredentials => "missing_credentials",
            LoginError::InvalidCredentials(_) => "invalid_credentials",
            LoginError::MissingToken => "missing_token",
            LoginError::TransientNetworkFailure(_) => "transient_network_failure",
            LoginError::Storage(_) => "storage",
            LoginError::Cancelled => "cancelled",
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Turns user-entered credentials into a stored session.
///
/// The flow never navigates; callers act on the returned result.
#[derive(Clone)]
pub struct LoginFlow {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl LoginFlow {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            store,
            clock,
            ttl: Duration::minutes(SESSION_TTL_MINUTES),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let digest = legacy_credential_transform(password);
        let body = match self.api.login(username, &digest).await {
            Ok(body) => body,
            Err(e) => {
                let err = if e.is_transport() {
                    LoginError::TransientNetworkFailure(e)
                } else {
                    LoginError::InvalidCredentials(e)
                };
                warn!(kind = err.kind(), error = ?err, username, "Login failed");
                return Err(err);
            }
        };

        let token = match body.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => {
                warn!(kind = "missing_token", username, "Login response has no token");
                return Err(LoginError::MissingToken);
            }
        };

        let expires_at_ms = self.clock.now_ms() + self.ttl.num_milliseconds();
        let session = Session::new(token, expires_at_ms, Some(body));
        self.store.write(&session).map_err(|e| {
            warn!(kind = "storage", error = %e, "Failed to save session");
            LoginError::Storage(e)
        })?;

        info!(username, expires_at_ms, "Login successful");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_share_user_message() {
        let rejected = LoginError::InvalidCredentials(ApiError::Unauthorized);
        let offline = LoginError::TransientNetworkFailure(ApiError::InvalidResponse(String::new()));
        for err in [rejected, LoginError::MissingToken, offline] {
            assert_eq!(err.user_message(), INVALID_CREDENTIALS_MESSAGE);
        }
        assert_ne!(LoginError::MissingCredentials.user_message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_kind_distinguishes_variants() {
        assert_eq!(LoginError::MissingToken.kind(), "missing_token");
        assert_eq!(
            LoginError::InvalidCredentials(ApiError::Unauthorized).kind(),
            "invalid_credentials"
        );
    }
}
