//! REST API client module for the catalog admin backend.
//!
//! This module provides the `ApiClient` for logging in, managing products
//! and reading or saving branding settings. The backend is an external
//! service; its base URL comes from configuration.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
