//! Admin client for a small e-commerce catalog API.
//!
//! The interesting part is the local session gate: a login exchanges
//! credentials for a bearer token that is stored with an absolute 5 minute
//! expiry, and every protected view checks that session before it renders.
//!
//! - `auth`: session store, auth gate, login flow, password digest
//! - `router`: views and the route guard
//! - `scope`: disposal-aware scope for view network calls
//! - `api`: HTTP client for the catalog API
//! - `models`: products and branding settings
//! - `app`: composition root
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod scope;
pub mod utils;
