//! Data models for catalog entities.
//!
//! - `Product`, `ProductDraft`: catalog records and their edit form
//! - `BrandingSettings`: business title, logo and promotional banner
//! - `FormErrors`: per-field validation messages

pub mod form;
pub mod product;
pub mod settings;

pub use form::FormErrors;
pub use product::{Product, ProductDraft};
pub use settings::BrandingSettings;
