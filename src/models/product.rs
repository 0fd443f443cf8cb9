//! Catalog product records and the edit-form draft used to create or
//! update them.

use serde::{Deserialize, Serialize};

use super::FormErrors;

/// Separator between image URLs in the `image` field.
const IMAGE_SEPARATOR: &str = " ";

/// A product as the catalog API returns it.
// Note: the API is loose about types; ids, prices and stock arrive as either
// strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: String,
    #[serde(
        default,
        deserialize_with = "deserialize_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Older records carry their images here instead of `image`.
    #[serde(rename = "imageUrl", default, skip_serializing)]
    pub image_url: Option<String>,
}

impl Product {
    /// Space-joined image URLs, preferring `image` over the legacy field.
    pub fn image_field(&self) -> &str {
        self.image
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.image_url.as_deref())
            .unwrap_or("")
    }

    pub fn image_urls(&self) -> Vec<String> {
        split_image_urls(self.image_field())
    }

    pub fn first_image(&self) -> Option<String> {
        self.image_urls().into_iter().next()
    }
}

/// Form state for adding or editing a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub product_name: String,
    pub description: String,
    pub price: String,
    pub categories: String,
    pub stock: String,
    pub image_urls: Vec<String>,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_name: product.product_name.clone(),
            description: product.description.clone(),
            price: product.price.clone().unwrap_or_default(),
            categories: product.categories.clone(),
            stock: product.stock.clone().unwrap_or_default(),
            image_urls: product.image_urls(),
        }
    }

    /// Wire value for the `image` field.
    pub fn image(&self) -> String {
        self.image_urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .collect::<Vec<_>>()
            .join(IMAGE_SEPARATOR)
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.require("product_name", &self.product_name, "Name is required");
        errors.require("description", &self.description, "Description is required");
        errors.require("price", &self.price, "Price is required");
        errors.require("categories", &self.categories, "Categories are required");
        errors.require("stock", &self.stock, "Stock is required");
        errors.require("image", &self.image(), "At least one image URL is required");
        errors.into_result()
    }

    /// Request body for create (`id = None`) or update.
    pub fn to_product(&self, id: Option<&str>) -> Product {
        Product {
            id: id.map(str::to_string),
            product_name: self.product_name.trim().to_string(),
            description: self.description.clone(),
            price: Some(self.price.trim().to_string()),
            categories: self.categories.trim().to_string(),
            stock: Some(self.stock.trim().to_string()),
            image: Some(self.image()),
            image_url: None,
        }
    }
}

fn split_image_urls(field: &str) -> Vec<String> {
    field
        .split(IMAGE_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Helper to deserialize string or number as Option<String>
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}
