use serde::{Deserialize, Serialize};

use super::FormErrors;

/// Business branding shown on the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingSettings {
    /// Business name (`titulo`).
    pub title: String,
    /// Logo image URL (`logo`).
    pub logo: String,
    /// Promotional banner, rich-text HTML (`cintillo`).
    pub banner: String,
}

impl BrandingSettings {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.require("title", &self.title, "Business name is required");
        errors.require("logo", &self.logo, "Logo URL is required");
        errors.into_result()
    }

    /// Apply the fields that were given, leaving the rest as they are.
    pub fn merged(
        &self,
        title: Option<String>,
        logo: Option<String>,
        banner: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| self.title.clone()),
            logo: logo.unwrap_or_else(|| self.logo.clone()),
            banner: banner.unwrap_or_else(|| self.banner.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_is_optional() {
        let settings = BrandingSettings {
            title: "Tienda".to_string(),
            logo: "https://cdn/logo.png".to_string(),
            banner: String::new(),
        };
        assert!(settings.validate().is_ok());

        let errors = BrandingSettings::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_merged_keeps_unset_fields() {
        let current = BrandingSettings {
            title: "Old".to_string(),
            logo: "https://cdn/logo.png".to_string(),
            banner: "<p>Sale</p>".to_string(),
        };
        let next = current.merged(Some("New".to_string()), None, Some(String::new()));
        assert_eq!(next.title, "New");
        assert_eq!(next.logo, current.logo);
        assert_eq!(next.banner, "");
    }
}
