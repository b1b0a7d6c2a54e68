//! Form configuration loaded from environment variables or TOML.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Form layer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Active theme namespace used for `@`-prefixed templates (default: "default").
    pub theme: String,

    /// Template used by `FormModel::render` when none is given (default: "@form").
    pub default_template: String,

    /// Optional directory of templates overriding the built-in ones.
    pub template_dir: Option<PathBuf>,

    /// Whether forms skip HTML5 validation by default (default: false).
    pub novalidate: bool,

    /// Base URL for absolute route URLs (default: "http://localhost").
    pub base_url: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            default_template: "@form".to_string(),
            template_dir: None,
            novalidate: false,
            base_url: "http://localhost".to_string(),
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let theme = env::var("FORMS_THEME").unwrap_or(defaults.theme);

        let default_template =
            env::var("FORMS_DEFAULT_TEMPLATE").unwrap_or(defaults.default_template);

        let template_dir = env::var("FORMS_TEMPLATE_DIR").ok().map(PathBuf::from);

        let novalidate = env::var("FORMS_NOVALIDATE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("FORMS_NOVALIDATE must be true or false")?;

        let base_url = env::var("APP_URL").unwrap_or(defaults.base_url);
        url::Url::parse(&base_url).context("APP_URL must be a valid absolute URL")?;

        Ok(Self {
            theme,
            default_template,
            template_dir,
            novalidate,
            base_url,
        })
    }

    /// Parse configuration from a TOML document. Missing keys use defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("failed to parse form configuration")?;
        url::Url::parse(&config.base_url).context("base_url must be a valid absolute URL")?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.theme, "default");
        assert_eq!(config.default_template, "@form");
        assert!(!config.novalidate);
        assert!(config.template_dir.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = FormConfig::from_toml_str(
            r#"
            theme = "bootstrap"
            novalidate = true
            "#,
        )
        .unwrap();

        assert_eq!(config.theme, "bootstrap");
        assert!(config.novalidate);
        assert_eq!(config.default_template, "@form");
        assert_eq!(config.base_url, "http://localhost");
    }

    #[test]
    fn test_from_toml_rejects_relative_base_url() {
        let result = FormConfig::from_toml_str(r#"base_url = "/relative""#);
        assert!(result.is_err());
    }
}
