//! Collaborators shared by form models and field builders.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::access::AccessGate;
use crate::config::FormConfig;
use crate::routing::{RouteTable, UrlGenerator};
use crate::theme::Theme;
use crate::validation::{RequestValidator, RuleValidator};

/// Handle to the services a form needs: theme, gate, URLs, and validator.
///
/// Cloning is cheap; all collaborators are shared.
#[derive(Clone)]
pub struct Services {
    config: Arc<FormConfig>,
    theme: Arc<Theme>,
    access: AccessGate,
    urls: Arc<dyn UrlGenerator>,
    validator: Arc<dyn RequestValidator>,
}

impl Services {
    /// Build the default service set from configuration.
    pub fn new(config: FormConfig) -> Result<Self> {
        let theme = Theme::new(&config)?;
        let urls = RouteTable::new(&config.base_url)?;

        Ok(Self {
            config: Arc::new(config),
            theme: Arc::new(theme),
            access: AccessGate::new(),
            urls: Arc::new(urls),
            validator: Arc::new(RuleValidator::new()),
        })
    }

    /// Replace the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Arc::new(theme);
        self
    }

    /// Replace the access gate.
    pub fn with_access(mut self, access: AccessGate) -> Self {
        self.access = access;
        self
    }

    /// Replace the route URL generator.
    pub fn with_urls(mut self, urls: impl UrlGenerator + 'static) -> Self {
        self.urls = Arc::new(urls);
        self
    }

    /// Replace the request validator.
    pub fn with_validator(mut self, validator: impl RequestValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn access(&self) -> &AccessGate {
        &self.access
    }

    pub fn urls(&self) -> &dyn UrlGenerator {
        self.urls.as_ref()
    }

    pub fn validator(&self) -> &dyn RequestValidator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("theme", &self.theme)
            .field("access", &self.access)
            .finish()
    }
}
