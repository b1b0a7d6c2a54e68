//! Theme engine with Tera templates and namespaced name resolution.

use std::collections::HashSet;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::Tera;
use tracing::debug;

use crate::config::FormConfig;
use crate::error::{FormError, FormResult};
use crate::html::HtmlString;

/// Name of the built-in theme every namespaced lookup falls back to.
pub const DEFAULT_THEME: &str = "default";

/// Built-in templates, registered under the `default/` prefix.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("form.html", include_str!("../../templates/default/form.html")),
    ("fields.html", include_str!("../../templates/default/fields.html")),
    (
        "fields/default.html",
        include_str!("../../templates/default/fields/default.html"),
    ),
    (
        "fields/checkbox.html",
        include_str!("../../templates/default/fields/checkbox.html"),
    ),
    (
        "fields/choices.html",
        include_str!("../../templates/default/fields/choices.html"),
    ),
];

/// Theme engine for rendering form templates.
pub struct Theme {
    /// Tera template engine instance.
    tera: Tera,
    /// Active theme namespace.
    name: String,
    /// Cache mapping requested names to resolved template names.
    resolution_cache: DashMap<String, String>,
}

impl Theme {
    /// Create a theme from configuration.
    ///
    /// Templates under `template_dir` are loaded first and take precedence
    /// over the built-in ones.
    pub fn new(config: &FormConfig) -> Result<Self> {
        let mut tera = match &config.template_dir {
            Some(dir) => {
                let pattern = dir.join("**/*.html");
                let pattern_str = pattern
                    .to_str()
                    .context("invalid template directory path")?;
                Tera::new(pattern_str).context("failed to initialize Tera templates")?
            }
            None => Tera::default(),
        };

        Self::register_builtins(&mut tera)?;

        let template_count = tera.get_template_names().count();
        debug!(theme = %config.theme, count = template_count, "loaded templates");

        Ok(Self {
            tera,
            name: config.theme.clone(),
            resolution_cache: DashMap::new(),
        })
    }

    /// Create a theme with only the built-in templates.
    pub fn builtin() -> Result<Self> {
        Self::new(&FormConfig::default())
    }

    /// Register built-in templates that are not overridden on disk.
    fn register_builtins(tera: &mut Tera) -> Result<()> {
        let existing: HashSet<String> = tera.get_template_names().map(str::to_string).collect();

        let builtins: Vec<(String, &str)> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, source)| (format!("{DEFAULT_THEME}/{name}"), *source))
            .filter(|(name, _)| !existing.contains(name))
            .collect();

        tera.add_raw_templates(builtins)
            .context("failed to register built-in form templates")
    }

    /// Active theme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Add a template at runtime.
    pub fn add_raw_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, source)
            .with_context(|| format!("failed to add template {name}"))?;
        self.clear_cache();
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Candidate template names for a requested name, most specific first.
    ///
    /// - `@form` -> `<theme>/form.html`, `default/form.html`
    /// - `@fields.extra` -> `<theme>/fields/extra.html`, `default/fields/extra.html`
    /// - `custom/form` -> `custom/form`, `custom/form.html`
    fn candidates(&self, requested: &str) -> Vec<String> {
        if let Some(namespaced) = requested.strip_prefix('@') {
            let path = namespaced.strip_suffix(".html").unwrap_or(namespaced);
            let path = path.replace('.', "/");
            let mut candidates = vec![format!("{}/{path}.html", self.name)];
            if self.name != DEFAULT_THEME {
                candidates.push(format!("{DEFAULT_THEME}/{path}.html"));
            }
            return candidates;
        }

        if requested.ends_with(".html") {
            vec![requested.to_string()]
        } else {
            vec![requested.to_string(), format!("{requested}.html")]
        }
    }

    /// Resolve the first existing template from a list of requested names.
    ///
    /// Results are cached. Misses are not cached so templates added later
    /// are picked up.
    pub fn resolve(&self, requested: &[&str]) -> Option<String> {
        if requested.is_empty() {
            return None;
        }

        let cache_key = requested.join("|");
        if let Some(cached) = self.resolution_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        let found = requested
            .iter()
            .flat_map(|name| self.candidates(name))
            .find(|candidate| self.has_template(candidate))?;

        self.resolution_cache.insert(cache_key, found.clone());
        Some(found)
    }

    /// Render the first existing template among `requested`.
    pub fn render_first(&self, requested: &[&str], context: &tera::Context) -> FormResult<HtmlString> {
        let Some(template) = self.resolve(requested) else {
            let name = requested.first().copied().unwrap_or_default().to_string();
            debug!(template = %name, "template not found");
            return Err(FormError::Template {
                source: tera::Error::template_not_found(&name),
                name,
            });
        };

        self.tera
            .render(&template, context)
            .map(HtmlString::from)
            .map_err(|source| FormError::Template {
                name: template,
                source,
            })
    }

    /// Render a template by requested name.
    pub fn render(&self, requested: &str, context: &tera::Context) -> FormResult<HtmlString> {
        self.render_first(&[requested], context)
    }

    /// Clear the resolution cache.
    pub fn clear_cache(&self) {
        self.resolution_cache.clear();
    }
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("name", &self.name)
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.resolution_cache.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_registered() {
        let theme = Theme::builtin().unwrap();
        assert!(theme.has_template("default/form.html"));
        assert!(theme.has_template("default/fields/default.html"));
    }

    #[test]
    fn test_resolve_namespaced() {
        let theme = Theme::builtin().unwrap();
        assert_eq!(theme.resolve(&["@form"]), Some("default/form.html".to_string()));
        assert_eq!(
            theme.resolve(&["@fields.default"]),
            Some("default/fields/default.html".to_string())
        );
        assert_eq!(
            theme.resolve(&["@fields/missing", "@fields/default"]),
            Some("default/fields/default.html".to_string())
        );
        assert_eq!(theme.resolve(&["@missing"]), None);
    }

    #[test]
    fn test_non_default_theme_falls_back() {
        let config = FormConfig {
            theme: "bootstrap".to_string(),
            ..FormConfig::default()
        };
        let mut theme = Theme::new(&config).unwrap();
        assert_eq!(theme.resolve(&["@form"]), Some("default/form.html".to_string()));

        theme
            .add_raw_template("bootstrap/form.html", "<form></form>")
            .unwrap();
        assert_eq!(
            theme.resolve(&["@form"]),
            Some("bootstrap/form.html".to_string())
        );
    }

    #[test]
    fn test_render_plain_name() {
        let mut theme = Theme::builtin().unwrap();
        theme
            .add_raw_template("greeting.html", "<p>{{ who }}</p>")
            .unwrap();

        let mut context = tera::Context::new();
        context.insert("who", "<b>ana</b>");
        let html = theme.render("greeting", &context).unwrap();
        assert_eq!(html.as_str(), "<p>&lt;b&gt;ana&lt;&#x2F;b&gt;</p>");
    }

    #[test]
    fn test_render_missing_template() {
        let theme = Theme::builtin().unwrap();
        let err = theme.render("@nope", &tera::Context::new()).unwrap_err();
        assert!(matches!(err, FormError::Template { name, .. } if name == "@nope"));
    }
}
