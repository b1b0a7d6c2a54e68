//! Named route URL generation.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{FormError, FormResult};

/// `{param}` placeholders left in a pattern.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}/]+)\}").expect("valid placeholder regex"));

/// Generates URLs for named routes.
pub trait UrlGenerator: Send + Sync {
    /// Build the URL for `name`, substituting `params`.
    fn route(&self, name: &str, params: &[(&str, &str)], absolute: bool) -> FormResult<String>;
}

/// Route table with `{param}` placeholder patterns.
///
/// Parameters without a matching placeholder are appended as a query string.
#[derive(Clone)]
pub struct RouteTable {
    base: url::Url,
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Create an empty table rooted at `base_url`.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = url::Url::parse(base_url)?;
        Ok(Self {
            base,
            routes: HashMap::new(),
        })
    }

    /// Register a named route, e.g. `("users.update", "/users/{user}")`.
    pub fn add(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.routes.insert(name.into(), pattern.into());
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Substitute `params` into `pattern`. Every placeholder must be filled;
    /// leftover params become the query string.
    fn build_path(name: &str, pattern: &str, params: &[(&str, &str)]) -> FormResult<String> {
        let mut path = pattern.to_string();
        let mut query: IndexMap<&str, &str> = IndexMap::new();

        for &(key, value) in params {
            let placeholder = format!("{{{key}}}");
            if path.contains(&placeholder) {
                path = path.replace(&placeholder, &urlencoding::encode(value));
            } else {
                query.insert(key, value);
            }
        }

        if let Some(missing) = PLACEHOLDER.captures(&path) {
            return Err(FormError::MissingRouteParameter {
                route: name.to_string(),
                parameter: missing[1].to_string(),
            });
        }

        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            path.push('?');
            path.push_str(&pairs.join("&"));
        }

        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Ok(path)
    }

    /// Prefix `path` with the base URL, keeping any path the base carries.
    fn absolute(&self, path: &str) -> String {
        let mut base = self.base.clone();
        base.set_query(None);
        base.set_fragment(None);
        format!("{}{path}", base.as_str().trim_end_matches('/'))
    }
}

impl UrlGenerator for RouteTable {
    fn route(&self, name: &str, params: &[(&str, &str)], absolute: bool) -> FormResult<String> {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| FormError::UnknownRoute(name.to_string()))?;

        let path = Self::build_path(name, pattern, params)?;
        if absolute {
            Ok(self.absolute(&path))
        } else {
            Ok(path)
        }
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("base", &self.base.as_str())
            .field("routes", &self.routes.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut table = RouteTable::new("https://example.com").unwrap();
        table
            .add("users.store", "/users")
            .add("users.update", "/users/{user}");
        table
    }

    #[test]
    fn test_relative_route() {
        let url = table().route("users.store", &[], false).unwrap();
        assert_eq!(url, "/users");
    }

    #[test]
    fn test_placeholder_and_query() {
        let url = table()
            .route("users.update", &[("user", "7"), ("tab", "a b")], false)
            .unwrap();
        assert_eq!(url, "/users/7?tab=a%20b");
    }

    #[test]
    fn test_absolute_route() {
        let url = table()
            .route("users.update", &[("user", "7")], true)
            .unwrap();
        assert_eq!(url, "https://example.com/users/7");
    }

    #[test]
    fn test_missing_parameter() {
        let err = table().route("users.update", &[], false).unwrap_err();
        assert!(matches!(
            &err,
            FormError::MissingRouteParameter { route, parameter }
                if route == "users.update" && parameter == "user"
        ));
        assert_eq!(
            err.to_string(),
            "missing required parameter [user] for route [users.update]"
        );

        // A value for another key does not fill the placeholder.
        let err = table()
            .route("users.update", &[("tab", "profile")], true)
            .unwrap_err();
        assert!(matches!(err, FormError::MissingRouteParameter { .. }));
    }

    #[test]
    fn test_encoded_braces_in_values_are_not_placeholders() {
        let url = table()
            .route("users.update", &[("user", "{7}")], false)
            .unwrap();
        assert_eq!(url, "/users/%7B7%7D");
    }

    #[test]
    fn test_absolute_route_keeps_base_path() {
        let mut table = RouteTable::new("https://example.com/app/").unwrap();
        table.add("users.store", "/users");
        assert_eq!(
            table.route("users.store", &[], true).unwrap(),
            "https://example.com/app/users"
        );

        let mut table = RouteTable::new("https://example.com/app").unwrap();
        table.add("users.update", "users/{user}");
        assert_eq!(
            table.route("users.update", &[("user", "7")], true).unwrap(),
            "https://example.com/app/users/7"
        );
    }

    #[test]
    fn test_unknown_route() {
        let err = table().route("missing", &[], true).unwrap_err();
        assert!(matches!(err, FormError::UnknownRoute(name) if name == "missing"));
    }
}
