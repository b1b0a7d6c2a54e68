//! Trovato test utilities.
//!
//! Helpers for integration testing: principal fixtures, service builders,
//! and assertion utilities for rendered form markup.

use std::path::Path;

use trovato_forms::{AccessGate, FormConfig, Principal, RouteTable, Services};

/// Create an authenticated test principal holding the given roles.
pub fn test_user(roles: &[&str]) -> Principal {
    roles
        .iter()
        .fold(Principal::new("42", "Test User"), |user, role| user.with_role(*role))
}

/// Create a plain authenticated principal.
pub fn a_user() -> Principal {
    test_user(&[])
}

/// Create an admin test principal.
pub fn an_admin() -> Principal {
    Principal::new("1", "Admin").with_role("admin").admin()
}

/// Install a tracing subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Route table with the routes the fixtures use.
#[allow(clippy::expect_used)]
pub fn test_routes() -> RouteTable {
    let mut routes = RouteTable::new("http://localhost").expect("valid base URL");
    routes
        .add("users.store", "/users")
        .add("users.update", "/users/{user}");
    routes
}

/// Build services with the built-in theme, a fresh gate, and test routes.
#[allow(clippy::expect_used)]
pub fn test_services() -> Services {
    Services::new(FormConfig::default())
        .expect("default services")
        .with_urls(test_routes())
}

/// Build services that also load templates from `dir`.
#[allow(clippy::expect_used)]
pub fn test_services_with_templates(dir: &Path) -> Services {
    let config = FormConfig {
        template_dir: Some(dir.to_path_buf()),
        ..FormConfig::default()
    };
    Services::new(config)
        .expect("services with template dir")
        .with_urls(test_routes())
}

/// Build services sharing `gate`.
pub fn test_services_with_gate(gate: &AccessGate) -> Services {
    test_services().with_access(gate.clone())
}

/// Assertion helpers for rendered HTML.
pub mod assert {
    /// Collapse whitespace between tags and trim lines.
    pub fn normalize_html(html: &str) -> String {
        html.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Assert that two HTML fragments match once whitespace is normalized.
    pub fn html_eq(actual: &str, expected: &str) {
        let (normalized_actual, normalized_expected) =
            (normalize_html(actual), normalize_html(expected));
        assert_eq!(
            normalized_actual, normalized_expected,
            "HTML mismatch:\nactual: {actual}\nexpected: {expected}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder() {
        let user = test_user(&["editor", "author"]);
        assert!(user.is("editor"));
        assert!(user.is("author"));
        assert!(!user.is("admin"));
        assert!(!user.is_admin);
    }

    #[test]
    fn test_admin_user() {
        let admin = an_admin();
        assert!(admin.is_admin);
        assert!(admin.is("admin"));
    }

    #[test]
    fn test_services_share_gate() {
        let gate = AccessGate::new();
        let services = test_services_with_gate(&gate);
        gate.acting_as(a_user());
        assert!(services.access().check());
    }

    #[test]
    fn test_routes_are_registered() {
        let routes = test_routes();
        assert!(routes.has("users.store"));
        assert!(routes.has("users.update"));
    }

    #[test]
    fn test_assertions() {
        assert::html_eq("<div>\n  <p>hi</p>\n</div>\n", "<div><p>hi</p></div>");
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }
}
