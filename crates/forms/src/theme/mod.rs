//! Theme engine and template resolution.
//!
//! Provides Tera-based rendering of forms and fields. Template names with a
//! leading `@` are namespaced to the active theme and fall back to the
//! built-in `default` theme.

mod engine;

pub use engine::{DEFAULT_THEME, Theme};
