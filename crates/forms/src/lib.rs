//! Trovato Forms Library
//!
//! Declarative form models for Trovato: fields and buttons declared once,
//! rendered through Tera themes, and validated server-side.

pub mod access;
pub mod config;
pub mod error;
pub mod form;
pub mod html;
pub mod routing;
pub mod services;
pub mod theme;
pub mod validation;

pub use access::{AccessGate, Principal, Visibility};
pub use config::FormConfig;
pub use error::{FormError, FormResult};
pub use form::{
    Button, ButtonCollection, ButtonKind, Entry, Field, FieldBuilder, FieldCollection,
    FieldFactory, FieldType, Form, FormModel, FormSetup, Method,
};
pub use html::{HtmlString, Tag};
pub use routing::{RouteTable, UrlGenerator};
pub use services::Services;
pub use theme::Theme;
pub use validation::{
    FormRequest, RequestValidator, Rule, RulePattern, RuleValidator, ValidationErrors,
};
