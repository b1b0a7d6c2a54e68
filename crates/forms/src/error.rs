//! Form error types.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors raised by form models and their collaborators.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Call to undefined method {model}::{method}()")]
    UnknownMethod { model: String, method: String },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("failed to render template {name}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("route [{0}] not defined")]
    UnknownRoute(String),

    #[error("missing required parameter [{parameter}] for route [{route}]")]
    MissingRouteParameter { route: String, parameter: String },

    #[error("invalid validation rule: {0}")]
    InvalidRule(String),
}

impl FormError {
    /// Build an unknown-method error for the given model type.
    pub fn unknown_method(model: impl Into<String>, method: impl Into<String>) -> Self {
        FormError::UnknownMethod {
            model: model.into(),
            method: method.into(),
        }
    }

    /// Whether this error is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation(_))
    }
}

/// Result type alias using FormError.
pub type FormResult<T> = Result<T, FormError>;
