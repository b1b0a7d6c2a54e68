//! Server-side validation of submitted form input.

mod request;
mod rules;
mod validator;

pub use request::FormRequest;
pub use rules::{Rule, RulePattern};
pub use validator::{RequestValidator, RuleSet, RuleValidator, ValidatedInput, ValidationErrors};
