//! Declarative form models.
//!
//! A [`FormSetup`] definition declares fields and buttons on a [`FormModel`]
//! the first time the model is rendered, validated, or inspected. Fields are
//! built through a [`FieldFactory`] and rendered through the theme.

mod button;
mod collection;
mod controls;
mod field;
mod model;
mod types;

pub use button::{Button, ButtonCollection, ButtonKind};
pub use collection::{Entry, FieldCollection};
pub use field::{Field, FieldBuilder, FieldFactory, humanize};
pub use model::{FormMacro, FormModel, FormSetup};
pub use types::{FieldType, Form, MULTIPART, Method};
