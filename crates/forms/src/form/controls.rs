//! HTML controls for each field type.

use serde_json::Value;

use crate::html::{Attributes, HtmlString, Tag};

use super::field::Field;
use super::types::FieldType;

/// Render a scalar value as attribute text. Arrays and objects have none.
pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whether `key` is selected by the current value.
fn is_selected(value: Option<&Value>, key: &str) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| display_value(item).as_deref() == Some(key)),
        Some(other) => display_value(other).as_deref() == Some(key),
        None => false,
    }
}

/// Whether a single checkbox should render checked.
fn is_checked(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

/// Attributes shared by the visible controls.
fn base_attributes(field: &Field, has_errors: bool, class: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.set("id", field.id());
    attrs.add_class(class);
    if has_errors {
        attrs.add_class("is-invalid");
    }
    attrs
}

/// Attributes appended after the type-specific ones.
fn trailing_attributes(field: &Field, attrs: &mut Attributes) {
    // Selects show their placeholder as an empty first option instead.
    let placeholder = field
        .placeholder
        .as_ref()
        .filter(|_| field.field_type != FieldType::Select);
    if let Some(placeholder) = placeholder {
        attrs.set("placeholder", placeholder);
    }
    attrs.set("required", field.is_required());
    attrs.extend(&field.attributes);
}

/// Render the control for a field with its current value.
pub(crate) fn render(field: &Field, value: Option<&Value>, has_errors: bool) -> HtmlString {
    match field.field_type {
        FieldType::Hidden => render_hidden(field, value),
        FieldType::Textarea => render_textarea(field, value, has_errors),
        FieldType::Select => render_select(field, value, has_errors),
        FieldType::Radios => render_choices(field, value, "radio", &field.name),
        FieldType::Checkboxes => {
            render_choices(field, value, "checkbox", &format!("{}[]", field.name))
        }
        FieldType::Checkbox => render_checkbox(field, value, has_errors),
        _ => render_input(field, value, has_errors),
    }
}

/// Hidden inputs carry only their name, value, and explicit attributes.
fn render_hidden(field: &Field, value: Option<&Value>) -> HtmlString {
    let mut tag = Tag::new("input")
        .attr("type", "hidden")
        .attr("name", field.name.as_str());
    if let Some(value) = value.and_then(display_value) {
        tag = tag.attr("value", value);
    }
    tag.attrs(&field.attributes).render()
}

fn render_input(field: &Field, value: Option<&Value>, has_errors: bool) -> HtmlString {
    let input_type = field.field_type.input_type().unwrap_or("text");

    let mut attrs = Attributes::new();
    attrs.set("type", input_type);
    attrs.set("name", field.name.as_str());
    attrs.extend(&base_attributes(field, has_errors, "form-control"));

    // Passwords and files never echo a value back.
    let echoes_value = !matches!(field.field_type, FieldType::Password | FieldType::File);
    if let Some(value) = value.filter(|_| echoes_value).and_then(display_value) {
        attrs.set("value", value);
    }
    if field.field_type == FieldType::Integer {
        attrs.set("step", "1");
    }
    trailing_attributes(field, &mut attrs);

    Tag::new("input").attrs(&attrs).render()
}

fn render_textarea(field: &Field, value: Option<&Value>, has_errors: bool) -> HtmlString {
    let mut attrs = Attributes::new();
    attrs.set("name", field.name.as_str());
    attrs.extend(&base_attributes(field, has_errors, "form-control"));
    trailing_attributes(field, &mut attrs);

    let text = value.and_then(display_value).unwrap_or_default();
    Tag::new("textarea").attrs(&attrs).text(&text).render()
}

fn render_select(field: &Field, value: Option<&Value>, has_errors: bool) -> HtmlString {
    let mut attrs = Attributes::new();
    attrs.set("name", field.name.as_str());
    attrs.extend(&base_attributes(field, has_errors, "form-control"));
    trailing_attributes(field, &mut attrs);

    let mut options = HtmlString::default();
    if let Some(placeholder) = &field.placeholder {
        options.push(&Tag::new("option").attr("value", "").text(placeholder).render());
    }
    for (key, label) in &field.options {
        let option = Tag::new("option")
            .attr("value", key)
            .attr("selected", is_selected(value, key))
            .text(label);
        options.push(&option.render());
    }

    Tag::new("select").attrs(&attrs).html(options).render()
}

fn render_choices(field: &Field, value: Option<&Value>, input_type: &str, name: &str) -> HtmlString {
    let mut html = HtmlString::default();
    for (key, label) in &field.options {
        let id = format!("{}_{key}", field.id());
        let input = Tag::new("input")
            .attr("type", input_type)
            .attr("name", name)
            .attr("id", id.as_str())
            .attr("value", key)
            .attr("class", "form-check-input")
            .attr("checked", is_selected(value, key))
            .attrs(&field.attributes);
        let label = Tag::new("label")
            .attr("class", "form-check-label")
            .attr("for", id.as_str())
            .text(label);

        let mut inner = input.render();
        inner.push(&label.render());
        html.push(&Tag::new("div").attr("class", "form-check").html(inner).render());
    }
    html
}

fn render_checkbox(field: &Field, value: Option<&Value>, has_errors: bool) -> HtmlString {
    let mut attrs = Attributes::new();
    attrs.set("type", "checkbox");
    attrs.set("name", field.name.as_str());
    attrs.set("value", "1");
    attrs.extend(&base_attributes(field, has_errors, "form-check-input"));
    attrs.set("checked", is_checked(value));
    trailing_attributes(field, &mut attrs);

    Tag::new("input").attrs(&attrs).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("a")), Some("a".to_string()));
        assert_eq!(display_value(&json!(3)), Some("3".to_string()));
        assert_eq!(display_value(&json!(true)), Some("1".to_string()));
        assert_eq!(display_value(&json!(null)), None);
    }

    #[test]
    fn test_is_selected() {
        assert!(is_selected(Some(&json!("admin")), "admin"));
        assert!(is_selected(Some(&json!(["php", "js"])), "js"));
        assert!(!is_selected(Some(&json!(["php"])), "css"));
        assert!(!is_selected(None, "admin"));
    }

    #[test]
    fn test_is_checked() {
        assert!(is_checked(Some(&json!(true))));
        assert!(is_checked(Some(&json!("1"))));
        assert!(!is_checked(Some(&json!("0"))));
        assert!(!is_checked(Some(&json!(0))));
        assert!(!is_checked(None));
    }
}
