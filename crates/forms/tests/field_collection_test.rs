#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Field collection and field builder tests.

mod common;

use common::{EmptyForm, assert, templates_dir, test_services, test_services_with_templates};
use trovato_forms::form::MULTIPART;
use trovato_forms::{Entry, FieldType, FormModel, Tag};

const ALL_TYPES: &[FieldType] = &[
    FieldType::Text,
    FieldType::Email,
    FieldType::Password,
    FieldType::Number,
    FieldType::Integer,
    FieldType::Url,
    FieldType::Textarea,
    FieldType::Select,
    FieldType::Radios,
    FieldType::Checkbox,
    FieldType::Checkboxes,
    FieldType::File,
    FieldType::Hidden,
];

fn empty_model() -> FormModel {
    common::init_tracing();
    FormModel::new(EmptyForm, test_services())
}

#[test]
fn test_every_type_is_retrievable() {
    let mut form = empty_model();
    for field_type in ALL_TYPES {
        form.add(format!("{field_type}_field"), *field_type);
    }

    assert_eq!(form.fields().len(), ALL_TYPES.len());
    for field_type in ALL_TYPES {
        let field = form.field(&format!("{field_type}_field")).unwrap();
        assert_eq!(field.field_type(), *field_type);
        assert_eq!(field.field().type_name(), field_type.as_str());
    }
}

#[test]
fn test_shortcuts_set_types() {
    let mut form = empty_model();
    form.text("a");
    form.email("b");
    form.password("c");
    form.number("d");
    form.integer("e");
    form.url("f");
    form.textarea("g");
    form.checkbox("h");
    form.hidden("i");
    form.file("j").unwrap();

    let types: Vec<&str> = form
        .fields()
        .only_fields()
        .map(|(_, field)| field.field().type_name())
        .collect();
    assert_eq!(
        types,
        [
            "text", "email", "password", "number", "integer", "url", "textarea", "checkbox",
            "hidden", "file"
        ]
    );
}

#[test]
fn test_options_are_kept_in_order() {
    let mut form = empty_model();
    form.select("role", [("user", "User"), ("admin", "Admin")]);
    form.radios("plan", [("free", "Free")]);
    form.checkboxes("tags", [("php", "PHP"), ("rust", "Rust")]);

    let role = form.field("role").unwrap().field();
    let keys: Vec<&String> = role.options().keys().collect();
    assert_eq!(keys, ["user", "admin"]);
    assert_eq!(form.field("plan").unwrap().field().options().len(), 1);
    assert_eq!(form.field("tags").unwrap().field().options().len(), 2);
}

#[test]
fn test_file_sets_multipart() {
    let mut form = empty_model();
    assert_eq!(form.form().unwrap().enctype, None);

    form.file("avatar").unwrap();
    assert_eq!(form.form().unwrap().enctype.as_deref(), Some(MULTIPART));

    let html = form.render(None).unwrap();
    assert::contains(html.as_str(), r#"enctype="multipart/form-data""#);
}

#[test]
fn test_hidden_renders_control_only() {
    let mut form = empty_model();
    form.hidden("plan");

    let html = form.field("plan").unwrap().render().unwrap();
    assert_eq!(html.as_str(), r#"<input type="hidden" name="plan">"#);
}

#[test]
fn test_hidden_with_value() {
    let mut form = empty_model();
    form.hidden("plan").value("pro");

    let html = form.field("plan").unwrap().render().unwrap();
    assert_eq!(html.as_str(), r#"<input type="hidden" name="plan" value="pro">"#);
}

#[test]
fn test_custom_template_variables() {
    let mut form = FormModel::new(EmptyForm, test_services_with_templates(&templates_dir()));
    form.text("extra")
        .template_with("@fields.extra", [("customVar", "Hello World")]);

    let html = form.field("extra").unwrap().render().unwrap();
    assert_eq!(html.as_str().trim(), "<strong>Hello World</strong>");
}

#[test]
fn test_template_override_with_later_variables() {
    let mut form = FormModel::new(EmptyForm, test_services_with_templates(&templates_dir()));
    form.text("extra")
        .template("@fields/extra")
        .with("customVar", "<b>escaped</b>");

    let html = form.field("extra").unwrap().render().unwrap();
    assert_eq!(
        html.as_str().trim(),
        "<strong>&lt;b&gt;escaped&lt;&#x2F;b&gt;</strong>"
    );
}

#[test]
fn test_tags_are_entries_but_not_fields() {
    let mut form = empty_model();
    form.tag(Tag::new("h3").text("Account"));
    form.text("name");
    form.tag(Tag::new("hr"));

    assert_eq!(form.fields().len(), 3);
    assert_eq!(form.fields().only_fields().count(), 1);

    let tags: Vec<String> = form
        .fields()
        .all()
        .filter_map(|(_, entry)| match entry {
            Entry::Tag(tag) => Some(tag.render().into_string()),
            Entry::Field(_) => None,
        })
        .collect();
    assert_eq!(tags, ["<h3>Account</h3>", "<hr>"]);

    let html = form.render_fields().unwrap();
    assert::contains(html.as_str(), "<h3>Account</h3>");
    assert::contains(html.as_str(), "<hr>");
}

#[test]
fn test_missing_field_is_none() {
    let mut form = empty_model();
    form.text("name");

    assert!(form.field("nope").is_none());
    assert!(form.field_mut("nope").is_none());
}

#[test]
fn test_labels_and_help() {
    let mut form = empty_model();
    form.text("first_name").help("As on your passport");
    form.text("last_name").label("Surname");

    let first = form.field("first_name").unwrap().render().unwrap();
    assert::contains(first.as_str(), "First name");
    assert::contains(first.as_str(), "As on your passport");

    let last = form.field("last_name").unwrap().render().unwrap();
    assert::contains(last.as_str(), "Surname");
}
