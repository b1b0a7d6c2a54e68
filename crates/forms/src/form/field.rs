//! Field definitions and their fluent builder.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::access::Visibility;
use crate::error::FormResult;
use crate::html::{AttrValue, Attributes, HtmlString};
use crate::services::Services;
use crate::validation::{Rule, ValidationErrors};

use super::controls;
use super::types::FieldType;

/// Turn a field name into a default label (`first_name` -> `First name`).
pub fn humanize(name: &str) -> String {
    let name = name.trim_end_matches("[]").replace(['_', '-', '.'], " ");
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A declared form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Input name.
    pub name: String,

    /// Field type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Label; derived from the name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Explicit value; takes precedence over bound model values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Help text shown under the control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Option key -> label, for select, radios, and checkboxes.
    pub options: IndexMap<String, String>,

    /// Explicit validation rules.
    pub rules: Vec<Rule>,

    pub required: bool,

    /// Whether the field takes part in validation.
    pub included: bool,

    /// Condition the current principal must meet for the field to render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    /// Script URLs the field needs.
    pub scripts: Vec<String>,

    /// Stylesheet URLs the field needs.
    pub styles: Vec<String>,

    /// Template override for the field wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Extra variables passed to the template.
    pub extra: Map<String, Value>,

    /// Extra HTML attributes for the control.
    pub attributes: Attributes,

    /// Render only the control, without the wrapper.
    pub control_only: bool,
}

impl Field {
    /// Create a new field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: None,
            value: None,
            placeholder: None,
            help: None,
            options: IndexMap::new(),
            rules: Vec::new(),
            required: false,
            included: true,
            visibility: None,
            scripts: Vec::new(),
            styles: Vec::new(),
            template: None,
            extra: Map::new(),
            attributes: Attributes::new(),
            control_only: field_type == FieldType::Hidden,
        }
    }

    /// Type tag as a string.
    pub fn type_name(&self) -> &'static str {
        self.field_type.as_str()
    }

    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    /// Label text, derived from the name when not set.
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.name))
    }

    /// Element id derived from the name.
    pub fn id(&self) -> String {
        match self.attributes.get("id") {
            Some(AttrValue::Text(id)) => id.clone(),
            _ => self
                .name
                .trim_end_matches("[]")
                .replace(['[', '.'], "_")
                .replace(']', ""),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required || self.rules.contains(&Rule::Required)
    }

    /// Full rule list: presence rule, rules implied by the type, then
    /// explicit rules.
    pub fn validation_rules(&self) -> Vec<Rule> {
        let mut rules = vec![if self.is_required() {
            Rule::Required
        } else {
            Rule::Nullable
        }];

        let keys = || self.options.keys().cloned().collect::<Vec<_>>();
        match self.field_type {
            FieldType::Email => rules.push(Rule::Email),
            FieldType::Url => rules.push(Rule::Url),
            FieldType::Number => rules.push(Rule::Numeric),
            FieldType::Integer => rules.push(Rule::Integer),
            FieldType::File => rules.push(Rule::File),
            FieldType::Select | FieldType::Radios if !self.options.is_empty() => {
                rules.push(Rule::In(keys()));
            }
            FieldType::Checkboxes => {
                rules.push(Rule::Array);
                if !self.options.is_empty() {
                    rules.push(Rule::In(keys()));
                }
            }
            _ => {}
        }

        for rule in &self.rules {
            if matches!(rule, Rule::Required | Rule::Nullable) || rules.contains(rule) {
                continue;
            }
            rules.push(rule.clone());
        }

        rules
    }
}

/// Fluent wrapper around a [`Field`] with the services it renders with.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: Field,
    services: Services,
}

impl FieldBuilder {
    pub fn new(field: Field, services: Services) -> Self {
        Self { field, services }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field.field_type
    }

    /// Set the label.
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.field.label = Some(label.into());
        self
    }

    /// Set an explicit value.
    pub fn value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.field.value = Some(value.into());
        self
    }

    pub fn placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        self.field.placeholder = Some(placeholder.into());
        self
    }

    /// Set help text.
    pub fn help(&mut self, help: impl Into<String>) -> &mut Self {
        self.field.help = Some(help.into());
        self
    }

    /// Set a control attribute.
    pub fn attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.field.attributes.set(name, value);
        self
    }

    /// Add a CSS class to the control.
    pub fn class(&mut self, class: &str) -> &mut Self {
        self.field.attributes.add_class(class);
        self
    }

    /// Replace the options.
    pub fn options<K, V>(&mut self, options: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.field.options = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add a validation rule.
    pub fn rule(&mut self, rule: Rule) -> &mut Self {
        if !self.field.rules.contains(&rule) {
            self.field.rules.push(rule);
        }
        self
    }

    /// Add several validation rules.
    pub fn rules(&mut self, rules: impl IntoIterator<Item = Rule>) -> &mut Self {
        for rule in rules {
            self.rule(rule);
        }
        self
    }

    /// Add rules written as a pipe-separated list, e.g. `"required|max:60"`.
    ///
    /// A `regex:` rule takes the rest of the list, so its pattern may contain
    /// `|` (`"required|regex:^(draft|live)$"`). Put it last.
    pub fn parse_rules(&mut self, rules: &str) -> FormResult<&mut Self> {
        let mut parsed: Vec<Rule> = Vec::new();
        let mut rest = rules;
        while !rest.is_empty() {
            let (segment, tail) = if rest.trim_start().starts_with("regex:") {
                (rest, "")
            } else {
                rest.split_once('|').unwrap_or((rest, ""))
            };
            if !segment.trim().is_empty() {
                parsed.push(segment.parse()?);
            }
            rest = tail;
        }
        Ok(self.rules(parsed))
    }

    /// Mark as required.
    pub fn required(&mut self) -> &mut Self {
        self.field.required = true;
        self
    }

    /// Include or exclude the field from validation.
    pub fn include(&mut self, included: bool) -> &mut Self {
        self.field.included = included;
        self
    }

    /// Override the wrapper template.
    pub fn template(&mut self, template: impl Into<String>) -> &mut Self {
        self.field.template = Some(template.into());
        self
    }

    /// Override the wrapper template and pass extra variables to it.
    pub fn template_with<K, V>(
        &mut self,
        template: impl Into<String>,
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.template(template);
        for (key, value) in vars {
            self.with(key, value);
        }
        self
    }

    /// Pass an extra variable to the template.
    pub fn with(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.field.extra.insert(key.into(), value.into());
        self
    }

    /// Require a script URL.
    pub fn script(&mut self, url: impl Into<String>) -> &mut Self {
        self.field.scripts.push(url.into());
        self
    }

    /// Require a stylesheet URL.
    pub fn style(&mut self, url: impl Into<String>) -> &mut Self {
        self.field.styles.push(url.into());
        self
    }

    /// Render only the control.
    pub fn control_only(&mut self, value: bool) -> &mut Self {
        self.field.control_only = value;
        self
    }

    /// Show only to principals holding `role`.
    pub fn if_is(&mut self, role: impl Into<String>) -> &mut Self {
        self.field.visibility = Some(Visibility::Role(role.into()));
        self
    }

    /// Show only to guests.
    pub fn if_guest(&mut self) -> &mut Self {
        self.field.visibility = Some(Visibility::Guest);
        self
    }

    /// Show only to authenticated principals.
    pub fn if_auth(&mut self) -> &mut Self {
        self.field.visibility = Some(Visibility::Auth);
        self
    }

    /// Show only when the ability is allowed.
    pub fn if_can(&mut self, ability: impl Into<String>) -> &mut Self {
        self.field.visibility = Some(Visibility::Can(ability.into()));
        self
    }

    /// Show only when the ability is denied.
    pub fn if_cannot(&mut self, ability: impl Into<String>) -> &mut Self {
        self.field.visibility = Some(Visibility::Cannot(ability.into()));
        self
    }

    /// Whether the visibility condition holds for the current principal.
    pub fn is_visible(&self) -> bool {
        self.field
            .visibility
            .as_ref()
            .is_none_or(|v| v.passes(self.services.access()))
    }

    /// Whether the field takes part in validation right now.
    pub fn is_included(&self) -> bool {
        self.field.included && self.is_visible()
    }

    /// Render the field, or nothing when it is not visible.
    pub fn render(&self) -> FormResult<HtmlString> {
        self.render_with(None, None)
    }

    /// Render using bound model values and previous validation errors.
    pub(crate) fn render_with(
        &self,
        values: Option<&Map<String, Value>>,
        errors: Option<&ValidationErrors>,
    ) -> FormResult<HtmlString> {
        if !self.is_visible() {
            debug!(field = %self.field.name, "field hidden by visibility check");
            return Ok(HtmlString::default());
        }

        let field = &self.field;
        let value = field
            .value
            .as_ref()
            .or_else(|| values.and_then(|v| v.get(&field.name)));
        let messages = errors.map(|e| e.get(&field.name)).unwrap_or_default();

        let control = controls::render(field, value, !messages.is_empty());
        if field.control_only && field.template.is_none() {
            return Ok(control);
        }

        let mut context = tera::Context::new();
        context.insert("field", field);
        context.insert("name", &field.name);
        context.insert("id", &field.id());
        context.insert("type", field.type_name());
        context.insert("label", &field.label());
        context.insert("required", &field.is_required());
        context.insert("help", &field.help);
        context.insert("placeholder", &field.placeholder);
        context.insert("options", &field.options);
        context.insert("value", &value.and_then(controls::display_value));
        context.insert("errors", messages);
        context.insert("has_errors", &!messages.is_empty());
        context.insert("control", &control);
        for (key, value) in &field.extra {
            context.insert(key.as_str(), value);
        }

        let theme = self.services.theme();
        match &field.template {
            Some(template) => theme.render(template, &context),
            None => {
                let specific = format!("@fields/{}", field.type_name());
                let mut suggestions = vec![specific.as_str()];
                if matches!(field.field_type, FieldType::Radios | FieldType::Checkboxes) {
                    suggestions.push("@fields/choices");
                }
                suggestions.push("@fields/default");
                theme.render_first(&suggestions, &context)
            }
        }
    }
}

/// Builds fields bound to a shared service set.
#[derive(Debug, Clone)]
pub struct FieldFactory {
    services: Services,
}

impl FieldFactory {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Build a field of any type.
    pub fn make(&self, name: impl Into<String>, field_type: FieldType) -> FieldBuilder {
        FieldBuilder::new(Field::new(name, field_type), self.services.clone())
    }

    /// Build a field with options.
    pub fn make_with_options<K, V>(
        &self,
        name: impl Into<String>,
        field_type: FieldType,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut builder = self.make(name, field_type);
        builder.options(options);
        builder
    }

    pub fn text(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Text)
    }

    pub fn email(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Email)
    }

    pub fn password(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Password)
    }

    pub fn number(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Number)
    }

    pub fn integer(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Integer)
    }

    pub fn url(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Url)
    }

    pub fn textarea(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Textarea)
    }

    pub fn checkbox(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Checkbox)
    }

    pub fn file(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::File)
    }

    pub fn hidden(&self, name: impl Into<String>) -> FieldBuilder {
        self.make(name, FieldType::Hidden)
    }

    pub fn select<K, V>(
        &self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.make_with_options(name, FieldType::Select, options)
    }

    pub fn radios<K, V>(
        &self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.make_with_options(name, FieldType::Radios, options)
    }

    pub fn checkboxes<K, V>(
        &self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.make_with_options(name, FieldType::Checkboxes, options)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::FormConfig;

    fn factory() -> FieldFactory {
        FieldFactory::new(Services::new(FormConfig::default()).unwrap())
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("first_name"), "First name");
        assert_eq!(humanize("tags[]"), "Tags");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_field_defaults() {
        let field = Field::new("plan", FieldType::Hidden);
        assert!(field.control_only);
        assert!(field.included);
        assert_eq!(field.label(), "Plan");
        assert_eq!(field.id(), "plan");
    }

    #[test]
    fn test_field_id_from_array_name() {
        let field = Field::new("user[email]", FieldType::Email);
        assert_eq!(field.id(), "user_email");
    }

    #[test]
    fn test_validation_rules_by_type() {
        let factory = factory();

        let mut email = factory.email("email");
        email.required().parse_rules("max:60|email").unwrap();
        assert_eq!(
            email.field().validation_rules(),
            vec![Rule::Required, Rule::Email, Rule::Max(60.0)]
        );

        let role = factory.select("role", [("admin", "Admin"), ("user", "User")]);
        assert_eq!(
            role.field().validation_rules(),
            vec![
                Rule::Nullable,
                Rule::In(vec!["admin".to_string(), "user".to_string()])
            ]
        );

        let tags = factory.checkboxes("tags", [("php", "PHP")]);
        assert_eq!(
            tags.field().validation_rules(),
            vec![
                Rule::Nullable,
                Rule::Array,
                Rule::In(vec!["php".to_string()])
            ]
        );
    }

    #[test]
    fn test_parse_rules_rejects_unknown() {
        let mut field = factory().text("name");
        assert!(field.parse_rules("required|bogus").is_err());
        assert!(field.field().rules.is_empty());
    }

    #[test]
    fn test_parse_rules_regex_with_alternation() {
        let mut field = factory().text("status");
        field.parse_rules("required|max:10|regex:^(draft|live)$").unwrap();
        assert_eq!(
            field.field().rules,
            vec![
                Rule::Required,
                Rule::Max(10.0),
                Rule::regex("^(draft|live)$").unwrap()
            ]
        );
    }

    #[test]
    fn test_visibility_replaced_by_latest_condition() {
        let mut field = factory().text("name");
        field.if_can("edit-all").if_guest();
        assert_eq!(field.field().visibility, Some(Visibility::Guest));
        assert!(field.is_visible());
    }

    #[test]
    fn test_render_hidden_control_only() {
        let html = factory().hidden("plan").render().unwrap();
        assert_eq!(html.as_str(), r#"<input type="hidden" name="plan">"#);
    }

    #[test]
    fn test_render_text_in_wrapper() {
        let mut field = factory().text("first_name");
        field.value("Ana").required();
        let html = field.render().unwrap();

        assert!(html.as_str().contains(r#"<label for="first_name">First name"#));
        assert!(html.as_str().contains(
            r#"<input type="text" name="first_name" id="first_name" class="form-control" value="Ana" required>"#
        ));
    }

    #[test]
    fn test_render_select_marks_selected_option() {
        let mut field = factory().select("role", [("admin", "Admin"), ("user", "User")]);
        field.value("user");
        let html = field.render().unwrap();

        assert!(html.as_str().contains(r#"<option value="admin">Admin</option>"#));
        assert!(
            html.as_str()
                .contains(r#"<option value="user" selected>User</option>"#)
        );
    }

    #[test]
    fn test_render_with_errors() {
        let field = factory().text("name");
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");

        let html = field.render_with(None, Some(&errors)).unwrap();
        assert!(html.as_str().contains("has-error"));
        assert!(html.as_str().contains("is-invalid"));
        assert!(html.as_str().contains("The name field is required."));
    }
}
