//! Form models: a definition plus the form, fields, and buttons it declares.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{FormError, FormResult};
use crate::html::{self, HtmlString, Tag};
use crate::services::Services;
use crate::validation::{FormRequest, RuleSet, ValidatedInput, ValidationErrors};

use super::button::{Button, ButtonCollection};
use super::collection::FieldCollection;
use super::field::{FieldBuilder, FieldFactory};
use super::types::{FieldType, Form, Method};

/// Declares the fields and buttons of a form.
///
/// `creation_setup` runs for POST models and `update_setup` for PUT models;
/// both fall back to `setup`. Other methods run `setup` directly.
pub trait FormSetup: Send + Sync {
    /// Short type name used in error messages.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn setup(&self, _form: &mut FormModel) -> FormResult<()> {
        Ok(())
    }

    fn creation_setup(&self, form: &mut FormModel) -> FormResult<()> {
        self.setup(form)
    }

    fn update_setup(&self, form: &mut FormModel) -> FormResult<()> {
        self.setup(form)
    }
}

/// Last path segment of a type name, without generic arguments
/// (`app::Wrapper<app::Form>` -> `Wrapper`).
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A named extension callable through [`FormModel::call`].
pub type FormMacro = Arc<dyn Fn(&mut FormModel, &[Value]) -> FormResult<Value> + Send + Sync>;

/// `form` as seen by templates: the element data plus its rendered tags.
#[derive(Serialize)]
struct FormView<'a> {
    #[serde(flatten)]
    form: &'a Form,
    open: HtmlString,
    close: HtmlString,
}

/// A form definition bound to services, with lazily built contents.
pub struct FormModel {
    definition: Arc<dyn FormSetup>,
    services: Services,
    method: Method,
    form: Option<Form>,
    fields: FieldCollection,
    buttons: ButtonCollection,
    template: Option<String>,
    model: Option<Map<String, Value>>,
    errors: Option<ValidationErrors>,
    macros: HashMap<String, FormMacro>,
}

impl FormModel {
    /// Create a POST model for `definition`. Setup has not run yet.
    pub fn new(definition: impl FormSetup + 'static, services: Services) -> Self {
        Self::from_arc(Arc::new(definition), services)
    }

    /// Create a model around a shared definition.
    pub fn from_arc(definition: Arc<dyn FormSetup>, services: Services) -> Self {
        let factory = FieldFactory::new(services.clone());
        Self {
            definition,
            services,
            method: Method::Post,
            form: None,
            fields: FieldCollection::new(factory),
            buttons: ButtonCollection::new(),
            template: None,
            model: None,
            errors: None,
            macros: HashMap::new(),
        }
    }

    /// Build the model for creating a record (POST).
    pub fn for_creation(&mut self) -> &mut Self {
        self.with_method(Method::Post)
    }

    /// Build the model for updating a record (PUT).
    pub fn for_update(&mut self) -> &mut Self {
        self.with_method(Method::Put)
    }

    /// Set the submission method. Takes effect on the next setup.
    pub fn with_method(&mut self, method: Method) -> &mut Self {
        if let Some(form) = &mut self.form {
            warn!(form = self.definition.name(), %method, "method changed after setup");
            form.method = method;
        }
        self.method = method;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn name(&self) -> &'static str {
        self.definition.name()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Whether setup has already run.
    pub fn is_set_up(&self) -> bool {
        self.form.is_some()
    }

    /// Run the definition's setup hooks, once.
    pub fn run_setup(&mut self) -> FormResult<()> {
        if self.form.is_some() {
            return Ok(());
        }

        let mut form = Form::new(self.method);
        form.novalidate(self.services.config().novalidate);
        self.form = Some(form);

        let definition = Arc::clone(&self.definition);
        debug!(form = definition.name(), method = %self.method, "running form setup");
        match self.method {
            Method::Post => definition.creation_setup(self),
            Method::Put => definition.update_setup(self),
            _ => definition.setup(self),
        }
    }

    fn ensure_form(&mut self) -> FormResult<&mut Form> {
        self.run_setup()?;
        let method = self.method;
        Ok(self.form.get_or_insert_with(|| Form::new(method)))
    }

    /// The form element, after setup.
    pub fn form(&mut self) -> FormResult<&Form> {
        self.ensure_form().map(|form| &*form)
    }

    pub fn form_mut(&mut self) -> FormResult<&mut Form> {
        self.ensure_form()
    }

    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldCollection {
        &mut self.fields
    }

    pub fn buttons(&self) -> &ButtonCollection {
        &self.buttons
    }

    pub fn buttons_mut(&mut self) -> &mut ButtonCollection {
        &mut self.buttons
    }

    /// Use a custom template for [`render`](Self::render).
    pub fn template(&mut self, template: impl Into<String>) -> &mut Self {
        self.template = Some(template.into());
        self
    }

    /// Bind record values used to fill fields without an explicit value.
    ///
    /// Only JSON objects can be bound; anything else is ignored.
    pub fn with_model(&mut self, values: Value) -> &mut Self {
        match values {
            Value::Object(map) => self.model = Some(map),
            other => {
                warn!(form = self.definition.name(), value = %other, "ignoring non-object model");
            }
        }
        self
    }

    /// Bind errors from a previous submission.
    pub fn with_errors(&mut self, errors: ValidationErrors) -> &mut Self {
        self.errors = Some(errors);
        self
    }

    /// Point the form at a named route.
    pub fn route(
        &mut self,
        name: &str,
        params: &[(&str, &str)],
        absolute: bool,
    ) -> FormResult<&mut Self> {
        let url = self.services.urls().route(name, params, absolute)?;
        self.ensure_form()?.action(url);
        Ok(self)
    }

    /// Set the form action URL.
    pub fn action(&mut self, url: impl Into<String>) -> FormResult<&mut Self> {
        self.ensure_form()?.action(url);
        Ok(self)
    }

    /// Toggle HTML5 browser validation.
    pub fn novalidate(&mut self, value: bool) -> FormResult<&mut Self> {
        self.ensure_form()?.novalidate(value);
        Ok(self)
    }

    /// Embed a CSRF token in the opening tag.
    pub fn csrf_token(&mut self, token: impl Into<String>) -> FormResult<&mut Self> {
        self.ensure_form()?.token(token);
        Ok(self)
    }

    /// Render the whole form.
    ///
    /// The template is `custom` when given, else the model's template, else
    /// the configured default.
    pub fn render(&mut self, custom: Option<&str>) -> FormResult<HtmlString> {
        self.run_setup()?;

        let services = self.services.clone();
        let template = custom
            .map(str::to_string)
            .or_else(|| self.template.clone())
            .unwrap_or_else(|| services.config().default_template.clone());

        debug!(form = self.definition.name(), %template, "rendering form");
        let fields = self.fields.render(self.model.as_ref(), self.errors.as_ref())?;
        let buttons = self.buttons.render();
        let form: &Form = self.ensure_form()?;

        let mut context = tera::Context::new();
        context.insert(
            "form",
            &FormView {
                form,
                open: form.open(),
                close: form.close(),
            },
        );
        context.insert("fields", &fields);
        context.insert("buttons", &buttons);
        services.theme().render(&template, &context)
    }

    /// Render only the fields.
    pub fn render_fields(&mut self) -> FormResult<HtmlString> {
        self.run_setup()?;
        let fields = self.fields.render(self.model.as_ref(), self.errors.as_ref())?;

        let mut context = tera::Context::new();
        context.insert("fields", &fields);
        self.services.theme().render("@fields", &context)
    }

    /// Script URLs required by the included fields, without duplicates.
    pub fn scripts(&mut self) -> FormResult<Vec<String>> {
        self.run_setup()?;
        let scripts: IndexSet<&String> = self
            .fields
            .only_fields()
            .filter(|(_, field)| field.is_included())
            .flat_map(|(_, field)| &field.field().scripts)
            .collect();
        Ok(scripts.into_iter().cloned().collect())
    }

    /// Stylesheet URLs required by the included fields, without duplicates.
    pub fn styles(&mut self) -> FormResult<Vec<String>> {
        self.run_setup()?;
        let styles: IndexSet<&String> = self
            .fields
            .only_fields()
            .filter(|(_, field)| field.is_included())
            .flat_map(|(_, field)| &field.field().styles)
            .collect();
        Ok(styles.into_iter().cloned().collect())
    }

    pub fn render_scripts(&mut self) -> FormResult<HtmlString> {
        let mut rendered = HtmlString::default();
        for src in self.scripts()? {
            rendered.push(&html::script(&src));
        }
        Ok(rendered)
    }

    pub fn render_styles(&mut self) -> FormResult<HtmlString> {
        let mut rendered = HtmlString::default();
        for href in self.styles()? {
            rendered.push(&html::style(&href));
        }
        Ok(rendered)
    }

    /// Rules of the fields that currently take part in validation.
    pub fn validation_rules(&mut self) -> FormResult<RuleSet> {
        self.run_setup()?;
        Ok(self.fields.validation_rules())
    }

    /// Validate request input, returning the validated values.
    pub fn validate(&mut self, request: &FormRequest) -> FormResult<ValidatedInput> {
        let rules = self.validation_rules()?;
        let validated = self
            .services
            .validator()
            .validate(request, &rules)
            .inspect_err(|errors| {
                debug!(form = self.definition.name(), failed = errors.len(), "form validation failed");
            })?;
        Ok(validated)
    }

    pub fn field(&self, name: &str) -> Option<&FieldBuilder> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldBuilder> {
        self.fields.get_mut(name)
    }

    /// Declare a field of any type.
    pub fn add(&mut self, name: impl Into<String>, field_type: FieldType) -> &mut FieldBuilder {
        self.fields.add(name, field_type)
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.text(name)
    }

    pub fn email(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.email(name)
    }

    pub fn password(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.password(name)
    }

    pub fn number(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.number(name)
    }

    pub fn integer(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.integer(name)
    }

    pub fn url(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.url(name)
    }

    pub fn textarea(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.textarea(name)
    }

    pub fn select<K, V>(
        &mut self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> &mut FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields.add_with_options(name, FieldType::Select, options)
    }

    pub fn radios<K, V>(
        &mut self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> &mut FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields.add_with_options(name, FieldType::Radios, options)
    }

    pub fn checkbox(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.checkbox(name)
    }

    pub fn checkboxes<K, V>(
        &mut self,
        name: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> &mut FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields.add_with_options(name, FieldType::Checkboxes, options)
    }

    /// Declare a file upload, switching the form to multipart encoding.
    pub fn file(&mut self, name: impl Into<String>) -> FormResult<&mut FieldBuilder> {
        self.ensure_form()?.with_files();
        Ok(self.fields.file(name))
    }

    pub fn hidden(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.fields.hidden(name)
    }

    /// Add decorative markup between fields.
    pub fn tag(&mut self, tag: Tag) -> &Tag {
        self.fields.tag(tag)
    }

    pub fn submit(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.buttons.submit(name, text)
    }

    pub fn reset(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.buttons.reset(name, text)
    }

    pub fn button(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.buttons.button(name, text)
    }

    pub fn link(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Button {
        self.buttons.link(name, url, text)
    }

    /// Register a named extension for this model.
    pub fn register_macro<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut FormModel, &[Value]) -> FormResult<Value> + Send + Sync + 'static,
    {
        self.macros.insert(name.into(), Arc::new(f));
        self
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Invoke a registered extension by name.
    pub fn call(&mut self, name: &str, args: &[Value]) -> FormResult<Value> {
        let Some(registered) = self.macros.get(name).cloned() else {
            return Err(FormError::unknown_method(self.definition.name(), name));
        };
        registered(self, args)
    }
}

impl fmt::Debug for FormModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormModel")
            .field("name", &self.definition.name())
            .field("method", &self.method)
            .field("form", &self.form)
            .field("fields", &self.fields.len())
            .field("buttons", &self.buttons.len())
            .field("template", &self.template)
            .field("macros", &self.macros.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::config::FormConfig;
    use crate::form::types::MULTIPART;
    use crate::validation::Rule;

    struct ProfileForm {
        setups: Arc<AtomicUsize>,
    }

    impl FormSetup for ProfileForm {
        fn setup(&self, form: &mut FormModel) -> FormResult<()> {
            self.setups.fetch_add(1, Ordering::SeqCst);
            form.text("name").required();
            form.submit("save", "Save");
            Ok(())
        }

        fn update_setup(&self, form: &mut FormModel) -> FormResult<()> {
            self.setup(form)?;
            form.hidden("id");
            Ok(())
        }
    }

    fn model() -> (FormModel, Arc<AtomicUsize>) {
        let setups = Arc::new(AtomicUsize::new(0));
        let services = Services::new(FormConfig::default()).unwrap();
        let form = FormModel::new(
            ProfileForm {
                setups: Arc::clone(&setups),
            },
            services,
        );
        (form, setups)
    }

    #[test]
    fn test_setup_is_lazy_and_runs_once() {
        let (mut form, setups) = model();
        assert!(!form.is_set_up());
        assert!(form.field("name").is_none());

        form.render(None).unwrap();
        form.validation_rules().unwrap();
        form.scripts().unwrap();

        assert_eq!(setups.load(Ordering::SeqCst), 1);
        assert!(form.field("name").is_some());
    }

    #[test]
    fn test_update_runs_update_setup() {
        let (mut form, _) = model();
        form.for_update();
        assert_eq!(form.form().unwrap().method, Method::Put);
        assert!(form.field("id").is_some());
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        let (form, _) = model();
        assert_eq!(form.name(), "ProfileForm");
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(short_type_name("app::forms::UserForm"), "UserForm");
        assert_eq!(short_type_name("app::Wrapper<app::forms::UserForm>"), "Wrapper");
        assert_eq!(short_type_name("UserForm"), "UserForm");
    }

    #[test]
    fn test_assets_skip_fields_that_are_not_included() {
        let (mut form, _) = model();
        form.run_setup().unwrap();
        form.text("a").script("/js/a.js").style("/css/a.css");
        form.text("b")
            .include(false)
            .script("/js/excluded.js")
            .style("/css/excluded.css");
        form.text("c").if_auth().script("/js/auth-only.js");

        assert_eq!(form.scripts().unwrap(), ["/js/a.js"]);
        assert_eq!(form.styles().unwrap(), ["/css/a.css"]);

        form.services().access().acting_as(crate::access::Principal::new("1", "ana"));
        assert_eq!(form.scripts().unwrap(), ["/js/a.js", "/js/auth-only.js"]);
    }

    #[test]
    fn test_file_switches_to_multipart() {
        let (mut form, _) = model();
        form.file("avatar").unwrap();
        assert_eq!(form.form().unwrap().enctype.as_deref(), Some(MULTIPART));
    }

    #[test]
    fn test_validation_rules() {
        let (mut form, _) = model();
        let rules = form.validation_rules().unwrap();
        assert_eq!(rules.get("name"), Some(&vec![Rule::Required]));
    }

    #[test]
    fn test_validate_surfaces_errors() {
        let (mut form, _) = model();
        let err = form.validate(&FormRequest::new()).unwrap_err();
        match err {
            FormError::Validation(errors) => {
                assert_eq!(errors.first("name"), Some("The name field is required."));
            }
            other => panic!("unexpected error: {other}"),
        }

        let validated = form
            .validate(&FormRequest::new().with("name", "Ana").with("other", "x"))
            .unwrap();
        assert_eq!(validated.get("name"), Some(&json!("Ana")));
        assert!(validated.get("other").is_none());
    }

    #[test]
    fn test_call_unknown_macro() {
        let (mut form, _) = model();
        let err = form.call("fooBar", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Call to undefined method ProfileForm::fooBar()");
    }

    #[test]
    fn test_call_registered_macro() {
        let (mut form, _) = model();
        form.register_macro("field_count", |form, _args| {
            form.run_setup()?;
            Ok(json!(form.fields().len()))
        });
        assert_eq!(form.call("field_count", &[]).unwrap(), json!(1));
    }

    #[test]
    fn test_render_uses_model_values() {
        let (mut form, _) = model();
        form.with_model(json!({ "name": "Ana" }));
        let html = form.render(None).unwrap();
        assert!(html.as_str().contains(r#"value="Ana""#));
        assert!(html.as_str().contains(r#"<form method="POST">"#));
        assert!(html.as_str().contains("</form>"));
    }
}
