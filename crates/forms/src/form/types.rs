//! Form element and field type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::html::{AttrValue, Attributes, HtmlString, Tag};

/// Encoding used when a form uploads files.
pub const MULTIPART: &str = "multipart/form-data";

/// HTTP method a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }

    /// Whether browsers cannot submit this method natively, so it travels
    /// in a hidden `_method` input over POST.
    pub fn is_spoofed(&self) -> bool {
        matches!(self, Method::Put | Method::Patch | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<form>` element of a form model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    /// Submission method.
    pub method: Method,

    /// Form action URL.
    pub action: String,

    /// Encoding type, set to multipart when a file field is added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enctype: Option<String>,

    /// Whether to skip HTML5 browser validation.
    pub novalidate: bool,

    /// CSRF token emitted as a hidden `_token` input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Additional form attributes.
    pub attributes: Attributes,
}

impl Form {
    /// Create a new form for the given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            action: String::new(),
            enctype: None,
            novalidate: false,
            token: None,
            attributes: Attributes::new(),
        }
    }

    /// Set the form action URL.
    pub fn action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = action.into();
        self
    }

    /// Switch to multipart encoding for file uploads.
    pub fn with_files(&mut self) -> &mut Self {
        self.enctype = Some(MULTIPART.to_string());
        self
    }

    /// Set the novalidate flag.
    pub fn novalidate(&mut self, value: bool) -> &mut Self {
        self.novalidate = value;
        self
    }

    /// Set the CSRF token.
    pub fn token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    /// Set an extra attribute.
    pub fn attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attributes.set(name, value);
        self
    }

    /// Render the opening tag with its hidden inputs.
    pub fn open(&self) -> HtmlString {
        let method = if self.method == Method::Get { "GET" } else { "POST" };

        let mut attributes = Attributes::new();
        attributes.set("method", method);
        if !self.action.is_empty() {
            attributes.set("action", self.action.as_str());
        }
        if let Some(enctype) = &self.enctype {
            attributes.set("enctype", enctype);
        }
        attributes.set("novalidate", self.novalidate);
        attributes.extend(&self.attributes);

        let mut html = format!("<form{}>", attributes.to_html());

        if let Some(token) = &self.token {
            html.push_str(&hidden_input("_token", token).into_string());
        }
        if self.method.is_spoofed() {
            let spoofed = self.method.as_str().to_uppercase();
            html.push_str(&hidden_input("_method", &spoofed).into_string());
        }

        HtmlString::new(html)
    }

    /// Render the closing tag.
    pub fn close(&self) -> HtmlString {
        HtmlString::new("</form>")
    }
}

fn hidden_input(name: &str, value: &str) -> HtmlString {
    Tag::new("input")
        .attr("type", "hidden")
        .attr("name", name)
        .attr("value", value)
        .render()
}

/// Field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    Email,
    Password,
    /// Any numeric value.
    Number,
    /// Whole numbers only.
    Integer,
    Url,
    /// Multi-line text input.
    Textarea,
    /// Dropdown select.
    Select,
    /// Radio button group.
    Radios,
    /// Single checkbox.
    Checkbox,
    /// Multiple checkboxes.
    Checkboxes,
    /// File upload.
    File,
    /// Hidden field.
    Hidden,
}

impl FieldType {
    /// Get the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Url => "url",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radios => "radios",
            FieldType::Checkbox => "checkbox",
            FieldType::Checkboxes => "checkboxes",
            FieldType::File => "file",
            FieldType::Hidden => "hidden",
        }
    }

    /// The `type` attribute for `<input>`-based controls.
    pub fn input_type(&self) -> Option<&'static str> {
        match self {
            FieldType::Text => Some("text"),
            FieldType::Email => Some("email"),
            FieldType::Password => Some("password"),
            FieldType::Number | FieldType::Integer => Some("number"),
            FieldType::Url => Some("url"),
            FieldType::File => Some("file"),
            FieldType::Hidden => Some("hidden"),
            FieldType::Checkbox => Some("checkbox"),
            FieldType::Textarea | FieldType::Select | FieldType::Radios | FieldType::Checkboxes => {
                None
            }
        }
    }

    /// Whether the field offers a list of options.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radios | FieldType::Checkboxes
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
