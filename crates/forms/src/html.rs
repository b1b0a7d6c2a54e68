//! HTML primitives: escaping, attribute lists, tags, and asset links.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Elements that never carry content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Markup that has already been escaped and can be emitted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlString(String);

impl HtmlString {
    /// Wrap markup that is known to be safe.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escape plain text into markup.
    pub fn text(text: &str) -> Self {
        Self(html_escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Append more markup.
    pub fn push(&mut self, html: &HtmlString) {
        self.0.push_str(&html.0);
    }
}

impl fmt::Display for HtmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HtmlString {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl Serialize for HtmlString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// `name="value"`.
    Text(String),
    /// Boolean attribute: present when true, omitted when false.
    Flag(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

/// Ordered attribute list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes(IndexMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, keeping its original position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Append a CSS class to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        match self.0.get_mut("class") {
            Some(AttrValue::Text(existing)) if !existing.is_empty() => {
                if !existing.split_whitespace().any(|c| c == class) {
                    existing.push(' ');
                    existing.push_str(class);
                }
            }
            _ => {
                self.0
                    .insert("class".to_string(), AttrValue::Text(class.to_string()));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.shift_remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another list on top of this one. Classes accumulate; every
    /// other attribute is overwritten.
    pub fn extend(&mut self, other: &Attributes) {
        for (name, value) in &other.0 {
            match value {
                AttrValue::Text(classes) if name == "class" => {
                    for class in classes.split_whitespace() {
                        self.add_class(class);
                    }
                }
                _ => {
                    self.0.insert(name.clone(), value.clone());
                }
            }
        }
    }

    /// Render as ` name="value"` pairs, each with a leading space.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (name, value) in &self.0 {
            match value {
                AttrValue::Text(text) => {
                    html.push(' ');
                    html.push_str(name);
                    html.push_str("=\"");
                    html.push_str(&html_escape(text));
                    html.push('"');
                }
                AttrValue::Flag(true) => {
                    html.push(' ');
                    html.push_str(name);
                }
                AttrValue::Flag(false) => {}
            }
        }
        html
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

/// A plain HTML element.
///
/// Also used as a decorative entry in a field collection (headings,
/// separators, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub content: Option<HtmlString>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            content: None,
        }
    }

    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Merge a whole attribute list.
    pub fn attrs(mut self, attributes: &Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Set escaped text content.
    pub fn text(mut self, text: &str) -> Self {
        self.content = Some(HtmlString::text(text));
        self
    }

    /// Set raw inner markup.
    pub fn html(mut self, html: HtmlString) -> Self {
        self.content = Some(html);
        self
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Render the element.
    pub fn render(&self) -> HtmlString {
        let attrs = self.attributes.to_html();
        if self.is_void() {
            return HtmlString::new(format!("<{}{attrs}>", self.name));
        }
        let content = self.content.as_ref().map(HtmlString::as_str).unwrap_or("");
        HtmlString::new(format!("<{name}{attrs}>{content}</{name}>", name = self.name))
    }
}

/// Build a `<script>` tag for an external script.
pub fn script(src: &str) -> HtmlString {
    Tag::new("script").attr("src", src).render()
}

/// Build a stylesheet `<link>` tag.
pub fn style(href: &str) -> HtmlString {
    Tag::new("link")
        .attr("media", "all")
        .attr("type", "text/css")
        .attr("rel", "stylesheet")
        .attr("href", href)
        .render()
}
