//! Form buttons.

use indexmap::IndexMap;
use serde::Serialize;

use crate::html::{AttrValue, Attributes, HtmlString, Tag};

/// Button variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    Submit,
    Reset,
    Button,
    /// An anchor styled as a button.
    Link,
}

/// A single form button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub kind: ButtonKind,
    pub text: String,
    /// Target URL, for links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub attributes: Attributes,
}

impl Button {
    pub fn new(kind: ButtonKind, text: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.add_class("btn");
        attributes.add_class(match kind {
            ButtonKind::Submit => "btn-primary",
            _ => "btn-default",
        });
        Self {
            kind,
            text: text.into(),
            url: None,
            attributes,
        }
    }

    /// Set an attribute.
    pub fn attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attributes.set(name, value);
        self
    }

    /// Add a CSS class.
    pub fn class(&mut self, class: &str) -> &mut Self {
        self.attributes.add_class(class);
        self
    }

    pub fn render(&self) -> HtmlString {
        let tag = match self.kind {
            ButtonKind::Link => {
                Tag::new("a").attr("href", self.url.clone().unwrap_or_else(|| "#".to_string()))
            }
            ButtonKind::Submit => Tag::new("button").attr("type", "submit"),
            ButtonKind::Reset => Tag::new("button").attr("type", "reset"),
            ButtonKind::Button => Tag::new("button").attr("type", "button"),
        };
        tag.attrs(&self.attributes).text(&self.text).render()
    }
}

/// Ordered, named collection of buttons. Duplicate names overwrite.
#[derive(Debug, Clone, Default)]
pub struct ButtonCollection {
    buttons: IndexMap<String, Button>,
}

impl ButtonCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a button under `name`, returning it for further configuration.
    pub fn add(&mut self, name: impl Into<String>, button: Button) -> &mut Button {
        let name = name.into();
        let index = self.buttons.insert_full(name, button).0;
        &mut self.buttons[index]
    }

    pub fn submit(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.add(name, Button::new(ButtonKind::Submit, text))
    }

    pub fn reset(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.add(name, Button::new(ButtonKind::Reset, text))
    }

    pub fn button(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Button {
        self.add(name, Button::new(ButtonKind::Button, text))
    }

    pub fn link(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Button {
        let mut button = Button::new(ButtonKind::Link, text);
        button.url = Some(url.into());
        self.add(name, button)
    }

    pub fn get(&self, name: &str) -> Option<&Button> {
        self.buttons.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Button> {
        self.buttons.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Button> {
        self.buttons.shift_remove(name)
    }

    pub fn all(&self) -> impl Iterator<Item = (&String, &Button)> {
        self.buttons.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Render every button in order.
    pub fn render(&self) -> Vec<HtmlString> {
        self.buttons.values().map(Button::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_buttons() {
        let mut buttons = ButtonCollection::new();
        buttons.submit("save", "Save");
        buttons.link("cancel", "/users", "Cancel").class("btn-link");

        let html: Vec<String> = buttons.render().into_iter().map(HtmlString::into_string).collect();
        assert_eq!(
            html,
            vec![
                r#"<button type="submit" class="btn btn-primary">Save</button>"#.to_string(),
                r#"<a href="/users" class="btn btn-default btn-link">Cancel</a>"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_overwrite_in_place() {
        let mut buttons = ButtonCollection::new();
        buttons.submit("save", "Save");
        buttons.reset("clear", "Clear");
        buttons.submit("save", "Store");

        assert_eq!(buttons.len(), 2);
        let names: Vec<&String> = buttons.all().map(|(name, _)| name).collect();
        assert_eq!(names, ["save", "clear"]);
        assert_eq!(buttons.get("save").map(|b| b.text.as_str()), Some("Store"));
    }
}
