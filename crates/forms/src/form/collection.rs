//! Ordered, named collection of fields and decorative tags.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::FormResult;
use crate::html::{HtmlString, Tag};
use crate::validation::{RuleSet, ValidationErrors};

use super::field::{FieldBuilder, FieldFactory};
use super::types::FieldType;

/// A borrowed collection entry.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    /// A real form field.
    Field(&'a FieldBuilder),
    /// Decorative markup such as headings or separators.
    Tag(&'a Tag),
}

impl<'a> Entry<'a> {
    pub fn as_field(&self) -> Option<&'a FieldBuilder> {
        match self {
            Entry::Field(field) => Some(field),
            Entry::Tag(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Field,
    Tag,
}

/// Insertion-ordered mapping from name to entry.
///
/// Adding a name that already exists replaces the entry in place.
#[derive(Debug, Clone)]
pub struct FieldCollection {
    factory: FieldFactory,
    order: IndexMap<String, Kind>,
    fields: IndexMap<String, FieldBuilder>,
    tags: IndexMap<String, Tag>,
    tag_count: usize,
}

impl FieldCollection {
    pub fn new(factory: FieldFactory) -> Self {
        Self {
            factory,
            order: IndexMap::new(),
            fields: IndexMap::new(),
            tags: IndexMap::new(),
            tag_count: 0,
        }
    }

    pub fn factory(&self) -> &FieldFactory {
        &self.factory
    }

    /// Store a field builder under its name.
    pub fn insert(&mut self, builder: FieldBuilder) -> &mut FieldBuilder {
        let name = builder.name().to_string();
        self.tags.shift_remove(&name);
        self.order.insert(name.clone(), Kind::Field);
        let index = self.fields.insert_full(name, builder).0;
        &mut self.fields[index]
    }

    /// Build and store a field of any type.
    pub fn add(&mut self, name: impl Into<String>, field_type: FieldType) -> &mut FieldBuilder {
        let builder = self.factory.make(name, field_type);
        self.insert(builder)
    }

    /// Build and store a field with options.
    pub fn add_with_options<K, V>(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> &mut FieldBuilder
    where
        K: Into<String>,
        V: Into<String>,
    {
        let builder = self.factory.make_with_options(name, field_type, options);
        self.insert(builder)
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Text)
    }

    pub fn email(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Email)
    }

    pub fn password(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Password)
    }

    pub fn number(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Number)
    }

    pub fn integer(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Integer)
    }

    pub fn url(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Url)
    }

    pub fn textarea(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Textarea)
    }

    pub fn checkbox(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Checkbox)
    }

    pub fn file(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::File)
    }

    pub fn hidden(&mut self, name: impl Into<String>) -> &mut FieldBuilder {
        self.add(name, FieldType::Hidden)
    }

    /// Store a decorative tag under a positional key.
    pub fn tag(&mut self, tag: Tag) -> &Tag {
        self.tag_count += 1;
        let key = format!("#tag{}", self.tag_count);
        self.fields.shift_remove(&key);
        self.order.insert(key.clone(), Kind::Tag);
        let index = self.tags.insert_full(key, tag).0;
        &self.tags[index]
    }

    /// Get a field builder by name. Tags and unknown names yield `None`.
    pub fn get(&self, name: &str) -> Option<&FieldBuilder> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldBuilder> {
        self.fields.get_mut(name)
    }

    /// Get any entry by key.
    pub fn entry(&self, key: &str) -> Option<Entry<'_>> {
        match self.order.get(key)? {
            Kind::Field => self.fields.get(key).map(Entry::Field),
            Kind::Tag => self.tags.get(key).map(Entry::Tag),
        }
    }

    /// Remove a field or tag. Returns whether anything was stored under `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.order.shift_remove(key) {
            Some(Kind::Field) => self.fields.shift_remove(key).is_some(),
            Some(Kind::Tag) => self.tags.shift_remove(key).is_some(),
            None => false,
        }
    }

    /// All entries, fields and tags, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&String, Entry<'_>)> {
        self.order.iter().filter_map(move |(key, kind)| {
            let entry = match kind {
                Kind::Field => self.fields.get(key).map(Entry::Field),
                Kind::Tag => self.tags.get(key).map(Entry::Tag),
            };
            entry.map(|entry| (key, entry))
        })
    }

    /// Only the real fields, in insertion order.
    pub fn only_fields(&self) -> impl Iterator<Item = (&String, &FieldBuilder)> {
        self.all()
            .filter_map(|(name, entry)| entry.as_field().map(|field| (name, field)))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Rules of every included field, keyed by name.
    pub fn validation_rules(&self) -> RuleSet {
        self.only_fields()
            .filter(|(_, field)| field.is_included())
            .map(|(name, field)| (name.clone(), field.field().validation_rules()))
            .collect()
    }

    /// Render every visible entry in order, skipping empty output.
    pub fn render(
        &self,
        values: Option<&Map<String, Value>>,
        errors: Option<&ValidationErrors>,
    ) -> FormResult<Vec<HtmlString>> {
        let mut rendered = Vec::with_capacity(self.order.len());
        for (_, entry) in self.all() {
            let html = match entry {
                Entry::Field(field) => field.render_with(values, errors)?,
                Entry::Tag(tag) => tag.render(),
            };
            if !html.is_empty() {
                rendered.push(html);
            }
        }
        Ok(rendered)
    }
}
