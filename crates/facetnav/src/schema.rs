//! Model metadata.
//!
//! This module describes the fields of the model being filtered: what kind of
//! values each holds, whether it points at related records, and whether it
//! has a fixed set of choices. The filter set consults it once, when filters
//! are built; nothing here is looked at per request.

use crate::value::FieldValue;

/// The storage type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Integer,
    Boolean,
    Date,
    DateTime,
    /// Related record id (set automatically for relation fields)
    Ref,
}

impl ValueType {
    pub fn is_temporal(self) -> bool {
        matches!(self, ValueType::Date | ValueType::DateTime)
    }
}

/// A field's link to another model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Name of the related model, passed back to the data source for labels
    pub model: String,
    /// Whether a record can point at many related records
    pub many: bool,
}

/// Metadata for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    pub name: String,

    /// Human-readable name; defaults to the field name with spaces for underscores
    pub verbose_name: String,

    pub value_type: ValueType,

    pub relation: Option<Relation>,

    /// Enumerated domain, in declaration order: `(stored value, label)`
    pub choices: Vec<(FieldValue, String)>,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        Self {
            verbose_name: name.replace('_', " "),
            name,
            value_type,
            relation: None,
            choices: Vec::new(),
        }
    }

    /// A field pointing at a single record of `model`.
    pub fn foreign_key(name: impl Into<String>, model: impl Into<String>) -> Self {
        let mut meta = Self::new(name, ValueType::Ref);
        meta.relation = Some(Relation {
            model: model.into(),
            many: false,
        });
        meta
    }

    /// A field pointing at any number of records of `model`.
    pub fn many_to_many(name: impl Into<String>, model: impl Into<String>) -> Self {
        let mut meta = Self::new(name, ValueType::Ref);
        meta.relation = Some(Relation {
            model: model.into(),
            many: true,
        });
        meta
    }

    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }

    pub fn with_choices<I, V, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<FieldValue>,
        L: Into<String>,
    {
        self.choices = choices
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        self
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Label shown above the field's choices: the verbose name, first letter capitalised.
    pub fn display_label(&self) -> String {
        capfirst(&self.verbose_name)
    }
}

/// Metadata for a model: its name and fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelMeta {
    pub name: String,
    pub fields: Vec<FieldMeta>,
}

impl ModelMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
