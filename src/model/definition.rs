//! ModelDefinition - Field descriptors for a model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Any,
}

/// Describes one field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether this field identifies the record.
    #[serde(default)]
    pub id: bool,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
            id: false,
        }
    }

    /// An identifier field.
    pub fn id(field_type: FieldType) -> Self {
        Self {
            id: true,
            ..Self::new(field_type)
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// The schema of a model: its name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    name: String,
    properties: IndexMap<String, FieldDescriptor>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder form of [`define_property`](Self::define_property).
    pub fn with_property(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.define_property(name, descriptor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &IndexMap<String, FieldDescriptor> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&FieldDescriptor> {
        self.properties.get(name)
    }

    /// Add a field, or replace the descriptor of an existing one in place.
    pub fn define_property(&mut self, name: impl Into<String>, descriptor: FieldDescriptor) {
        self.properties.insert(name.into(), descriptor);
    }

    /// Name of the first identifier field, `"id"` when none is flagged.
    pub fn id_field(&self) -> &str {
        self.properties
            .iter()
            .find(|(_, descriptor)| descriptor.id)
            .map(|(name, _)| name.as_str())
            .unwrap_or("id")
    }

    pub fn is_id(&self, name: &str) -> bool {
        self.properties.get(name).is_some_and(|d| d.id)
    }
}
