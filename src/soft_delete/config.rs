//! Soft delete options and their resolution against a model definition.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{FieldDescriptor, FieldType, ModelDefinition, Record};
use crate::AttachError;

/// Key under a model configuration's `mixins` object that enables the layer.
pub const MIXIN_NAME: &str = "SoftDelete";

/// Which fields are nulled when a record is soft deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scrub {
    /// `false` scrubs nothing; `true` scrubs every non-identifier field.
    Enabled(bool),
    /// Exactly these fields.
    Fields(Vec<String>),
}

impl Default for Scrub {
    fn default() -> Self {
        Scrub::Enabled(false)
    }
}

/// Options accepted when attaching soft delete to a model.
///
/// Deserializes from the mixin options object, e.g.
/// `{ "deletedAt": "removedOn", "_isDeleted": "removed", "scrub": ["email"] }`.
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftDeleteOptions {
    /// Name of the deletion timestamp field.
    #[serde(rename = "deletedAt")]
    pub deleted_at: String,
    /// Name of the deletion flag field.
    #[serde(rename = "_isDeleted")]
    pub is_deleted: String,
    pub scrub: Scrub,
}

impl Default for SoftDeleteOptions {
    fn default() -> Self {
        Self {
            deleted_at: "deletedAt".into(),
            is_deleted: "_isDeleted".into(),
            scrub: Scrub::default(),
        }
    }
}

impl SoftDeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted_at_field(mut self, name: impl Into<String>) -> Self {
        self.deleted_at = name.into();
        self
    }

    pub fn is_deleted_field(mut self, name: impl Into<String>) -> Self {
        self.is_deleted = name.into();
        self
    }

    pub fn scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Scrub every field except identifiers and the deletion flag.
    pub fn scrub_all(self) -> Self {
        self.scrub(Scrub::Enabled(true))
    }

    pub fn scrub_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scrub(Scrub::Fields(fields.into_iter().map(Into::into).collect()))
    }

    /// Parse a mixin options object.
    pub fn from_json(value: &Value) -> Result<Self, AttachError> {
        Ok(Self::deserialize(value)?)
    }

    /// Read the `mixins.SoftDelete` entry of a model configuration document.
    ///
    /// Returns `None` when the mixin is absent or set to `false`; `true`
    /// enables it with default options.
    pub fn from_model_config(config: &Value) -> Result<Option<Self>, AttachError> {
        let entry = config.get("mixins").and_then(|mixins| mixins.get(MIXIN_NAME));
        match entry {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::Bool(true)) => Ok(Some(Self::default())),
            Some(options) => Self::from_json(options).map(Some),
        }
    }
}

/// Options resolved against a model: the two marker fields to define and
/// the fixed scrub patch.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub deleted_at_field: String,
    pub deleted_at: FieldDescriptor,
    pub is_deleted_field: String,
    pub is_deleted: FieldDescriptor,
    /// Field name to `null` for every scrubbed field.
    pub scrubbed: Record,
}

impl Resolution {
    /// Resolve `options` against the fields `definition` declares right now.
    pub fn resolve(
        options: &SoftDeleteOptions,
        definition: &ModelDefinition,
    ) -> Result<Self, AttachError> {
        if definition.properties().is_empty() {
            return Err(AttachError::NoProperties(definition.name().to_string()));
        }

        let is_deleted = options.is_deleted.as_str();
        let scrubbable = |name: &str| !definition.is_id(name) && name != is_deleted;

        let fields: Vec<&str> = match &options.scrub {
            Scrub::Enabled(false) => Vec::new(),
            Scrub::Enabled(true) => definition
                .properties()
                .keys()
                .map(String::as_str)
                .filter(|name| scrubbable(*name))
                .collect(),
            Scrub::Fields(names) => names
                .iter()
                .map(String::as_str)
                .filter(|name| {
                    let keep = scrubbable(*name);
                    if !keep {
                        warn!(
                            model = definition.name(),
                            field = *name,
                            "refusing to scrub identifier or deletion flag"
                        );
                    }
                    keep
                })
                .collect(),
        };

        let scrubbed = fields
            .into_iter()
            .map(|name| (name.to_string(), Value::Null))
            .collect();

        Ok(Self {
            deleted_at_field: options.deleted_at.clone(),
            deleted_at: FieldDescriptor::new(FieldType::Date)
                .required(false)
                .default_value(Value::Null),
            is_deleted_field: options.is_deleted.clone(),
            is_deleted: FieldDescriptor::new(FieldType::Boolean)
                .required(true)
                .default_value(false),
            scrubbed,
        })
    }
}
