use thiserror::Error;

/// Error type for model backend operations.
///
/// Produced by the collaborator; the soft delete layer relays these verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// No record with this identifier.
    #[error("model not found: {model}:{id}")]
    NotFound { model: String, id: String },
    /// A create collided with an existing identifier.
    #[error("duplicate id on {model}: {id}")]
    Duplicate { model: String, id: String },
    /// A write named a field the model does not define.
    #[error("unknown property {property} on model {model}")]
    UnknownProperty { model: String, property: String },
    /// Serialization/deserialization error.
    #[error("model serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("model storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serde(err.to_string())
    }
}

/// Error raised while attaching soft delete to a model.
#[derive(Debug, Error)]
pub enum AttachError {
    /// The model has no field descriptors to resolve against.
    #[error("model {0} defines no properties")]
    NoProperties(String),
    /// The mixin options could not be parsed.
    #[error("invalid soft delete options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
