mod completion;
mod error;
mod model;
mod soft_delete;

pub use completion::CompletionExt;
pub use error::{AttachError, ModelError};
pub use model::{
    CallOptions, Deleted, FieldDescriptor, FieldType, InMemoryModel, InstancesExt,
    ModelBackend, ModelDefinition, ModelInstance, Query, Record, UpdateSummary, Where,
};
pub use soft_delete::{Resolution, Scrub, SoftDelete, SoftDeleteOptions, MIXIN_NAME};

// Re-export so implementors of ModelBackend use the same macro version
pub use async_trait::async_trait;
