//! ModelInstance - A record bound to the backend it came from.

use serde_json::Value;

use super::{CallOptions, ModelBackend, Record};
use crate::ModelError;

/// A record together with the backend that owns it, exposing the
/// instance-level operations.
pub struct ModelInstance<'a, B: ?Sized> {
    backend: &'a B,
    data: Record,
}

impl<'a, B: ModelBackend + ?Sized> ModelInstance<'a, B> {
    pub fn new(backend: &'a B, data: Record) -> Self {
        Self { backend, data }
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn into_data(self) -> Record {
        self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn id(&self) -> Option<&Value> {
        self.data.get(self.backend.definition().id_field())
    }

    /// Apply `patch` to this record and refresh the local copy.
    pub async fn update_attributes(
        &mut self,
        patch: Record,
        options: &CallOptions,
    ) -> Result<&Record, ModelError> {
        self.data = self
            .backend
            .update_attributes(&self.data, patch, options)
            .await?;
        Ok(&self.data)
    }

    /// Delete this record through the backend and keep its returned state.
    pub async fn destroy(&mut self, options: &CallOptions) -> Result<&Record, ModelError> {
        self.data = self.backend.destroy_instance(&self.data, options).await?;
        Ok(&self.data)
    }

    /// Alias of [`destroy`](Self::destroy).
    pub async fn remove(&mut self, options: &CallOptions) -> Result<&Record, ModelError> {
        self.data = self.backend.remove_instance(&self.data, options).await?;
        Ok(&self.data)
    }

    /// Alias of [`destroy`](Self::destroy).
    pub async fn delete(&mut self, options: &CallOptions) -> Result<&Record, ModelError> {
        self.data = self.backend.delete_instance(&self.data, options).await?;
        Ok(&self.data)
    }
}

/// Extension trait for binding records to any ModelBackend.
pub trait InstancesExt: ModelBackend + Sized {
    /// Wrap a record as an instance of this model.
    fn instance(&self, data: Record) -> ModelInstance<'_, Self> {
        ModelInstance::new(self, data)
    }
}

impl<B: ModelBackend> InstancesExt for B {}
