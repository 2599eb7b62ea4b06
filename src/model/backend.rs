//! ModelBackend - Abstract async operations over one model.

use async_trait::async_trait;
use serde_json::Value;

use super::{FieldDescriptor, ModelDefinition, Query, Record, Where};
use crate::ModelError;

/// Opaque per-call options handed through to the backend untouched
/// (transaction handles, access tokens, request context).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    values: Record,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Number of records affected.
    pub count: u64,
}

impl UpdateSummary {
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

/// Abstract operations over the records of one model.
///
/// Implemented by storage backends and by decorators that wrap another
/// backend. Alias methods are provided so every implementor shares their
/// semantics.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// The field descriptors of this model.
    fn definition(&self) -> &ModelDefinition;

    /// Add (or redefine) a field on this model.
    fn define_property(&mut self, name: &str, descriptor: FieldDescriptor);

    /// Insert a new record.
    async fn create(&self, data: Record, options: &CallOptions) -> Result<Record, ModelError>;

    /// Read the records matching a query.
    async fn find(&self, query: Query, options: &CallOptions) -> Result<Vec<Record>, ModelError>;

    /// Return the first record matching `query`, or create one from `data`.
    /// The flag is `true` when the record was created.
    async fn find_or_create(
        &self,
        query: Query,
        data: Record,
        options: &CallOptions,
    ) -> Result<(Record, bool), ModelError>;

    /// Count records matching a filter.
    async fn count(&self, filter: Where, options: &CallOptions) -> Result<u64, ModelError>;

    /// Apply `patch` to every record matching `filter`.
    async fn update_all(
        &self,
        filter: Where,
        patch: Record,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError>;

    /// Apply `patch` to one known record and return its new state.
    async fn update_attributes(
        &self,
        instance: &Record,
        patch: Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError>;

    /// Delete every record matching `filter`.
    async fn destroy_all(
        &self,
        filter: Where,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError>;

    /// Delete the record with this identifier.
    async fn destroy_by_id(
        &self,
        id: Value,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError>;

    /// Delete one known record, returning its last state.
    async fn destroy_instance(
        &self,
        instance: &Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError>;

    /// First record matching `query`.
    async fn find_one(
        &self,
        query: Query,
        options: &CallOptions,
    ) -> Result<Option<Record>, ModelError> {
        let found = self.find(query.limit(1), options).await?;
        Ok(found.into_iter().next())
    }

    /// Record with this identifier.
    async fn find_by_id(
        &self,
        id: Value,
        options: &CallOptions,
    ) -> Result<Option<Record>, ModelError> {
        let query = Query::new().filter(Where::eq(self.definition().id_field(), id));
        self.find_one(query, options).await
    }

    /// Alias of [`update_all`](Self::update_all).
    async fn update(
        &self,
        filter: Where,
        patch: Record,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        self.update_all(filter, patch, options).await
    }

    /// Alias of [`destroy_all`](Self::destroy_all).
    async fn remove(&self, filter: Where, options: &CallOptions) -> Result<UpdateSummary, ModelError> {
        self.destroy_all(filter, options).await
    }

    /// Alias of [`destroy_all`](Self::destroy_all).
    async fn delete_all(
        &self,
        filter: Where,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        self.destroy_all(filter, options).await
    }

    /// Alias of [`destroy_by_id`](Self::destroy_by_id).
    async fn remove_by_id(
        &self,
        id: Value,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        self.destroy_by_id(id, options).await
    }

    /// Alias of [`destroy_by_id`](Self::destroy_by_id).
    async fn delete_by_id(
        &self,
        id: Value,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        self.destroy_by_id(id, options).await
    }

    /// Alias of [`destroy_instance`](Self::destroy_instance).
    async fn remove_instance(
        &self,
        instance: &Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError> {
        self.destroy_instance(instance, options).await
    }

    /// Alias of [`destroy_instance`](Self::destroy_instance).
    async fn delete_instance(
        &self,
        instance: &Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError> {
        self.destroy_instance(instance, options).await
    }
}
