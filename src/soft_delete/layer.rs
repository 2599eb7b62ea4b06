//! SoftDelete - A ModelBackend decorator that turns deletes into marker
//! updates and hides marked records from reads.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, trace};

use super::{Resolution, SoftDeleteOptions};
use crate::model::{
    CallOptions, FieldDescriptor, ModelBackend, ModelDefinition, Query, Record, UpdateSummary,
    Where,
};
use crate::{AttachError, ModelError};

/// A `ModelBackend` wrapper with soft delete semantics.
///
/// - `destroy_all` / `destroy_by_id` (and their aliases) become a single
///   `update_all` setting the deletion timestamp, the deletion flag and the
///   scrubbed fields.
/// - `destroy_instance` becomes a single `update_attributes` with the same
///   patch.
/// - `find` and `find_or_create` only see records whose flag is `false`
///   unless the query carries `Deleted::Included`.
/// - `count` and `update_all` always exclude flagged records; their
///   arguments have no way to opt out.
///
/// Everything else passes straight through to the wrapped backend.
pub struct SoftDelete<M> {
    inner: M,
    deleted_at: String,
    is_deleted: String,
    scrubbed: Record,
}

impl<M: ModelBackend> SoftDelete<M> {
    /// Attach soft delete to `inner`.
    ///
    /// Resolves `options` against the current field descriptors, then defines
    /// the timestamp and flag fields on `inner`. The scrub set is fixed here.
    pub fn attach(mut inner: M, options: SoftDeleteOptions) -> Result<Self, AttachError> {
        debug!(model = inner.definition().name(), ?options, "attaching soft delete");

        let resolution = Resolution::resolve(&options, inner.definition())?;
        inner.define_property(&resolution.deleted_at_field, resolution.deleted_at);
        inner.define_property(&resolution.is_deleted_field, resolution.is_deleted);

        Ok(SoftDelete {
            inner,
            deleted_at: resolution.deleted_at_field,
            is_deleted: resolution.is_deleted_field,
            scrubbed: resolution.scrubbed,
        })
    }
}

impl<M> SoftDelete<M> {
    /// Access the wrapped backend. Calls made on it bypass soft delete.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    pub fn deleted_at_field(&self) -> &str {
        &self.deleted_at
    }

    pub fn is_deleted_field(&self) -> &str {
        &self.is_deleted
    }

    /// The fixed field-to-null patch applied on every soft delete.
    pub fn scrubbed(&self) -> &Record {
        &self.scrubbed
    }

    /// Scrubbed fields first, then the markers, so the markers always win.
    fn deletion_patch(&self) -> Record {
        let mut patch = self.scrubbed.clone();
        patch.insert(
            self.deleted_at.clone(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        patch.insert(self.is_deleted.clone(), Value::Bool(true));
        patch
    }

    fn not_deleted(&self) -> Where {
        Where::eq(self.is_deleted.clone(), false)
    }

    fn exclude_deleted(&self, filter: Where) -> Where {
        Where::and(filter, self.not_deleted())
    }

    fn scope(&self, mut query: Query) -> Query {
        if !query.includes_deleted() {
            query.filter = Some(match query.filter.take() {
                None => self.not_deleted(),
                Some(filter) => self.exclude_deleted(filter),
            });
        }
        query
    }
}

#[async_trait]
impl<M: ModelBackend> ModelBackend for SoftDelete<M> {
    fn definition(&self) -> &ModelDefinition {
        self.inner.definition()
    }

    fn define_property(&mut self, name: &str, descriptor: FieldDescriptor) {
        self.inner.define_property(name, descriptor);
    }

    async fn create(&self, data: Record, options: &CallOptions) -> Result<Record, ModelError> {
        self.inner.create(data, options).await
    }

    async fn find(&self, query: Query, options: &CallOptions) -> Result<Vec<Record>, ModelError> {
        let query = self.scope(query);
        trace!(model = self.definition().name(), ?query, "find");
        self.inner.find(query, options).await
    }

    async fn find_or_create(
        &self,
        query: Query,
        data: Record,
        options: &CallOptions,
    ) -> Result<(Record, bool), ModelError> {
        let query = self.scope(query);
        trace!(model = self.definition().name(), ?query, "find_or_create");
        self.inner.find_or_create(query, data, options).await
    }

    async fn count(&self, filter: Where, options: &CallOptions) -> Result<u64, ModelError> {
        let filter = self.exclude_deleted(filter);
        trace!(model = self.definition().name(), ?filter, "count");
        self.inner.count(filter, options).await
    }

    async fn update_all(
        &self,
        filter: Where,
        patch: Record,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        let filter = self.exclude_deleted(filter);
        trace!(model = self.definition().name(), ?filter, "update_all");
        self.inner.update_all(filter, patch, options).await
    }

    async fn update_attributes(
        &self,
        instance: &Record,
        patch: Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError> {
        self.inner.update_attributes(instance, patch, options).await
    }

    async fn destroy_all(
        &self,
        filter: Where,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        debug!(model = self.definition().name(), ?filter, "soft deleting");
        self.update_all(filter, self.deletion_patch(), options).await
    }

    async fn destroy_by_id(
        &self,
        id: Value,
        options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        let filter = Where::eq(self.definition().id_field(), id);
        debug!(model = self.definition().name(), ?filter, "soft deleting by id");
        self.update_all(filter, self.deletion_patch(), options).await
    }

    async fn destroy_instance(
        &self,
        instance: &Record,
        options: &CallOptions,
    ) -> Result<Record, ModelError> {
        let id = instance.get(self.definition().id_field());
        debug!(model = self.definition().name(), ?id, "soft deleting instance");
        self.inner
            .update_attributes(instance, self.deletion_patch(), options)
            .await
    }
}
