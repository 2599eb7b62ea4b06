//! InMemoryModel - IndexMap-backed model backend for testing and development.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use super::{
    CallOptions, FieldDescriptor, ModelBackend, ModelDefinition, Query, Record, UpdateSummary,
    Where,
};
use crate::ModelError;

type Storage = IndexMap<String, Record>;

/// In-memory model backend.
///
/// Records are keyed by their stringified identifier and returned in
/// insertion order. Clone-friendly via Arc: clones share storage.
/// Deletes are physical; `Query::deleted` is ignored here.
#[derive(Clone)]
pub struct InMemoryModel {
    definition: ModelDefinition,
    storage: Arc<RwLock<Storage>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryModel {
    /// Create a new empty backend for this model.
    pub fn new(definition: ModelDefinition) -> Self {
        Self {
            definition,
            storage: Arc::new(RwLock::new(IndexMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Number of stored records, deleted or not.
    pub fn len(&self) -> Result<usize, ModelError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ModelError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Storage>, ModelError> {
        self.storage
            .read()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Storage>, ModelError> {
        self.storage
            .write()
            .map_err(|_| ModelError::Storage("lock poisoned".into()))
    }

    /// JSON text of the identifier, so `"1"` and `1` stay distinct.
    fn make_key(id: &Value) -> String {
        id.to_string()
    }

    fn check_fields(&self, data: &Record) -> Result<(), ModelError> {
        match data.keys().find(|k| self.definition.property(k).is_none()) {
            Some(unknown) => Err(ModelError::UnknownProperty {
                model: self.definition.name().to_string(),
                property: unknown.clone(),
            }),
            None => Ok(()),
        }
    }

    fn instance_key(&self, instance: &Record) -> Result<String, ModelError> {
        let id_field = self.definition.id_field();
        match instance.get(id_field) {
            Some(id) if !id.is_null() => Ok(Self::make_key(id)),
            _ => Err(ModelError::NotFound {
                model: self.definition.name().to_string(),
                id: "<unsaved>".into(),
            }),
        }
    }

    fn insert_locked(&self, storage: &mut Storage, mut data: Record) -> Result<Record, ModelError> {
        self.check_fields(&data)?;

        for (name, descriptor) in self.definition.properties() {
            if let Some(default) = &descriptor.default {
                data.entry(name.clone()).or_insert_with(|| default.clone());
            }
        }

        let id_field = self.definition.id_field().to_string();
        let id = match data.get(&id_field) {
            Some(id) if !id.is_null() => {
                if let Some(n) = id.as_u64() {
                    self.next_id.fetch_max(n.saturating_add(1), Ordering::SeqCst);
                }
                id.clone()
            }
            _ => {
                let id = Value::from(self.next_id.fetch_add(1, Ordering::SeqCst));
                data.insert(id_field, id.clone());
                id
            }
        };

        let key = Self::make_key(&id);
        if storage.contains_key(&key) {
            return Err(ModelError::Duplicate {
                model: self.definition.name().to_string(),
                id: key,
            });
        }

        storage.insert(key, data.clone());
        Ok(data)
    }

    /// Key the record stored under `key` will have once `patch` is applied.
    fn patched_key(&self, key: &str, patch: &Record) -> Result<String, ModelError> {
        match patch.get(self.definition.id_field()) {
            None => Ok(key.to_string()),
            Some(Value::Null) => Err(ModelError::Storage(format!(
                "cannot clear the identifier of {} {key}",
                self.definition.name()
            ))),
            Some(id) => Ok(Self::make_key(id)),
        }
    }

    /// Apply `patch` to one stored record, moving it to its new key in place
    /// when the patch changes its identifier.
    fn patch_locked(
        &self,
        storage: &mut Storage,
        key: &str,
        patch: &Record,
    ) -> Result<Record, ModelError> {
        let new_key = self.patched_key(key, patch)?;
        if new_key != key && storage.contains_key(&new_key) {
            return Err(ModelError::Duplicate {
                model: self.definition.name().to_string(),
                id: new_key,
            });
        }

        let Some((index, _, mut record)) = storage.shift_remove_full(key) else {
            return Err(ModelError::NotFound {
                model: self.definition.name().to_string(),
                id: key.to_string(),
            });
        };
        record.extend(patch.clone());
        storage.shift_insert(index, new_key, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ModelBackend for InMemoryModel {
    fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    fn define_property(&mut self, name: &str, descriptor: FieldDescriptor) {
        self.definition.define_property(name, descriptor);
    }

    async fn create(&self, data: Record, _options: &CallOptions) -> Result<Record, ModelError> {
        let mut storage = self.write()?;
        self.insert_locked(&mut storage, data)
    }

    async fn find(&self, query: Query, _options: &CallOptions) -> Result<Vec<Record>, ModelError> {
        let storage = self.read()?;
        Ok(storage
            .values()
            .filter(|record| query.matches(record))
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn find_or_create(
        &self,
        query: Query,
        data: Record,
        _options: &CallOptions,
    ) -> Result<(Record, bool), ModelError> {
        let mut storage = self.write()?;
        if let Some(found) = storage.values().find(|record| query.matches(record)) {
            return Ok((found.clone(), false));
        }
        let created = self.insert_locked(&mut storage, data)?;
        Ok((created, true))
    }

    async fn count(&self, filter: Where, _options: &CallOptions) -> Result<u64, ModelError> {
        let storage = self.read()?;
        Ok(storage.values().filter(|record| filter.matches(record)).count() as u64)
    }

    async fn update_all(
        &self,
        filter: Where,
        patch: Record,
        _options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        self.check_fields(&patch)?;

        let mut storage = self.write()?;
        let keys: Vec<String> = storage
            .iter()
            .filter(|(_, record)| filter.matches(record))
            .map(|(key, _)| key.clone())
            .collect();

        // One identifier cannot be given to several records.
        if keys.len() > 1 {
            if let Some(id) = patch.get(self.definition.id_field()) {
                self.patched_key(&keys[0], &patch)?;
                return Err(ModelError::Duplicate {
                    model: self.definition.name().to_string(),
                    id: Self::make_key(id),
                });
            }
        }

        for key in &keys {
            self.patch_locked(&mut storage, key, &patch)?;
        }

        Ok(UpdateSummary::new(keys.len() as u64))
    }

    async fn update_attributes(
        &self,
        instance: &Record,
        patch: Record,
        _options: &CallOptions,
    ) -> Result<Record, ModelError> {
        self.check_fields(&patch)?;

        let key = self.instance_key(instance)?;
        let mut storage = self.write()?;
        self.patch_locked(&mut storage, &key, &patch)
    }

    async fn destroy_all(
        &self,
        filter: Where,
        _options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        let mut storage = self.write()?;
        let before = storage.len();
        storage.retain(|_, record| !filter.matches(record));
        Ok(UpdateSummary::new((before - storage.len()) as u64))
    }

    async fn destroy_by_id(
        &self,
        id: Value,
        _options: &CallOptions,
    ) -> Result<UpdateSummary, ModelError> {
        let mut storage = self.write()?;
        let removed = storage.shift_remove(&Self::make_key(&id)).is_some();
        Ok(UpdateSummary::new(u64::from(removed)))
    }

    async fn destroy_instance(
        &self,
        instance: &Record,
        _options: &CallOptions,
    ) -> Result<Record, ModelError> {
        let key = self.instance_key(instance)?;
        let mut storage = self.write()?;
        storage
            .shift_remove(&key)
            .ok_or_else(|| ModelError::NotFound {
                model: self.definition.name().to_string(),
                id: key,
            })
    }
}
