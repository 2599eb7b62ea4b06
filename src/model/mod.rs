//! Models - The record/operation contract a soft delete layer sits on.
//!
//! A [`ModelBackend`] exposes the CRUD operations of one model over untyped
//! [`Record`]s, filtered by [`Where`] trees. Storage engines implement it;
//! decorators implement it by wrapping another backend.
//!
//! ## Example
//!
//! ```ignore
//! use soft_delete::{CallOptions, FieldDescriptor, FieldType, InMemoryModel, ModelBackend,
//!     ModelDefinition, Query, Where};
//!
//! let users = InMemoryModel::new(
//!     ModelDefinition::new("User")
//!         .with_property("id", FieldDescriptor::id(FieldType::Number))
//!         .with_property("email", FieldDescriptor::new(FieldType::String)),
//! );
//!
//! users.create(record, &CallOptions::new()).await?;
//! let found = users.find(Query::new().filter(Where::eq("email", "a@b.c")), &CallOptions::new()).await?;
//! ```

mod backend;
mod definition;
mod filter;
mod in_memory;
mod instance;

pub use backend::{CallOptions, ModelBackend, UpdateSummary};
pub use definition::{FieldDescriptor, FieldType, ModelDefinition};
pub use filter::{Deleted, Query, Record, Where};
pub use in_memory::InMemoryModel;
pub use instance::{InstancesExt, ModelInstance};
