//! Soft delete - Logical deletion for any [`ModelBackend`](crate::ModelBackend).
//!
//! Attaching wraps a backend once, at composition time. Deletes through the
//! wrapper mark records instead of removing them, and reads through it skip
//! marked records unless a query asks for them with `Deleted::Included`.
//!
//! ## Example
//!
//! ```ignore
//! use soft_delete::{CallOptions, InMemoryModel, ModelBackend, Query, SoftDelete,
//!     SoftDeleteOptions};
//!
//! let users = SoftDelete::attach(
//!     InMemoryModel::new(definition),
//!     SoftDeleteOptions::new().scrub_fields(["email"]),
//! )?;
//!
//! users.destroy_by_id(json!(1), &CallOptions::new()).await?;
//! let visible = users.find(Query::new(), &CallOptions::new()).await?;
//! let everything = users.find(Query::new().with_deleted(), &CallOptions::new()).await?;
//! ```
//!
//! Recovery is an ordinary `update_attributes` on the inner backend that
//! resets the flag; the layer has no restore operation of its own.

mod config;
mod layer;

pub use config::{Resolution, Scrub, SoftDeleteOptions, MIXIN_NAME};
pub use layer::SoftDelete;
