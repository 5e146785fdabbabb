//! Persistence for Canvas AI projects.
//!
//! Storage is a flat string key-value namespace ([`KeyValueStore`]), the
//! same shape as browser local storage. [`ProjectRepo`] keeps the whole
//! project collection as one JSON array under a single key.

pub mod error;
pub mod kv;
pub mod models;
pub mod repositories;

pub use error::StorageError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use models::{Project, ProjectSummary};
pub use repositories::ProjectRepo;
