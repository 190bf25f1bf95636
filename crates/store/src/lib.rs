//! Backstreet persistence layer.
//!
//! The game only needs get/set/remove over JSON documents, so storage is a
//! small [`KeyValueStore`] trait with interchangeable backends:
//!
//! - [`MemoryStore`]: process-local map, also the last-resort fallback.
//! - [`FileStore`]: one JSON file per key under a data directory.
//! - [`FallbackStore`]: routes to a fallback backend when the primary fails.
//!
//! [`repositories`] wraps the per-player keys with typed load/save helpers.

pub mod error;
pub mod fallback;
pub mod file;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod repositories;

use std::sync::Arc;

pub use error::StoreError;
pub use fallback::FallbackStore;
pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;

/// Shared, dynamically dispatched store handle.
pub type SharedStore = Arc<dyn KeyValueStore>;
