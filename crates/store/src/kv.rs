use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Opaque key-value persistence collaborator.
///
/// Implementations only promise read-after-write consistency for a single
/// writer; the game never issues concurrent writes for one player.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;

    /// Read the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous document.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Delete `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
