//! Fallback-on-error decorator over two stores.
//!
//! Every operation goes to the primary backend first. When the primary
//! fails the operation is retried against the fallback, logging a warning;
//! only when both fail does the caller see an error. A primary read that
//! finds nothing also consults the fallback, so documents written while the
//! primary was unreachable remain visible.
//!
//! A key whose latest write or removal only reached the fallback is marked
//! dirty. Dirty keys are read from the fallback and pushed back to the
//! primary on the next read that finds it reachable; until then the
//! primary's copy is stale and never returned.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::SharedStore;

pub struct FallbackStore {
    primary: SharedStore,
    fallback: SharedStore,
    dirty: RwLock<HashSet<String>>,
}

impl FallbackStore {
    pub fn new(primary: SharedStore, fallback: SharedStore) -> Self {
        Self {
            primary,
            fallback,
            dirty: RwLock::new(HashSet::new()),
        }
    }

    /// Keys whose current value lives only in the fallback.
    pub async fn dirty_keys(&self) -> Vec<String> {
        self.dirty.read().await.iter().cloned().collect()
    }

    fn degrade(&self, op: &'static str, key: &str, err: &StoreError) {
        tracing::warn!(
            op,
            key,
            primary = self.primary.name(),
            fallback = self.fallback.name(),
            error = %err,
            "Primary store failed, using fallback"
        );
    }

    async fn is_dirty(&self, key: &str) -> bool {
        self.dirty.read().await.contains(key)
    }

    async fn mark_dirty(&self, key: &str) {
        self.dirty.write().await.insert(key.to_string());
    }

    async fn mark_clean(&self, key: &str) {
        self.dirty.write().await.remove(key);
    }

    /// Copy the fallback's view of a dirty key back to the primary.
    async fn resync(&self, key: &str, value: Option<&Value>) {
        let result = match value {
            Some(value) => self.primary.set(key, value).await,
            None => self.primary.remove(key).await,
        };
        match result {
            Ok(()) => {
                self.mark_clean(key).await;
                tracing::info!(key, primary = self.primary.name(), "Resynced key to primary store");
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Primary still unreachable, key stays dirty");
            }
        }
    }
}

fn both_failed(primary: StoreError, fallback: StoreError) -> StoreError {
    StoreError::Unavailable(format!("primary: {primary}; fallback: {fallback}"))
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.is_dirty(key).await {
            let value = self.fallback.get(key).await?;
            self.resync(key, value.as_ref()).await;
            return Ok(value);
        }

        match self.primary.get(key).await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => Ok(self.fallback.get(key).await.unwrap_or_else(|e| {
                tracing::debug!(key, error = %e, "Fallback lookup failed after primary miss");
                None
            })),
            Err(primary_err) => {
                self.degrade("get", key, &primary_err);
                self.fallback
                    .get(key)
                    .await
                    .map_err(|e| both_failed(primary_err, e))
            }
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        match self.primary.set(key, value).await {
            Ok(()) => {
                self.mark_clean(key).await;
                Ok(())
            }
            Err(primary_err) => {
                self.degrade("set", key, &primary_err);
                self.fallback
                    .set(key, value)
                    .await
                    .map_err(|e| both_failed(primary_err, e))?;
                self.mark_dirty(key).await;
                Ok(())
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let primary = self.primary.remove(key).await;
        let fallback = self.fallback.remove(key).await;
        match (primary, fallback) {
            (Err(p), Err(f)) => Err(both_failed(p, f)),
            (Err(p), Ok(())) => {
                self.degrade("remove", key, &p);
                self.mark_dirty(key).await;
                Ok(())
            }
            (Ok(()), _) => {
                self.mark_clean(key).await;
                Ok(())
            }
        }
    }
}
