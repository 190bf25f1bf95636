//! Typed access to the game's storage keys.
//!
//! Each repository is a zero-sized namespace of async functions taking the
//! store as their first argument.

mod history_repo;
mod roster_repo;
mod session_repo;
mod stamina_repo;

pub use history_repo::MissionHistoryRepo;
pub use roster_repo::RosterRepo;
pub use session_repo::SessionRepo;
pub use stamina_repo::StaminaRepo;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

async fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value)?;
    store.set(key, &value).await
}
