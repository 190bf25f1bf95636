use backstreet_core::stamina::StaminaRecord;
use backstreet_core::types::PlayerId;

use crate::error::StoreError;
use crate::keys::stamina_key;
use crate::kv::KeyValueStore;

/// Reads and writes `stamina_{player}` records.
pub struct StaminaRepo;

impl StaminaRepo {
    pub async fn find(
        store: &dyn KeyValueStore,
        player_id: &PlayerId,
    ) -> Result<Option<StaminaRecord>, StoreError> {
        super::load(store, &stamina_key(player_id)).await
    }

    pub async fn put(
        store: &dyn KeyValueStore,
        player_id: &PlayerId,
        record: &StaminaRecord,
    ) -> Result<(), StoreError> {
        super::save(store, &stamina_key(player_id), record).await
    }
}
