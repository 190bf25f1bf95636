use backstreet_core::mission::MissionHistoryEntry;
use backstreet_core::types::PlayerId;

use crate::error::StoreError;
use crate::keys::missions_key;
use crate::kv::KeyValueStore;

/// Maximum number of entries kept per player; older ones are dropped.
pub const MAX_HISTORY_ENTRIES: usize = 200;

/// Append-only mission history under `missions_{player}`.
pub struct MissionHistoryRepo;

impl MissionHistoryRepo {
    /// All entries, most recent first.
    pub async fn list(
        store: &dyn KeyValueStore,
        player_id: &PlayerId,
    ) -> Result<Vec<MissionHistoryEntry>, StoreError> {
        let mut entries: Vec<MissionHistoryEntry> = super::load(store, &missions_key(player_id))
            .await?
            .unwrap_or_default();
        entries.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(entries)
    }

    /// Record one resolved run. Appending the same run twice is a no-op.
    pub async fn append(
        store: &dyn KeyValueStore,
        player_id: &PlayerId,
        entry: MissionHistoryEntry,
    ) -> Result<(), StoreError> {
        let key = missions_key(player_id);
        let mut entries: Vec<MissionHistoryEntry> =
            super::load(store, &key).await?.unwrap_or_default();

        if entries.iter().any(|e| e.run_id == entry.run_id) {
            return Ok(());
        }
        entries.push(entry);
        if entries.len() > MAX_HISTORY_ENTRIES {
            let excess = entries.len() - MAX_HISTORY_ENTRIES;
            entries.drain(..excess);
        }
        super::save(store, &key, &entries).await
    }
}
