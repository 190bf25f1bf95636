use backstreet_core::roster::Roster;
use backstreet_core::types::PlayerId;

use crate::error::StoreError;
use crate::keys::members_key;
use crate::kv::KeyValueStore;

/// Reads and writes the `members_{player}` roster list.
pub struct RosterRepo;

impl RosterRepo {
    /// Load the roster; a player who never recruited has an empty one.
    pub async fn load(store: &dyn KeyValueStore, player_id: &PlayerId) -> Result<Roster, StoreError> {
        Ok(super::load(store, &members_key(player_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn save(
        store: &dyn KeyValueStore,
        player_id: &PlayerId,
        roster: &Roster,
    ) -> Result<(), StoreError> {
        super::save(store, &members_key(player_id), roster).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use backstreet_core::roster::{GangMember, MemberStatus};

    #[tokio::test]
    async fn unknown_player_has_empty_roster() {
        let store = MemoryStore::new();
        let roster = RosterRepo::load(&store, &"u-1".to_string()).await.unwrap();
        assert!(roster.is_empty());
    }

    #[tokio::test]
    async fn saved_roster_loads_back() {
        let store = MemoryStore::new();
        let player: PlayerId = "u-1".into();
        let roster = Roster::from_members(vec![GangMember {
            id: "ji-woo".into(),
            name: "Ji-woo".into(),
            loyalty: 60,
            skill: 80,
            speciality: "Lookout".into(),
            status: MemberStatus::Available,
            cost: 1500,
            background: String::new(),
        }]);

        RosterRepo::save(&store, &player, &roster).await.unwrap();
        assert_eq!(RosterRepo::load(&store, &player).await.unwrap(), roster);
    }
}
