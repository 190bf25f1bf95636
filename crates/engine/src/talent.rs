//! Talent unlocking for one session.
//!
//! The tree lives in memory for the session; it starts from the catalog's
//! all-locked template.

use std::sync::Arc;

use backstreet_core::catalog::Catalog;
use backstreet_core::error::CoreError;
use backstreet_core::game_events::EVENT_TALENT_UNLOCKED;
use backstreet_core::player::PlayerStats;
use backstreet_core::talent::{Talent, TalentTree};
use backstreet_core::types::PlayerId;
use backstreet_events::{EventBus, GameEvent};

pub struct TalentService {
    tree: TalentTree,
    bus: Arc<EventBus>,
}

impl TalentService {
    pub fn new(catalog: &Catalog, bus: Arc<EventBus>) -> Self {
        Self {
            tree: catalog.talent_tree(),
            bus,
        }
    }

    pub fn tree(&self) -> &TalentTree {
        &self.tree
    }

    pub fn is_available(&self, talent_id: &str) -> bool {
        self.tree.is_available(talent_id)
    }

    /// Spend talent points from `stats` to unlock `talent_id`.
    pub fn unlock(
        &mut self,
        player_id: &PlayerId,
        talent_id: &str,
        stats: &mut PlayerStats,
    ) -> Result<Talent, CoreError> {
        let talent = self
            .tree
            .unlock(talent_id, &mut stats.talent_points)?
            .clone();

        tracing::info!(
            player_id = %player_id,
            talent_id = %talent.id,
            points_left = stats.talent_points,
            "Talent unlocked"
        );
        self.bus.publish(
            GameEvent::new(EVENT_TALENT_UNLOCKED)
                .with_player(player_id.clone())
                .with_payload(serde_json::json!({
                    "talent_id": talent.id,
                    "cost": talent.cost,
                })),
        );
        Ok(talent)
    }
}
