//! Crew recruitment against the persisted roster.

use std::sync::Arc;

use backstreet_core::catalog::Catalog;
use backstreet_core::error::CoreError;
use backstreet_core::game_events::EVENT_MEMBER_RECRUITED;
use backstreet_core::player::PlayerStats;
use backstreet_core::roster::{GangMember, Roster};
use backstreet_core::types::PlayerId;
use backstreet_events::{EventBus, GameEvent};
use backstreet_store::repositories::RosterRepo;
use backstreet_store::SharedStore;

pub struct RecruitmentService {
    store: SharedStore,
    catalog: Arc<Catalog>,
    bus: Arc<EventBus>,
}

impl RecruitmentService {
    pub fn new(store: SharedStore, catalog: Arc<Catalog>, bus: Arc<EventBus>) -> Self {
        Self {
            store,
            catalog,
            bus,
        }
    }

    pub async fn roster(&self, player_id: &PlayerId) -> Result<Roster, CoreError> {
        Ok(RosterRepo::load(self.store.as_ref(), player_id).await?)
    }

    /// Catalog recruits the player does not own yet.
    pub async fn offers(&self, player_id: &PlayerId) -> Result<Vec<GangMember>, CoreError> {
        let roster = self.roster(player_id).await?;
        Ok(roster
            .offers(self.catalog.recruits())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Pay for `member_id` and add them to the stored roster.
    ///
    /// The new roster is saved before the money is taken from `stats`, so a
    /// failed save leaves both untouched.
    pub async fn recruit(
        &self,
        player_id: &PlayerId,
        member_id: &str,
        stats: &mut PlayerStats,
    ) -> Result<GangMember, CoreError> {
        let member = self
            .catalog
            .recruit(member_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "recruit",
                id: member_id.to_string(),
            })?;

        let mut roster = self.roster(player_id).await?;
        let mut money = stats.money;
        roster.recruit(member, &mut money)?;
        RosterRepo::save(self.store.as_ref(), player_id, &roster).await?;
        stats.money = money;

        tracing::info!(
            player_id = %player_id,
            member_id = %member.id,
            cost = member.cost,
            money_left = money,
            "Member recruited"
        );
        self.bus.publish(
            GameEvent::new(EVENT_MEMBER_RECRUITED)
                .with_player(player_id.clone())
                .with_payload(serde_json::json!({
                    "member_id": member.id,
                    "cost": member.cost,
                })),
        );
        Ok(member.clone())
    }
}
