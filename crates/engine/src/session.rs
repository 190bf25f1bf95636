//! One signed-in player's game.
//!
//! [`GameSession`] is the single logical actor for a player: it owns the
//! in-memory stats and talent tree, holds at most one active mission run and
//! routes everything else to the services.

use std::sync::Arc;
use std::time::Duration;

use backstreet_core::catalog::Catalog;
use backstreet_core::config::GameConfig;
use backstreet_core::error::CoreError;
use backstreet_core::mission::{Mission, MissionHistoryEntry, StoryStep};
use backstreet_core::player::PlayerStats;
use backstreet_core::roster::{GangMember, Roster};
use backstreet_core::session::User;
use backstreet_core::talent::{Talent, TalentTree};
use backstreet_events::EventBus;
use backstreet_store::repositories::MissionHistoryRepo;
use backstreet_store::SharedStore;

use crate::auth::AuthProvider;
use crate::clock::Clock;
use crate::mission::{ActiveMission, MissionRunner};
use crate::recruitment::RecruitmentService;
use crate::stamina::StaminaService;
use crate::talent::TalentService;

/// Shared collaborators a session is built from.
#[derive(Clone)]
pub struct GameDeps {
    pub store: SharedStore,
    pub bus: Arc<EventBus>,
    pub catalog: Arc<Catalog>,
    pub clock: Arc<dyn Clock>,
    pub config: GameConfig,
}

pub struct GameSession {
    user: User,
    stats: PlayerStats,
    store: SharedStore,
    catalog: Arc<Catalog>,
    stamina: Arc<StaminaService>,
    runner: MissionRunner,
    recruitment: RecruitmentService,
    talents: TalentService,
    active: Option<ActiveMission>,
}

impl GameSession {
    /// Open a session for the signed-in user.
    ///
    /// Fails with [`CoreError::Unauthenticated`] when nobody is signed in.
    pub async fn open(auth: &dyn AuthProvider, deps: GameDeps) -> Result<Self, CoreError> {
        let user = auth
            .current_user()
            .await?
            .ok_or_else(|| CoreError::Unauthenticated("Sign in to play".to_string()))?;

        let config = &deps.config;
        let stamina = Arc::new(
            StaminaService::new(deps.store.clone(), deps.clock.clone(), config.stamina)?
                .with_bus(deps.bus.clone()),
        );
        let runner = MissionRunner::new(
            deps.store.clone(),
            stamina.clone(),
            deps.bus.clone(),
            config.mission_tick,
            config.rng_seed,
        )?;
        let recruitment =
            RecruitmentService::new(deps.store.clone(), deps.catalog.clone(), deps.bus.clone());
        let talents = TalentService::new(&deps.catalog, deps.bus.clone());

        tracing::info!(user_id = %user.id, "Game session opened");
        Ok(Self {
            user,
            stats: PlayerStats::new(config.starting_money, config.starting_talent_points),
            store: deps.store,
            catalog: deps.catalog,
            stamina,
            runner,
            recruitment,
            talents,
            active: None,
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Direct access to the player's stats, e.g. to credit a mission reward.
    pub fn stats_mut(&mut self) -> &mut PlayerStats {
        &mut self.stats
    }

    // -- stamina ------------------------------------------------------------

    pub async fn stamina(&self) -> Result<u32, CoreError> {
        self.stamina.current(&self.user.id).await
    }

    pub fn max_stamina(&self) -> u32 {
        self.stamina.max()
    }

    pub async fn time_until_next_stamina(&self) -> Result<Duration, CoreError> {
        self.stamina.time_until_next_unit(&self.user.id).await
    }

    // -- missions -----------------------------------------------------------

    pub fn available_missions(&self) -> Vec<Arc<Mission>> {
        self.catalog.available_missions(self.stats.level)
    }

    /// Start `mission_id` if the player can afford it and is not already on
    /// a run.
    pub async fn start_mission(&mut self, mission_id: &str) -> Result<&ActiveMission, CoreError> {
        let mission = self
            .catalog
            .mission(mission_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "mission",
                id: mission_id.to_string(),
            })?;
        if mission.unlock_level > self.stats.level {
            return Err(CoreError::Validation(format!(
                "'{}' unlocks at level {}",
                mission.name, mission.unlock_level
            )));
        }

        let available = self.stamina().await?;
        if mission.stamina_cost > available {
            return Err(CoreError::InsufficientResource {
                required: mission.stamina_cost,
                available,
            });
        }
        if let Some(active) = &self.active {
            return Err(CoreError::MissionInProgress(active.mission().name.clone()));
        }

        let run = self.runner.start(&self.user.id, mission).await?;
        let active: &ActiveMission = self.active.insert(run);
        Ok(active)
    }

    pub fn active_mission(&self) -> Option<&ActiveMission> {
        self.active.as_ref()
    }

    /// Move the active run's story forward, discarding the run once it is
    /// finished.
    pub async fn advance_story(&mut self) -> Result<StoryStep, CoreError> {
        let active = self.active.as_ref().ok_or(CoreError::NoActiveMission)?;
        let step = active.advance_story().await;
        if matches!(step, StoryStep::Finished(_)) {
            self.active = None;
        }
        Ok(step)
    }

    pub async fn abort_mission(&mut self) -> Result<(), CoreError> {
        let active = self.active.as_ref().ok_or(CoreError::NoActiveMission)?;
        active.abort().await?;
        self.active = None;
        Ok(())
    }

    pub async fn mission_history(&self) -> Result<Vec<MissionHistoryEntry>, CoreError> {
        Ok(MissionHistoryRepo::list(self.store.as_ref(), &self.user.id).await?)
    }

    // -- crew ---------------------------------------------------------------

    pub async fn roster(&self) -> Result<Roster, CoreError> {
        self.recruitment.roster(&self.user.id).await
    }

    pub async fn recruit_offers(&self) -> Result<Vec<GangMember>, CoreError> {
        self.recruitment.offers(&self.user.id).await
    }

    pub async fn recruit(&mut self, member_id: &str) -> Result<GangMember, CoreError> {
        self.recruitment
            .recruit(&self.user.id, member_id, &mut self.stats)
            .await
    }

    // -- talents ------------------------------------------------------------

    pub fn talents(&self) -> &TalentTree {
        self.talents.tree()
    }

    pub fn unlock_talent(&mut self, talent_id: &str) -> Result<Talent, CoreError> {
        self.talents
            .unlock(&self.user.id, talent_id, &mut self.stats)
    }
}
