//! Timed mission runs.
//!
//! [`MissionRunner::start`] spends the stamina cost and spawns a driver task
//! per run. The driver publishes progress at a fixed cadence and resolves
//! the run once its duration has elapsed. Both the progress ramp and the
//! resolution deadline are measured from the same start instant.
//!
//! Resolution and abort both take the run's write lock. The driver checks
//! the cancellation token while holding it, so whichever gets the lock first
//! wins: an aborted run never resolves and a resolved run cannot be aborted.
//!
//! The resolved run is appended to the player's mission history before the
//! outcome becomes visible to [`ActiveMission::wait_resolved`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use backstreet_core::error::CoreError;
use backstreet_core::game_events::{
    EVENT_MISSION_ABORTED, EVENT_MISSION_FINISHED, EVENT_MISSION_PROGRESS,
    EVENT_MISSION_RESOLVED, EVENT_MISSION_STARTED,
};
use backstreet_core::mission::{Mission, MissionOutcome, MissionRun, RunPhase, StoryStep};
use backstreet_core::mission::MissionHistoryEntry;
use backstreet_core::types::PlayerId;
use backstreet_events::{EventBus, GameEvent};
use backstreet_store::repositories::MissionHistoryRepo;
use backstreet_store::SharedStore;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{watch, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::stamina::StaminaService;

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct MissionRunner {
    store: SharedStore,
    stamina: Arc<StaminaService>,
    bus: Arc<EventBus>,
    tick: Duration,
    rng: Arc<Mutex<StdRng>>,
}

impl std::fmt::Debug for MissionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionRunner")
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl MissionRunner {
    /// `seed` fixes the outcome rolls; `None` seeds from OS entropy.
    ///
    /// Fails with [`CoreError::Validation`] for a zero progress tick.
    pub fn new(
        store: SharedStore,
        stamina: Arc<StaminaService>,
        bus: Arc<EventBus>,
        tick: Duration,
        seed: Option<u64>,
    ) -> Result<Self, CoreError> {
        if tick.is_zero() {
            return Err(CoreError::Validation(
                "mission progress tick must be positive".into(),
            ));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            store,
            stamina,
            bus,
            tick,
            rng: Arc::new(Mutex::new(rng)),
        })
    }

    /// Spend the mission's stamina cost and start the run.
    ///
    /// Fails with [`CoreError::InsufficientResource`] without touching the
    /// stored stamina when the player cannot afford it.
    pub async fn start(
        &self,
        player_id: &PlayerId,
        mission: Arc<Mission>,
    ) -> Result<ActiveMission, CoreError> {
        let cost = mission.stamina_cost;
        let available = self.stamina.current(player_id).await?;
        if cost > available || !self.stamina.consume(player_id, cost).await? {
            return Err(CoreError::InsufficientResource {
                required: cost,
                available,
            });
        }

        let run = MissionRun::new(mission.clone());
        let run_id = run.id();
        let (outcome_tx, _) = watch::channel(None);
        let shared = Arc::new(RunShared {
            player_id: player_id.clone(),
            run: RwLock::new(run),
            cancel: CancellationToken::new(),
            outcome_tx,
            store: self.store.clone(),
            bus: self.bus.clone(),
            rng: self.rng.clone(),
        });

        tracing::info!(
            player_id = %player_id,
            mission_id = %mission.id,
            %run_id,
            stamina_cost = cost,
            "Mission started"
        );
        shared.publish(EVENT_MISSION_STARTED, serde_json::json!({
            "run_id": run_id.to_string(),
            "mission_id": mission.id,
            "stamina_cost": cost,
        }));

        tokio::spawn(drive(shared.clone(), Instant::now(), self.tick));

        Ok(ActiveMission {
            run_id,
            mission,
            shared,
        })
    }
}

// ---------------------------------------------------------------------------
// Shared run state
// ---------------------------------------------------------------------------

struct RunShared {
    player_id: PlayerId,
    run: RwLock<MissionRun>,
    cancel: CancellationToken,
    outcome_tx: watch::Sender<Option<MissionOutcome>>,
    store: SharedStore,
    bus: Arc<EventBus>,
    rng: Arc<Mutex<StdRng>>,
}

impl RunShared {
    fn publish(&self, event_type: &str, payload: serde_json::Value) {
        self.bus.publish(
            GameEvent::new(event_type)
                .with_player(self.player_id.clone())
                .with_payload(payload),
        );
    }

    /// Roll the outcome unless the run was aborted first.
    async fn resolve(&self) {
        let mut run = self.run.write().await;
        if self.cancel.is_cancelled() {
            return;
        }
        let (outcome, rolled) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            run.resolve(&mut *rng)
        };
        if !rolled {
            return;
        }

        tracing::info!(
            player_id = %self.player_id,
            mission_id = %run.mission().id,
            run_id = %run.id(),
            outcome = outcome.name(),
            "Mission resolved"
        );
        let entry = MissionHistoryEntry {
            run_id: run.id(),
            mission_id: run.mission().id.clone(),
            outcome,
            completed_at: Utc::now(),
        };
        let recorded = MissionHistoryRepo::append(self.store.as_ref(), &self.player_id, entry).await;
        if let Err(e) = recorded {
            tracing::error!(
                error = %e,
                player_id = %self.player_id,
                run_id = %run.id(),
                "Failed to record mission history"
            );
        }
        self.publish(EVENT_MISSION_RESOLVED, serde_json::json!({
            "run_id": run.id().to_string(),
            "mission_id": run.mission().id,
            "outcome": outcome.name(),
        }));
        self.outcome_tx.send_replace(Some(outcome));
    }
}

/// Driver loop for one run: progress on every tick, resolve at the deadline.
async fn drive(shared: Arc<RunShared>, started: Instant, tick: Duration) {
    let duration = shared.run.read().await.mission().duration();
    let deadline = started + duration;

    let mut ticker = tokio::time::interval_at(started + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let until_deadline = tokio::time::sleep_until(deadline);
    tokio::pin!(until_deadline);

    loop {
        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                tracing::debug!(player_id = %shared.player_id, "Mission driver cancelled");
                return;
            }
            _ = &mut until_deadline => {
                shared.resolve().await;
                return;
            }
            _ = ticker.tick() => {
                let percent = {
                    let mut run = shared.run.write().await;
                    if shared.cancel.is_cancelled() || run.phase() == RunPhase::Resolved {
                        continue;
                    }
                    run.update_progress(started.elapsed())
                };
                shared.publish(EVENT_MISSION_PROGRESS, serde_json::json!({ "percent": percent }));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a started run. Dropping it cancels a run that has not resolved.
pub struct ActiveMission {
    run_id: Uuid,
    mission: Arc<Mission>,
    shared: Arc<RunShared>,
}

impl ActiveMission {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn mission(&self) -> &Arc<Mission> {
        &self.mission
    }

    /// Copy of the run's current state.
    pub async fn snapshot(&self) -> MissionRun {
        self.shared.run.read().await.clone()
    }

    pub async fn progress_percent(&self) -> f64 {
        self.shared.run.read().await.progress_percent()
    }

    pub fn outcome(&self) -> Option<MissionOutcome> {
        *self.shared.outcome_tx.borrow()
    }

    pub fn is_aborted(&self) -> bool {
        self.shared.cancel.is_cancelled() && self.outcome().is_none()
    }

    /// Wait for the outcome roll.
    ///
    /// Returns [`CoreError::NoActiveMission`] if the run is aborted first.
    pub async fn wait_resolved(&self) -> Result<MissionOutcome, CoreError> {
        let mut rx = self.shared.outcome_tx.subscribe();
        tokio::select! {
            biased;
            resolved = rx.wait_for(Option::is_some) => match resolved {
                Ok(outcome) => (*outcome).ok_or(CoreError::NoActiveMission),
                Err(_) => Err(CoreError::NoActiveMission),
            },
            _ = self.shared.cancel.cancelled() => {
                self.outcome().ok_or(CoreError::NoActiveMission)
            }
        }
    }

    pub async fn advance_story(&self) -> StoryStep {
        let step = self.shared.run.write().await.advance_story();
        if let StoryStep::Finished(report) = &step {
            self.shared.publish(EVENT_MISSION_FINISHED, serde_json::json!({
                "run_id": report.run_id.to_string(),
                "mission_id": report.mission_id,
                "outcome": report.outcome.name(),
            }));
        }
        step
    }

    /// Abandon the run before it resolves. The stamina cost is not refunded.
    pub async fn abort(&self) -> Result<(), CoreError> {
        let run = self.shared.run.write().await;
        if run.phase() == RunPhase::Resolved {
            return Err(CoreError::Validation(format!(
                "Mission '{}' has already resolved",
                self.mission.id
            )));
        }
        self.shared.cancel.cancel();
        drop(run);

        tracing::info!(
            player_id = %self.shared.player_id,
            mission_id = %self.mission.id,
            run_id = %self.run_id,
            "Mission aborted"
        );
        self.shared.publish(EVENT_MISSION_ABORTED, serde_json::json!({
            "run_id": self.run_id.to_string(),
            "mission_id": self.mission.id,
        }));
        Ok(())
    }
}

impl std::fmt::Debug for ActiveMission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveMission")
            .field("run_id", &self.run_id)
            .field("mission_id", &self.mission.id)
            .field("outcome", &self.outcome())
            .finish()
    }
}

impl Drop for ActiveMission {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
