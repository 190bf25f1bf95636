//! Mission catalog entries and the per-run state machine.
//!
//! A run moves `Running -> Resolved` exactly once and is discarded when the
//! story has been read to the end after resolution. "Idle" is simply the
//! absence of a run. Timing lives in the engine; this module only maps an
//! elapsed duration onto progress and records the single outcome roll.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::player::Reward;
use crate::types::Timestamp;

/// Lowest and highest allowed `risk_level`.
pub const RISK_LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

// ---------------------------------------------------------------------------
// Catalog entry
// ---------------------------------------------------------------------------

/// A static, data-defined mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stamina_cost: u32,
    pub courage_cost: u32,
    pub duration_seconds: u64,
    pub money_reward: u64,
    pub exp_reward: u64,
    pub unlock_level: u32,
    pub risk_level: u8,
    pub required_members: u32,
    /// Chance of success in percent, `0..=100`.
    pub success_rate: u8,
    pub story: Vec<String>,
}

impl Mission {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn reward(&self) -> Reward {
        Reward {
            money: self.money_reward,
            experience: self.exp_reward,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Validation("Mission id must not be empty".into()));
        }
        if !RISK_LEVEL_RANGE.contains(&self.risk_level) {
            return Err(CoreError::Validation(format!(
                "Mission '{}' has risk level {}, expected 1-5",
                self.id, self.risk_level
            )));
        }
        if self.success_rate > 100 {
            return Err(CoreError::Validation(format!(
                "Mission '{}' has success rate {}, expected 0-100",
                self.id, self.success_rate
            )));
        }
        if self.duration_seconds == 0 {
            return Err(CoreError::Validation(format!(
                "Mission '{}' must last at least one second",
                self.id
            )));
        }
        if self.story.is_empty() {
            return Err(CoreError::Validation(format!(
                "Mission '{}' must have at least one story beat",
                self.id
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionOutcome {
    Success,
    Failure,
}

impl MissionOutcome {
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(CoreError::Validation(format!(
                "Unknown mission outcome '{other}'"
            ))),
        }
    }
}

/// One weighted coin flip: success iff `uniform[0, 100) < success_rate`.
pub fn roll_outcome<R: Rng>(rng: &mut R, success_rate: u8) -> MissionOutcome {
    let roll: f64 = rng.random_range(0.0..100.0);
    if roll < f64::from(success_rate) {
        MissionOutcome::Success
    } else {
        MissionOutcome::Failure
    }
}

// ---------------------------------------------------------------------------
// Run state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Resolved,
}

/// Result of asking a run to move its story forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryStep {
    /// Moved to the beat at this index.
    Advanced(usize),
    /// At the last beat, but the outcome is not known yet.
    AwaitingOutcome,
    /// Story read to the end after resolution; the run is over.
    Finished(MissionReport),
}

/// What a finished run reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReport {
    pub run_id: Uuid,
    pub mission_id: String,
    pub outcome: MissionOutcome,
    /// Present only for successful runs.
    pub reward: Option<Reward>,
}

/// Ephemeral state of one mission attempt.
#[derive(Debug, Clone)]
pub struct MissionRun {
    id: Uuid,
    mission: Arc<Mission>,
    progress_percent: f64,
    story_index: usize,
    outcome: Option<MissionOutcome>,
}

impl MissionRun {
    pub fn new(mission: Arc<Mission>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission,
            progress_percent: 0.0,
            story_index: 0,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mission(&self) -> &Arc<Mission> {
        &self.mission
    }

    pub fn phase(&self) -> RunPhase {
        if self.outcome.is_some() {
            RunPhase::Resolved
        } else {
            RunPhase::Running
        }
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn story_index(&self) -> usize {
        self.story_index
    }

    pub fn current_beat(&self) -> &str {
        self.mission
            .story
            .get(self.story_index)
            .map_or("", String::as_str)
    }

    pub fn outcome(&self) -> Option<MissionOutcome> {
        self.outcome
    }

    /// Map `elapsed` onto the linear 0..100 ramp.
    ///
    /// Progress never moves backwards and stays below 100 until the run is
    /// resolved, so the bar and the outcome always agree.
    pub fn update_progress(&mut self, elapsed: Duration) -> f64 {
        if self.outcome.is_some() {
            return self.progress_percent;
        }
        let ratio = elapsed.as_secs_f64() / self.mission.duration().as_secs_f64();
        let percent = (ratio * 100.0).clamp(0.0, 100.0);
        if percent > self.progress_percent {
            self.progress_percent = percent.min(99.99);
        }
        self.progress_percent
    }

    /// Resolve the run, rolling only on the first call.
    ///
    /// Returns the outcome and whether this call performed the roll.
    pub fn resolve<R: Rng>(&mut self, rng: &mut R) -> (MissionOutcome, bool) {
        if let Some(outcome) = self.outcome {
            return (outcome, false);
        }
        let outcome = roll_outcome(rng, self.mission.success_rate);
        self.outcome = Some(outcome);
        self.progress_percent = 100.0;
        (outcome, true)
    }

    pub fn advance_story(&mut self) -> StoryStep {
        let last = self.mission.story.len().saturating_sub(1);
        if self.story_index < last {
            self.story_index += 1;
            return StoryStep::Advanced(self.story_index);
        }
        match self.report() {
            Some(report) => StoryStep::Finished(report),
            None => StoryStep::AwaitingOutcome,
        }
    }

    pub fn report(&self) -> Option<MissionReport> {
        let outcome = self.outcome?;
        Some(MissionReport {
            run_id: self.id,
            mission_id: self.mission.id.clone(),
            outcome,
            reward: (outcome == MissionOutcome::Success).then(|| self.mission.reward()),
        })
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One resolved run, as kept in the player's mission history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionHistoryEntry {
    pub run_id: Uuid,
    pub mission_id: String,
    pub outcome: MissionOutcome,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub completed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
