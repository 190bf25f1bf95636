//! Stamina regeneration arithmetic.
//!
//! Stamina accrues passively: nothing ticks in the background. Every read
//! reconciles the stored `(value, last_update)` pair against the wall clock
//! and, when at least one regeneration unit has elapsed, produces a new
//! record to persist. All functions here are pure; the engine crate owns the
//! storage round-trips.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound of the stamina pool.
pub const DEFAULT_STAMINA_MAX: u32 = 100;

/// Wall-clock minutes needed to regenerate one stamina point.
pub const DEFAULT_REGEN_INTERVAL_MINUTES: u32 = 5;

const MILLIS_PER_MINUTE: i64 = 60 * 1000;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Persisted stamina state for one player.
///
/// Serialized as `{"stamina": n, "lastUpdate": epochMillis}`, the same shape
/// the client stores on device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaRecord {
    #[serde(rename = "stamina")]
    pub value: u32,
    #[serde(rename = "lastUpdate", with = "chrono::serde::ts_milliseconds")]
    pub last_update: Timestamp,
}

impl StaminaRecord {
    pub fn new(value: u32, last_update: Timestamp) -> Self {
        Self { value, last_update }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What happens to partial progress toward the next point when a read
/// advances the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegenPolicy {
    /// The timestamp moves to "now"; any partial interval is discarded.
    #[default]
    ResetOnAdvance,
    /// The timestamp moves forward by whole intervals only, so the
    /// remainder carries over to the next read.
    BankRemainder,
}

impl RegenPolicy {
    /// Parse from a configuration value (`reset` or `bank`).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::ResetOnAdvance),
            "bank" => Ok(Self::BankRemainder),
            other => Err(CoreError::Validation(format!(
                "Unknown stamina regen policy '{other}'. Must be one of: reset, bank"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ResetOnAdvance => "reset",
            Self::BankRemainder => "bank",
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Tunables for the stamina pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaminaConfig {
    pub max: u32,
    pub regen_interval_minutes: u32,
    pub policy: RegenPolicy,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_STAMINA_MAX,
            regen_interval_minutes: DEFAULT_REGEN_INTERVAL_MINUTES,
            policy: RegenPolicy::default(),
        }
    }
}

impl StaminaConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max == 0 {
            return Err(CoreError::Validation(
                "Stamina max must be greater than zero".to_string(),
            ));
        }
        if self.regen_interval_minutes == 0 {
            return Err(CoreError::Validation(
                "Stamina regen interval must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp an arbitrary amount into `0..=max`.
    pub fn clamp(&self, amount: i64) -> u32 {
        amount.clamp(0, i64::from(self.max)) as u32
    }

    /// A fresh record for a player seen for the first time.
    pub fn initial_record(&self, now: Timestamp) -> StaminaRecord {
        StaminaRecord::new(self.max, now)
    }

    /// Regenerated view of `record` at `now`.
    ///
    /// Returns `Some(new_record)` only when the value advanced and must be
    /// persisted; `None` means the stored record is still current.
    pub fn regenerate(&self, record: &StaminaRecord, now: Timestamp) -> Option<StaminaRecord> {
        let stored = record.value.min(self.max);
        let interval = i64::from(self.regen_interval_minutes);
        let units = elapsed_whole_minutes(record.last_update, now) / interval;
        let new_value = (i64::from(stored) + units).min(i64::from(self.max)) as u32;

        if new_value <= stored {
            return None;
        }

        let last_update = match self.policy {
            RegenPolicy::ResetOnAdvance => now,
            RegenPolicy::BankRemainder if new_value == self.max => now,
            RegenPolicy::BankRemainder => {
                record.last_update + chrono::Duration::minutes(units * interval)
            }
        };

        Some(StaminaRecord::new(new_value, last_update))
    }

    /// Current value of `record` at `now`, regenerated and clamped.
    pub fn current_value(&self, record: &StaminaRecord, now: Timestamp) -> u32 {
        self.regenerate(record, now)
            .map_or(record.value.min(self.max), |r| r.value)
    }

    /// Time left until the next point, measured from the stored record
    /// without regenerating it first.
    ///
    /// Zero when there is no record yet or the pool is already full.
    pub fn time_until_next_unit(&self, record: Option<&StaminaRecord>, now: Timestamp) -> Duration {
        let Some(record) = record else {
            return Duration::ZERO;
        };
        if record.value >= self.max {
            return Duration::ZERO;
        }

        let interval_ms = i64::from(self.regen_interval_minutes) * MILLIS_PER_MINUTE;
        let elapsed_ms = (now - record.last_update).num_milliseconds().max(0);
        let remaining_ms = interval_ms - elapsed_ms % interval_ms;
        Duration::from_millis(remaining_ms as u64)
    }
}

/// Whole minutes between `from` and `to`; a clock that moved backwards
/// counts as zero.
fn elapsed_whole_minutes(from: Timestamp, to: Timestamp) -> i64 {
    ((to - from).num_milliseconds() / MILLIS_PER_MINUTE).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn minutes(n: i64) -> chrono::Duration {
        chrono::Duration::minutes(n)
    }

    #[test]
    fn twelve_minutes_yields_two_points_and_resets_timestamp() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(50, t0());
        let now = t0() + minutes(12);

        let updated = rules.regenerate(&record, now).expect("should advance");
        assert_eq!(updated.value, 52);
        assert_eq!(updated.last_update, now);
    }

    #[test]
    fn under_one_interval_does_not_advance() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(50, t0());
        assert!(rules.regenerate(&record, t0() + minutes(4)).is_none());
        assert_eq!(rules.current_value(&record, t0() + minutes(4)), 50);
    }

    #[test]
    fn regeneration_caps_at_max() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(98, t0());
        let updated = rules.regenerate(&record, t0() + minutes(600)).unwrap();
        assert_eq!(updated.value, DEFAULT_STAMINA_MAX);
    }

    #[test]
    fn full_pool_never_advances() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(100, t0());
        assert!(rules.regenerate(&record, t0() + minutes(600)).is_none());
    }

    #[test]
    fn clock_moving_backwards_counts_as_zero() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(10, t0());
        assert!(rules.regenerate(&record, t0() - minutes(30)).is_none());
    }

    #[test]
    fn bank_policy_keeps_partial_progress() {
        let rules = StaminaConfig {
            policy: RegenPolicy::BankRemainder,
            ..StaminaConfig::default()
        };
        let record = StaminaRecord::new(50, t0());
        let updated = rules.regenerate(&record, t0() + minutes(12)).unwrap();
        assert_eq!(updated.value, 52);
        assert_eq!(updated.last_update, t0() + minutes(10));

        // The banked two minutes complete the next point three minutes later.
        let again = rules.regenerate(&updated, t0() + minutes(15)).unwrap();
        assert_eq!(again.value, 53);
    }

    #[test]
    fn clamp_bounds_amounts() {
        let rules = StaminaConfig::default();
        assert_eq!(rules.clamp(-5), 0);
        assert_eq!(rules.clamp(42), 42);
        assert_eq!(rules.clamp(1_000), 100);
    }

    #[test]
    fn time_until_next_unit_uses_stored_record() {
        let rules = StaminaConfig::default();
        let record = StaminaRecord::new(50, t0());
        let left = rules.time_until_next_unit(Some(&record), t0() + minutes(12));
        assert_eq!(left, Duration::from_secs(3 * 60));
    }

    #[test]
    fn time_until_next_unit_is_zero_when_full_or_missing() {
        let rules = StaminaConfig::default();
        let full = StaminaRecord::new(100, t0());
        assert_eq!(rules.time_until_next_unit(Some(&full), t0()), Duration::ZERO);
        assert_eq!(rules.time_until_next_unit(None, t0()), Duration::ZERO);
    }

    #[test]
    fn record_serializes_with_client_field_names() {
        let record = StaminaRecord::new(7, t0());
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["stamina"], 7);
        assert_eq!(json["lastUpdate"], t0().timestamp_millis());

        let back: StaminaRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn policy_from_name() {
        assert_eq!(RegenPolicy::from_name("reset").unwrap(), RegenPolicy::ResetOnAdvance);
        assert_eq!(RegenPolicy::from_name("BANK").unwrap(), RegenPolicy::BankRemainder);
        assert!(RegenPolicy::from_name("drip").is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let rules = StaminaConfig {
            regen_interval_minutes: 0,
            ..StaminaConfig::default()
        };
        assert!(rules.validate().is_err());
    }
}
