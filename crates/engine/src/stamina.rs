//! Persisted, passively regenerating stamina.
//!
//! [`StaminaService`] owns the round-trips between the regeneration rules
//! in [`StaminaConfig`] and the `stamina_{player}` records. Reads reconcile
//! and may write; writes always stamp the current time.

use std::sync::Arc;
use std::time::Duration;

use backstreet_core::error::CoreError;
use backstreet_core::game_events::EVENT_STAMINA_CHANGED;
use backstreet_core::stamina::{StaminaConfig, StaminaRecord};
use backstreet_core::types::PlayerId;
use backstreet_events::{EventBus, GameEvent};
use backstreet_store::repositories::StaminaRepo;
use backstreet_store::SharedStore;

use crate::clock::Clock;

pub struct StaminaService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    config: StaminaConfig,
    bus: Option<Arc<EventBus>>,
}

impl StaminaService {
    pub fn new(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        config: StaminaConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
            bus: None,
        })
    }

    /// Publish `stamina.changed` on every write.
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn max(&self) -> u32 {
        self.config.max
    }

    /// Minutes needed to regenerate one point.
    pub fn regen_interval(&self) -> u32 {
        self.config.regen_interval_minutes
    }

    pub fn config(&self) -> &StaminaConfig {
        &self.config
    }

    /// Current stamina, regenerated up to now.
    ///
    /// A player without a record starts at the maximum. The record is only
    /// rewritten when at least one point was regenerated.
    pub async fn current(&self, player_id: &PlayerId) -> Result<u32, CoreError> {
        let now = self.clock.now();
        match StaminaRepo::find(self.store.as_ref(), player_id).await? {
            None => {
                let record = self.config.initial_record(now);
                self.write(player_id, &record).await?;
                Ok(record.value)
            }
            Some(record) => match self.config.regenerate(&record, now) {
                Some(updated) => {
                    tracing::debug!(
                        player_id = %player_id,
                        from = record.value,
                        to = updated.value,
                        "Stamina regenerated"
                    );
                    self.write(player_id, &updated).await?;
                    Ok(updated.value)
                }
                None => Ok(record.value.min(self.config.max)),
            },
        }
    }

    /// Overwrite stamina with `amount` clamped into `0..=max`.
    pub async fn set_value(&self, player_id: &PlayerId, amount: i64) -> Result<u32, CoreError> {
        let record = StaminaRecord::new(self.config.clamp(amount), self.clock.now());
        self.write(player_id, &record).await?;
        Ok(record.value)
    }

    /// Spend `amount` if available.
    ///
    /// Returns `false` and leaves the record alone when the player cannot
    /// afford it.
    pub async fn consume(&self, player_id: &PlayerId, amount: u32) -> Result<bool, CoreError> {
        let current = self.current(player_id).await?;
        if amount > current {
            return Ok(false);
        }
        let record = StaminaRecord::new(current - amount, self.clock.now());
        self.write(player_id, &record).await?;
        Ok(true)
    }

    /// Time until the next point, from the stored record as-is.
    pub async fn time_until_next_unit(&self, player_id: &PlayerId) -> Result<Duration, CoreError> {
        let record = StaminaRepo::find(self.store.as_ref(), player_id).await?;
        Ok(self
            .config
            .time_until_next_unit(record.as_ref(), self.clock.now()))
    }

    async fn write(&self, player_id: &PlayerId, record: &StaminaRecord) -> Result<(), CoreError> {
        StaminaRepo::put(self.store.as_ref(), player_id, record).await?;
        if let Some(bus) = &self.bus {
            bus.publish(
                GameEvent::new(EVENT_STAMINA_CHANGED)
                    .with_player(player_id.clone())
                    .with_payload(serde_json::json!({
                        "value": record.value,
                        "max": self.config.max,
                    })),
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use backstreet_core::stamina::RegenPolicy;
    use backstreet_store::MemoryStore;
    use chrono::{TimeZone, Utc};

    use crate::clock::ManualClock;

    fn setup(policy: RegenPolicy) -> (StaminaService, Arc<ManualClock>, SharedStore) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ));
        let config = StaminaConfig {
            policy,
            ..StaminaConfig::default()
        };
        let service = StaminaService::new(store.clone(), clock.clone(), config).unwrap();
        (service, clock, store)
    }

    fn player() -> PlayerId {
        "u-1".to_string()
    }

    #[tokio::test]
    async fn first_read_initialises_to_max() {
        let (service, clock, store) = setup(RegenPolicy::ResetOnAdvance);
        assert_eq!(service.current(&player()).await.unwrap(), 100);

        let stored = StaminaRepo::find(store.as_ref(), &player()).await.unwrap();
        assert_eq!(stored, Some(StaminaRecord::new(100, clock.now())));
    }

    #[tokio::test]
    async fn set_value_clamps() {
        let (service, _, _) = setup(RegenPolicy::ResetOnAdvance);
        for (amount, expected) in [(-10, 0), (42, 42), (500, 100)] {
            service.set_value(&player(), amount).await.unwrap();
            assert_eq!(service.current(&player()).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn twelve_minutes_regenerates_two_and_resets_timestamp() {
        let (service, clock, store) = setup(RegenPolicy::ResetOnAdvance);
        service.set_value(&player(), 50).await.unwrap();

        clock.advance(chrono::Duration::minutes(12));
        assert_eq!(service.current(&player()).await.unwrap(), 52);

        let stored = StaminaRepo::find(store.as_ref(), &player())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_update, clock.now());
    }

    #[tokio::test]
    async fn bank_policy_keeps_partial_interval() {
        let (service, clock, store) = setup(RegenPolicy::BankRemainder);
        service.set_value(&player(), 50).await.unwrap();
        let t0 = clock.now();

        clock.advance(chrono::Duration::minutes(12));
        assert_eq!(service.current(&player()).await.unwrap(), 52);

        let stored = StaminaRepo::find(store.as_ref(), &player())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_update, t0 + chrono::Duration::minutes(10));
    }

    #[tokio::test]
    async fn consume_beyond_current_is_refused() {
        let (service, _, store) = setup(RegenPolicy::ResetOnAdvance);
        service.set_value(&player(), 3).await.unwrap();
        let before = StaminaRepo::find(store.as_ref(), &player()).await.unwrap();

        assert!(!service.consume(&player(), 4).await.unwrap());
        assert_eq!(
            StaminaRepo::find(store.as_ref(), &player()).await.unwrap(),
            before
        );

        assert!(service.consume(&player(), 3).await.unwrap());
        assert_eq!(service.current(&player()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn time_until_next_unit_reads_stored_record() {
        let (service, clock, _) = setup(RegenPolicy::ResetOnAdvance);
        assert_eq!(
            service.time_until_next_unit(&player()).await.unwrap(),
            Duration::ZERO
        );

        service.set_value(&player(), 10).await.unwrap();
        clock.advance(chrono::Duration::minutes(2));
        assert_eq!(
            service.time_until_next_unit(&player()).await.unwrap(),
            Duration::from_secs(3 * 60)
        );
    }

    #[tokio::test]
    async fn writes_publish_stamina_changed() {
        let (service, _, _) = setup(RegenPolicy::ResetOnAdvance);
        let bus = Arc::new(EventBus::default());
        let service = service.with_bus(bus.clone());
        let mut rx = bus.subscribe();

        service.set_value(&player(), 20).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EVENT_STAMINA_CHANGED);
        assert_eq!(event.payload["value"], 20);
    }
}
