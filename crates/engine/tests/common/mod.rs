//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backstreet_core::catalog::Catalog;
use backstreet_core::config::GameConfig;
use backstreet_core::session::User;
use backstreet_engine::{GameDeps, GameSession, LocalAuth, ManualClock, StaminaService};
use backstreet_events::EventBus;
use backstreet_store::{KeyValueStore, MemoryStore, SharedStore, StoreError};
use chrono::{TimeZone, Utc};

pub const PLAYER: &str = "player-1";

/// A backend that fails every call, standing in for an unreachable remote.
pub struct Unreachable;

#[async_trait]
impl KeyValueStore for Unreachable {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &serde_json::Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub struct Harness {
    pub store: SharedStore,
    pub bus: Arc<EventBus>,
    pub clock: Arc<ManualClock>,
    pub auth: LocalAuth,
    pub deps: GameDeps,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Signed-in harness whose game data lives in `store`.
    pub async fn with_store(store: SharedStore) -> Self {
        let bus = Arc::new(EventBus::default());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap(),
        ));
        let config = GameConfig {
            mission_tick: Duration::from_secs(1),
            rng_seed: Some(2024),
            ..GameConfig::default()
        };
        let deps = GameDeps {
            store: store.clone(),
            bus: bus.clone(),
            catalog: Arc::new(Catalog::builtin().expect("builtin catalog")),
            clock: clock.clone(),
            config,
        };

        let auth = LocalAuth::new(Arc::new(MemoryStore::new()));
        auth.sign_in(User::new(PLAYER).with_display_name("Jae-sung"))
            .await
            .expect("sign in");

        Self {
            store,
            bus,
            clock,
            auth,
            deps,
        }
    }

    pub async fn session(&self) -> GameSession {
        GameSession::open(&self.auth, self.deps.clone())
            .await
            .expect("session should open")
    }

    /// Overwrite the player's stored stamina.
    pub async fn set_stamina(&self, value: i64) {
        StaminaService::new(
            self.store.clone(),
            self.clock.clone(),
            self.deps.config.stamina,
        )
        .expect("valid stamina config")
        .set_value(&PLAYER.to_string(), value)
        .await
        .expect("stamina write");
    }
}
