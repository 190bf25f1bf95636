//! Backstreet game rules.
//!
//! Pure domain logic with no storage or runtime dependencies: the stamina
//! regeneration model, mission catalog and run state machine, roster,
//! talent tree and player stats. The `store`, `events` and `engine` crates
//! build the async services on top of these types.

pub mod catalog;
pub mod config;
pub mod error;
pub mod game_events;
pub mod mission;
pub mod player;
pub mod roster;
pub mod session;
pub mod stamina;
pub mod talent;
pub mod types;
