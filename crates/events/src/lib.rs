//! Backstreet event bus.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`GameEvent`] is the event envelope.

pub mod bus;

pub use bus::{EventBus, GameEvent};
