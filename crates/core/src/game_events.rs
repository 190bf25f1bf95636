//! Event type names published on the game event bus.
//!
//! Used by the engine when broadcasting mission and progression updates and
//! by listeners such as the console resolution announcer.

/// A mission run started and its stamina cost was spent.
pub const EVENT_MISSION_STARTED: &str = "mission.started";

/// Progress update during a run (payload carries `percent`).
pub const EVENT_MISSION_PROGRESS: &str = "mission.progress";

/// The run's outcome was rolled. Published once per run.
pub const EVENT_MISSION_RESOLVED: &str = "mission.resolved";

/// The run was aborted before resolution.
pub const EVENT_MISSION_ABORTED: &str = "mission.aborted";

/// The story was read to the end and the run discarded.
pub const EVENT_MISSION_FINISHED: &str = "mission.finished";

/// A player's stored stamina changed.
pub const EVENT_STAMINA_CHANGED: &str = "stamina.changed";

/// A gang member joined the roster.
pub const EVENT_MEMBER_RECRUITED: &str = "roster.recruited";

/// A talent was unlocked.
pub const EVENT_TALENT_UNLOCKED: &str = "talent.unlocked";
