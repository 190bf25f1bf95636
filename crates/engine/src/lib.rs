//! Backstreet game engine.
//!
//! Async services over the pure rules in `backstreet-core`:
//!
//! - [`StaminaService`] reconciles stored stamina against the clock.
//! - [`MissionRunner`] spends stamina and drives a timed run to a single
//!   rolled outcome.
//! - [`RecruitmentService`] and [`TalentService`] handle progression spending.
//! - [`AuthProvider`] gates access; [`GameSession`] ties everything together
//!   for one signed-in player.

pub mod auth;
pub mod clock;
pub mod mission;
pub mod recruitment;
pub mod session;
pub mod stamina;
pub mod talent;

pub use auth::{AuthProvider, LocalAuth};
pub use clock::{Clock, ManualClock, SystemClock};
pub use mission::{ActiveMission, MissionRunner};
pub use recruitment::RecruitmentService;
pub use session::{GameDeps, GameSession};
pub use stamina::StaminaService;
pub use talent::TalentService;
