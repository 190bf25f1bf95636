//! Executes parsed commands against the player's game session.

use std::fmt::Write as _;
use std::time::Duration;

use backstreet_core::error::CoreError;
use backstreet_core::mission::StoryStep;
use backstreet_core::session::User;
use backstreet_engine::{AuthProvider, GameDeps, GameSession, LocalAuth};

use crate::commands::{Command, HELP};

/// What the input loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Console {
    auth: LocalAuth,
    deps: GameDeps,
    session: Option<GameSession>,
}

impl Console {
    /// Resume the cached session if a user is still signed in.
    pub async fn new(auth: LocalAuth, deps: GameDeps) -> Result<Self, CoreError> {
        let session = match auth.current_user().await? {
            Some(_) => Some(GameSession::open(&auth, deps.clone()).await?),
            None => None,
        };
        Ok(Self {
            auth,
            deps,
            session,
        })
    }

    pub fn greeting(&self) -> String {
        match &self.session {
            Some(session) => format!("Welcome back, {}.", session.user().label()),
            None => "Nobody is signed in. Use 'login <id>' to start.".to_string(),
        }
    }

    /// Player id of the open session, if any.
    pub fn player_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user().id.as_str())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, CoreError> {
        let out = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => HELP.to_string(),
            Command::Login { id, display_name } => self.login(id, display_name).await?,
            Command::Logout => {
                self.session = None;
                self.auth.sign_out().await?;
                "Signed out.".to_string()
            }
            other => self.play(other).await?,
        };
        Ok(Flow::Continue(out))
    }

    async fn login(&mut self, id: String, display_name: Option<String>) -> Result<String, CoreError> {
        let mut user = User::new(id);
        user.display_name = display_name;
        self.session = None;
        self.auth.sign_in(user).await?;
        let session = GameSession::open(&self.auth, self.deps.clone()).await?;
        let greeting = format!("Signed in as {}.", session.user().label());
        self.session = Some(session);
        Ok(greeting)
    }

    async fn play(&mut self, command: Command) -> Result<String, CoreError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| CoreError::Unauthenticated("Sign in first with 'login <id>'".into()))?;
        let mut out = String::new();

        match command {
            Command::Status => {
                let stats = session.stats();
                let _ = writeln!(
                    out,
                    "level {} | exp {} | money {} | talent points {}",
                    stats.level, stats.experience, stats.money, stats.talent_points
                );
                let stamina = session.stamina().await?;
                let _ = write!(out, "stamina {stamina}/{}", session.max_stamina());
                let next = session.time_until_next_stamina().await?;
                if next > Duration::ZERO {
                    let _ = write!(out, " (next point in {})", format_wait(next));
                }
                if let Some(active) = session.active_mission() {
                    let run = active.snapshot().await;
                    let _ = write!(
                        out,
                        "\nmission '{}': {:.0}% | {}",
                        active.mission().name,
                        run.progress_percent(),
                        run.current_beat()
                    );
                }
            }
            Command::Missions => {
                for m in session.available_missions() {
                    let _ = writeln!(
                        out,
                        "{:<22} {:<28} stamina {:>3} | {:>3}s | {:>3}% | ${}",
                        m.id, m.name, m.stamina_cost, m.duration_seconds, m.success_rate, m.money_reward
                    );
                }
            }
            Command::Start(mission_id) => {
                let active = session.start_mission(&mission_id).await?;
                let run = active.snapshot().await;
                let _ = write!(
                    out,
                    "{} started. {}",
                    active.mission().name,
                    run.current_beat()
                );
            }
            Command::Continue => match session.advance_story().await? {
                StoryStep::Advanced(_) => {
                    if let Some(active) = session.active_mission() {
                        out.push_str(active.snapshot().await.current_beat());
                    }
                }
                StoryStep::AwaitingOutcome => {
                    out.push_str("The story pauses. Wait for the mission to play out.");
                }
                StoryStep::Finished(report) => {
                    let _ = write!(out, "Mission {}.", report.outcome.name());
                    // the engine only reports rewards; crediting them is ours to do
                    if let Some(reward) = report.reward {
                        session.stats_mut().apply_reward(&reward);
                        let _ = write!(out, " +${} +{} exp", reward.money, reward.experience);
                    }
                }
            },
            Command::Wait => {
                let active = session.active_mission().ok_or(CoreError::NoActiveMission)?;
                let outcome = active.wait_resolved().await?;
                let _ = write!(out, "Resolved: {}. Use 'continue' to read on.", outcome.name());
            }
            Command::Abort => {
                session.abort_mission().await?;
                out.push_str("Mission aborted. The stamina is gone.");
            }
            Command::History => {
                for entry in session.mission_history().await? {
                    let _ = writeln!(
                        out,
                        "{} {:<22} {}",
                        entry.completed_at.format("%Y-%m-%d %H:%M"),
                        entry.mission_id,
                        entry.outcome.name()
                    );
                }
            }
            Command::Recruits => {
                for m in session.recruit_offers().await? {
                    let _ = writeln!(
                        out,
                        "{:<10} {:<10} {:<14} loyalty {:>3} | skill {:>3} | ${}",
                        m.id, m.name, m.speciality, m.loyalty, m.skill, m.cost
                    );
                }
            }
            Command::Recruit(member_id) => {
                let member = session.recruit(&member_id).await?;
                let _ = write!(out, "{} joined the crew.", member.name);
            }
            Command::Crew => {
                for m in session.roster().await?.members() {
                    let _ = writeln!(out, "{:<10} {:<14} {:?}", m.name, m.speciality, m.status);
                }
            }
            Command::Talents => {
                let tree = session.talents();
                for t in tree.talents() {
                    let mark = if t.unlocked {
                        "x"
                    } else if tree.is_available(&t.id) {
                        " "
                    } else {
                        "-"
                    };
                    let _ = writeln!(
                        out,
                        "[{mark}] {:<16} {:<11} cost {}",
                        t.id,
                        t.category.label(),
                        t.cost
                    );
                }
            }
            Command::Unlock(talent_id) => {
                let talent = session.unlock_talent(&talent_id)?;
                let _ = write!(out, "{} unlocked.", talent.name);
            }
            Command::Help | Command::Login { .. } | Command::Logout | Command::Quit => {}
        }

        Ok(out.trim_end().to_string())
    }
}

fn format_wait(wait: Duration) -> String {
    let secs = wait.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use backstreet_core::catalog::Catalog;
    use backstreet_core::config::GameConfig;
    use backstreet_engine::SystemClock;
    use backstreet_events::EventBus;
    use backstreet_store::{MemoryStore, SharedStore};

    async fn console() -> Console {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let deps = GameDeps {
            store: store.clone(),
            bus: Arc::new(EventBus::default()),
            catalog: Arc::new(Catalog::builtin().unwrap()),
            clock: Arc::new(SystemClock),
            config: GameConfig {
                rng_seed: Some(5),
                ..GameConfig::default()
            },
        };
        Console::new(LocalAuth::new(store), deps).await.unwrap()
    }

    fn text(flow: Flow) -> String {
        match flow {
            Flow::Continue(text) => text,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn playing_requires_login() {
        let mut console = console().await;
        assert!(console.player_id().is_none());
        assert_matches!(
            console.execute(Command::Status).await,
            Err(CoreError::Unauthenticated(_))
        );
    }

    #[tokio::test]
    async fn login_then_status() {
        let mut console = console().await;
        let out = text(
            console
                .execute(Command::Login {
                    id: "u-1".into(),
                    display_name: Some("Jae-sung".into()),
                })
                .await
                .unwrap(),
        );
        assert!(out.contains("Jae-sung"));

        let status = text(console.execute(Command::Status).await.unwrap());
        assert!(status.contains("stamina 100/100"), "{status}");
        assert!(status.contains("money 3000"), "{status}");
    }

    #[tokio::test(start_paused = true)]
    async fn finished_mission_credits_reward() {
        let mut console = console().await;
        console
            .execute(Command::Login {
                id: "u-1".into(),
                display_name: None,
            })
            .await
            .unwrap();

        console
            .execute(Command::Start("deal_weed_alley".into()))
            .await
            .unwrap();
        console.execute(Command::Wait).await.unwrap();

        let mut last = String::new();
        for _ in 0..4 {
            last = text(console.execute(Command::Continue).await.unwrap());
        }
        assert!(last.starts_with("Mission "), "{last}");

        let money = console.session.as_ref().unwrap().stats().money;
        if last.contains("success") {
            assert_eq!(money, 3100);
        } else {
            assert_eq!(money, 3000);
        }
    }

    #[tokio::test]
    async fn logout_closes_session() {
        let mut console = console().await;
        console
            .execute(Command::Login {
                id: "u-1".into(),
                display_name: None,
            })
            .await
            .unwrap();
        console.execute(Command::Logout).await.unwrap();
        assert!(console.player_id().is_none());
        assert_eq!(console.execute(Command::Quit).await.unwrap(), Flow::Quit);
    }

    #[test]
    fn waits_are_minutes_and_seconds() {
        assert_eq!(format_wait(Duration::from_secs(185)), "3:05");
    }
}
