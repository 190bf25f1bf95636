//! Parsing of console input lines.

use anyhow::{bail, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login {
        id: String,
        display_name: Option<String>,
    },
    Logout,
    Status,
    Missions,
    Start(String),
    Continue,
    Wait,
    Abort,
    History,
    Recruits,
    Recruit(String),
    Crew,
    Talents,
    Unlock(String),
    Quit,
}

pub const HELP: &str = "\
commands:
  login <id> [name]   sign in
  logout              sign out
  status              stamina, money and the active mission
  missions            missions available at your level
  start <mission>     start a mission
  continue            read the next story beat
  wait                wait for the active mission to resolve
  abort               abandon the active mission (no refund)
  history             resolved missions, newest first
  recruits            crew members for hire
  recruit <member>    hire a crew member
  crew                your crew
  talents             the talent tree
  unlock <talent>     spend talent points
  quit                exit";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "login" => {
                let id = required(&mut words, verb, "player id")?;
                let rest: Vec<&str> = words.collect();
                Self::Login {
                    id,
                    display_name: (!rest.is_empty()).then(|| rest.join(" ")),
                }
            }
            "logout" => Self::Logout,
            "status" | "s" => Self::Status,
            "missions" | "m" => Self::Missions,
            "start" => Self::Start(required(&mut words, verb, "mission id")?),
            "continue" | "c" | "next" => Self::Continue,
            "wait" | "w" => Self::Wait,
            "abort" => Self::Abort,
            "history" => Self::History,
            "recruits" => Self::Recruits,
            "recruit" => Self::Recruit(required(&mut words, verb, "member id")?),
            "crew" => Self::Crew,
            "talents" | "t" => Self::Talents,
            "unlock" => Self::Unlock(required(&mut words, verb, "talent id")?),
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };
        Ok(Some(command))
    }
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    verb: &str,
    what: &str,
) -> anyhow::Result<String> {
    words
        .next()
        .map(str::to_string)
        .with_context(|| format!("'{verb}' needs a {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn verbs_with_arguments() {
        assert_eq!(
            Command::parse("start deal_weed_alley").unwrap(),
            Some(Command::Start("deal_weed_alley".into()))
        );
        assert_eq!(
            Command::parse("UNLOCK street_smarts").unwrap(),
            Some(Command::Unlock("street_smarts".into()))
        );
    }

    #[test]
    fn login_takes_optional_display_name() {
        assert_eq!(
            Command::parse("login u-1 Jae sung").unwrap(),
            Some(Command::Login {
                id: "u-1".into(),
                display_name: Some("Jae sung".into()),
            })
        );
        assert_eq!(
            Command::parse("login u-1").unwrap(),
            Some(Command::Login {
                id: "u-1".into(),
                display_name: None,
            })
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = Command::parse("recruit").unwrap_err();
        assert!(err.to_string().contains("member id"));
    }

    #[test]
    fn unknown_verb_is_an_error() {
        assert!(Command::parse("dance").is_err());
    }
}
