/// Domain error taxonomy shared by every Backstreet crate.
///
/// The `Insufficient*` and `UnmetPrerequisite` variants are validation
/// outcomes: an operation that returns one of them has not mutated any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Insufficient stamina: {required} required, {available} available")]
    InsufficientResource { required: u32, available: u32 },

    #[error("Insufficient funds: {required} required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Insufficient talent points: {required} required, {available} available")]
    InsufficientPoints { required: u32, available: u32 },

    #[error("Talent '{talent}' requires {missing:?} to be unlocked first")]
    UnmetPrerequisite { talent: String, missing: Vec<String> },

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Mission already in progress: {0}")]
    MissionInProgress(String),

    #[error("No active mission")]
    NoActiveMission,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error is a pure validation outcome (no state was touched).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InsufficientResource { .. }
                | Self::InsufficientFunds { .. }
                | Self::InsufficientPoints { .. }
                | Self::UnmetPrerequisite { .. }
                | Self::Validation(_)
                | Self::MissionInProgress(_)
                | Self::NoActiveMission
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_resource_message_names_both_amounts() {
        let err = CoreError::InsufficientResource {
            required: 15,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stamina: 15 required, 4 available"
        );
    }

    #[test]
    fn persistence_failure_is_not_validation() {
        assert!(!CoreError::PersistenceUnavailable("disk full".into()).is_validation());
        assert!(CoreError::NoActiveMission.is_validation());
    }
}
