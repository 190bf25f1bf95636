//! Authenticated user blob kept by the session collaborator.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to greet the player with.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Validation("User id must not be empty".into()));
        }
        Ok(())
    }
}

/// Session-change notification published by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(User),
    SignedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name() {
        let user = User::new("u-1").with_display_name("Jae-sung");
        assert_eq!(user.label(), "Jae-sung");
        assert_eq!(User::new("u-1").label(), "u-1");
    }

    #[test]
    fn blank_id_is_invalid() {
        assert!(User::new("  ").validate().is_err());
    }
}
