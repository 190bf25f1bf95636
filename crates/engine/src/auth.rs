//! Authentication collaborator.
//!
//! [`AuthProvider`] is the seam the game session is gated on. [`LocalAuth`]
//! keeps the signed-in user as the `user` blob in the key-value store.

use async_trait::async_trait;
use backstreet_core::error::CoreError;
use backstreet_core::session::{SessionChange, User};
use backstreet_store::repositories::SessionRepo;
use backstreet_store::SharedStore;
use tokio::sync::broadcast;

const SESSION_CHANNEL_CAPACITY: usize = 16;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<User>, CoreError>;

    async fn sign_out(&self) -> Result<(), CoreError>;

    /// Stream of sign-in and sign-out notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

pub struct LocalAuth {
    store: SharedStore,
    changes: broadcast::Sender<SessionChange>,
}

impl LocalAuth {
    pub fn new(store: SharedStore) -> Self {
        let (changes, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self { store, changes }
    }

    pub async fn sign_in(&self, user: User) -> Result<(), CoreError> {
        user.validate()?;
        SessionRepo::save_user(self.store.as_ref(), &user).await?;
        tracing::info!(user_id = %user.id, "Signed in");
        let _ = self.changes.send(SessionChange::SignedIn(user));
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn current_user(&self) -> Result<Option<User>, CoreError> {
        Ok(SessionRepo::load_user(self.store.as_ref()).await?)
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        SessionRepo::clear_user(self.store.as_ref()).await?;
        tracing::info!("Signed out");
        let _ = self.changes.send(SessionChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }
}
