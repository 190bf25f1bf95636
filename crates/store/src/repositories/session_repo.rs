use backstreet_core::session::User;

use crate::error::StoreError;
use crate::keys::USER_KEY;
use crate::kv::KeyValueStore;

/// The locally cached session blob.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn load_user(store: &dyn KeyValueStore) -> Result<Option<User>, StoreError> {
        super::load(store, USER_KEY).await
    }

    pub async fn save_user(store: &dyn KeyValueStore, user: &User) -> Result<(), StoreError> {
        super::save(store, USER_KEY, user).await
    }

    pub async fn clear_user(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(USER_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn save_load_clear() {
        let store = MemoryStore::new();
        let user = User::new("u-1").with_display_name("Jae-sung");

        SessionRepo::save_user(&store, &user).await.unwrap();
        assert_eq!(SessionRepo::load_user(&store).await.unwrap(), Some(user));

        SessionRepo::clear_user(&store).await.unwrap();
        assert_eq!(SessionRepo::load_user(&store).await.unwrap(), None);
    }
}
