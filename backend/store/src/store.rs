use async_trait::async_trait;
use tokio::sync::RwLock;

use moodline_core::{Mood, StoreError, User};

/// Persistence for subscribers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::Duplicate`] when the
    /// external identifier is already registered; never overwrites.
    async fn create_user(&self, user: User) -> Result<(), StoreError>;

    /// Every registered user, in registration order.
    async fn find_all_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Append-only persistence for mood observations.
#[async_trait]
pub trait MoodStore: Send + Sync {
    async fn create_mood(&self, mood: Mood) -> Result<(), StoreError>;

    /// The complete history, in insertion order.
    async fn find_all_moods(&self) -> Result<Vec<Mood>, StoreError>;
}

/// In-memory store for tests and ephemeral runs.
///
/// The duplicate check and the insert happen under a single write lock, so
/// concurrent registrations of the same identity cannot both succeed.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    moods: RwLock<Vec<Mood>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.external_user_id == user.external_user_id)
        {
            return Err(StoreError::Duplicate {
                external_user_id: user.external_user_id,
            });
        }
        users.push(user);
        Ok(())
    }

    async fn find_all_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }
}

#[async_trait]
impl MoodStore for InMemoryStore {
    async fn create_mood(&self, mood: Mood) -> Result<(), StoreError> {
        self.moods.write().await.push(mood);
        Ok(())
    }

    async fn find_all_moods(&self) -> Result<Vec<Mood>, StoreError> {
        Ok(self.moods.read().await.clone())
    }
}
