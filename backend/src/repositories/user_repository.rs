use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::{load_all, load_one, Repository};
use crate::config::AdminAllowlist;
use crate::error::AppError;
use crate::models::{StoredRecord, User};
use crate::store::{Collection, KeyValueStore};

/// Users are keyed by their external id; this repository never allocates ids.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
    keys: Collection,
    admins: Arc<AdminAllowlist>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Collection, admins: AdminAllowlist) -> Self {
        Self {
            store,
            keys,
            admins: Arc::new(admins),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(user_id)
    }

    /// Stores the default record for a user seen for the first time.
    pub async fn create_default(&self, id: i64) -> Result<User, AppError> {
        let user = self.with_admin_flag(User::with_defaults(id, Utc::now()));
        self.store
            .set(&self.keys.record(id), &user.to_fields())
            .await?;
        info!("Created default profile for user {}", id);
        Ok(user)
    }

    /// Linear scan of every user for one owning `code`.
    pub async fn find_by_referral_code(&self, code: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.referral_code == code))
    }

    /// Number of user keys, not counting the counter entry.
    pub async fn count(&self) -> Result<usize, AppError> {
        let keys = self.store.list_keys(self.keys.prefix()).await?;
        Ok(keys.iter().filter(|k| !self.keys.is_counter(k)).count())
    }

    fn with_admin_flag(&self, mut user: User) -> User {
        user.is_admin = self.is_admin(user.id);
        user
    }
}

impl Repository for UserRepository {
    type Entity = User;
    type Id = i64;

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users: Vec<User> = load_all(self.store.as_ref(), &self.keys).await?;
        Ok(users.into_iter().map(|u| self.with_admin_flag(u)).collect())
    }

    /// Plain lookup; absent users are not created here.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user: Option<User> = load_one(self.store.as_ref(), &self.keys.record(id)).await?;
        Ok(user.map(|u| self.with_admin_flag(u)))
    }

    async fn save(&self, mut user: User) -> Result<User, AppError> {
        user.updated_at = Utc::now();
        self.store
            .set(&self.keys.record(user.id), &user.to_fields())
            .await?;
        Ok(self.with_admin_flag(user))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.store.delete(&self.keys.record(id)).await
    }
}
