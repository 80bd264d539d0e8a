use tracing::{debug, info};
use validator::Validate;

use crate::error::AppError;
use crate::models::User;
use crate::repositories::{Repository, UserRepository};
use crate::services::stats_service::StatsService;
use crate::utils::validation::validation_errors_to_app_error;
use storefront_shared::{default_referral_code_owner, UpdateUserRequest, ERROR_REFERRAL_CODE_TAKEN};

/// Customer profiles
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    stats: StatsService,
}

impl UserService {
    pub fn new(users: UserRepository, stats: StatsService) -> Self {
        Self { users, stats }
    }

    /// Existing profile, or a freshly stored default one for a first-time visitor.
    ///
    /// The lookup and the creation are two separate steps.
    pub async fn get_or_create(&self, user_id: i64) -> Result<User, AppError> {
        if let Some(user) = self.users.find_by_id(user_id).await? {
            return Ok(user);
        }

        debug!("User {} not found, creating default profile", user_id);
        let user = self.users.create_default(user_id).await?;
        self.stats.refresh().await;
        Ok(user)
    }

    /// Merge the provided fields into the user's profile, creating it if needed
    pub async fn update_user(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<User, AppError> {
        request.validate().map_err(validation_errors_to_app_error)?;
        if let Some(code) = request.referral_code.as_deref() {
            self.ensure_referral_code_free(user_id, code).await?;
        }

        let mut user = self.get_or_create(user_id).await?;
        user.apply_update(request);
        let user = self.users.save(user).await?;

        info!("Updated profile of user {}", user_id);
        Ok(user)
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.users.is_admin(user_id)
    }

    /// A code is taken when another stored user owns it or when it is the
    /// derived default of another user id. Check and write are not atomic.
    async fn ensure_referral_code_free(&self, user_id: i64, code: &str) -> Result<(), AppError> {
        let reserved = default_referral_code_owner(code).is_some_and(|owner| owner != user_id);
        let owned = self
            .users
            .find_by_referral_code(code)
            .await?
            .is_some_and(|owner| owner.id != user_id);

        if reserved || owned {
            debug!("User {} asked for referral code {} owned by someone else", user_id, code);
            return Err(AppError::Conflict(ERROR_REFERRAL_CODE_TAKEN.to_string()));
        }
        Ok(())
    }
}
