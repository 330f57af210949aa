//! Account service.

use photogram_common::{AppError, AppResult, IdGenerator};
use photogram_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Account service for registration and profile settings.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(length(max = 256))]
    pub display_name: Option<String>,

    /// Whether the account starts private.
    #[serde(default)]
    pub is_private: bool,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: UserProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// Every user row gets a profile row; the rest of the system relies
    /// on the profile existing.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Username already taken".to_string(),
            ));
        }

        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();
        let now = chrono::Utc::now();

        let user = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(user_id.clone()),
                username: Set(input.username.clone()),
                username_lower: Set(input.username.to_lowercase()),
                display_name: Set(input.display_name),
                token: Set(Some(token)),
                created_at: Set(now.into()),
            })
            .await?;

        self.profile_repo
            .create(user_profile::ActiveModel {
                user_id: Set(user_id),
                bio: Set(None),
                website: Set(None),
                avatar_url: Set(None),
                is_private: Set(input.is_private),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Account registered");
        Ok(user)
    }

    /// Look up a user by API token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Get a user's profile.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo.get_by_user_id(user_id).await
    }

    /// Toggle account privacy.
    ///
    /// Flipping to public does not retroactively accept pending
    /// requests; they remain pending until acted on.
    pub async fn set_private(&self, user_id: &str, is_private: bool) -> AppResult<()> {
        self.profile_repo.set_private(user_id, is_private).await
    }
}
