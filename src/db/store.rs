use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{Chirp, RefreshToken, User};
use crate::Result;

/// Persistence for users, chirps and refresh tokens.
///
/// Implementations must give each call atomic semantics; handlers rely on
/// the store for consistency and take no locks of their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `DatabaseError::Duplicate` when the email is taken.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User>;

    /// Returns `false` when no such user exists.
    async fn upgrade_user(&self, id: Uuid) -> Result<bool>;

    /// Removes every user together with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> Result<()>;

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp>;

    /// Oldest first.
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>>;

    async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>>;

    async fn delete_chirp(&self, id: Uuid) -> Result<bool>;

    async fn save_refresh_token(&self, token: &RefreshToken) -> Result<()>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    /// Stamps `revoked_at` unless already set. Returns `false` for unknown tokens.
    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> Result<bool>;
}
