use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::jwt::{make_jwt, validate_jwt};
use crate::auth::password::spawn_check_password_hash;
use crate::auth::refresh::make_refresh_token;
use crate::config::AuthConfig;
use crate::db::models::{RefreshToken, RefreshTokenStatus, User};
use crate::db::store::CredentialStore;
use crate::error::{AppError, AuthError};
use crate::Result;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and checks both credential kinds.
///
/// Access tokens are verified cryptographically and never touch the store.
/// Refresh tokens are opaque and are only valid while the store says so.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt_secret: String,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            jwt_secret: config.jwt_secret.clone(),
            access_token_ttl: Duration::try_seconds(config.access_token_ttl_secs)
                .unwrap_or(Duration::MAX),
            refresh_token_ttl: Duration::try_days(config.refresh_token_ttl_days)
                .unwrap_or(Duration::MAX),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let user = self.store.get_user_by_email(email).await?;
        // Unknown emails still pay for one Argon2 verification.
        let stored_hash = user.as_ref().map(|u| u.hashed_password.clone());
        spawn_check_password_hash(password.to_string(), stored_hash).await?;
        let user = user.ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.issue_access_token(user.id)?;
        let refresh = RefreshToken::new(make_refresh_token(), user.id, self.refresh_token_ttl)
            .ok_or_else(|| AppError::InternalError("refresh token lifetime out of range".into()))?;
        self.store.save_refresh_token(&refresh).await?;

        debug!(user_id = %user.id, "Issued access and refresh tokens");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token: refresh.token,
        })
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String> {
        Ok(make_jwt(user_id, &self.jwt_secret, self.access_token_ttl)?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Uuid> {
        Ok(validate_jwt(token, &self.jwt_secret)?)
    }

    /// Exchanges an active refresh token for a new access token.
    /// The refresh token itself is left unchanged.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let stored = self
            .store
            .get_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        match stored.status_at(Utc::now()) {
            RefreshTokenStatus::Active => self.issue_access_token(stored.user_id),
            RefreshTokenStatus::Revoked => {
                warn!(user_id = %stored.user_id, "Refresh attempted with revoked token");
                Err(AuthError::InvalidToken.into())
            }
            RefreshTokenStatus::Expired => {
                debug!(user_id = %stored.user_id, "Refresh attempted with expired token");
                Err(AuthError::TokenExpired.into())
            }
        }
    }

    /// Revoking an already revoked token succeeds without changing it.
    pub async fn revoke(&self, refresh_token: &str) -> Result<()> {
        if self.store.revoke_refresh_token(refresh_token, Utc::now()).await? {
            Ok(())
        } else {
            Err(AuthError::InvalidToken.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::db::store::MockCredentialStore;
    use crate::db::MemoryStore;
    use crate::error::DatabaseError;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret".into(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_days: 60,
        }
    }

    async fn service_with_user(email: &str, password: &str) -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let hash = hash_password(password).unwrap();
        store.create_user(email, &hash).await.unwrap();
        (AuthService::new(store.clone(), &auth_config()), store)
    }

    #[tokio::test]
    async fn test_login_issues_tokens() {
        let (service, store) = service_with_user("a@b.com", "secret").await;

        let outcome = service.login("a@b.com", "secret").await.unwrap();
        assert_eq!(service.verify_access_token(&outcome.access_token).unwrap(), outcome.user.id);

        let stored = store.get_refresh_token(&outcome.refresh_token).await.unwrap().unwrap();
        assert_eq!(stored.user_id, outcome.user.id);
        assert!(stored.expires_at > Utc::now() + Duration::days(59));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (service, _) = service_with_user("a@b.com", "secret").await;

        let err = service.login("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidCredentials)));

        let err = service.login("nobody@b.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_fails() {
        let (service, _) = service_with_user("a@b.com", "secret").await;
        let outcome = service.login("a@b.com", "secret").await.unwrap();

        let access = service.refresh(&outcome.refresh_token).await.unwrap();
        assert_eq!(service.verify_access_token(&access).unwrap(), outcome.user.id);

        service.revoke(&outcome.refresh_token).await.unwrap();
        service.revoke(&outcome.refresh_token).await.unwrap();

        let err = service.refresh(&outcome.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_unknown_refresh_token_rejected() {
        let (service, _) = service_with_user("a@b.com", "secret").await;

        let err = service.refresh("does-not-exist").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidToken)));

        let err = service.revoke("does-not-exist").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejected() {
        let mut store = MockCredentialStore::new();
        let user_id = Uuid::new_v4();
        store.expect_get_refresh_token().returning(move |token| {
            let mut expired =
                RefreshToken::new(token.to_string(), user_id, Duration::days(60)).unwrap();
            expired.expires_at = Utc::now() - Duration::seconds(1);
            Ok(Some(expired))
        });

        let service = AuthService::new(Arc::new(store), &auth_config());
        let err = service.refresh("stale").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockCredentialStore::new();
        store
            .expect_get_user_by_email()
            .returning(|_| Err(DatabaseError::ConnectionError("down".into()).into()));

        let service = AuthService::new(Arc::new(store), &auth_config());
        let err = service.login("a@b.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(DatabaseError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_refresh_token_not_saved_on_bad_password() {
        let mut store = MockCredentialStore::new();
        let hash = hash_password("secret").unwrap();
        store.expect_get_user_by_email().returning(move |email| {
            Ok(Some(User::new(email.to_string(), hash.clone())))
        });
        store.expect_save_refresh_token().never();

        let service = AuthService::new(Arc::new(store), &auth_config());
        assert!(service.login("a@b.com", "wrong").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_email_never_issues_tokens() {
        let mut store = MockCredentialStore::new();
        store.expect_get_user_by_email().returning(|_| Ok(None));
        store.expect_save_refresh_token().never();

        let service = AuthService::new(Arc::new(store), &auth_config());
        let err = service.login("nobody@b.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_oversized_lifetimes_fail_without_panicking() {
        let (_, store) = service_with_user("a@b.com", "secret").await;
        let config = AuthConfig {
            refresh_token_ttl_days: 1_000_000_000,
            ..auth_config()
        };
        let service = AuthService::new(store.clone(), &config);
        let err = service.login("a@b.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));

        let config = AuthConfig {
            access_token_ttl_secs: i64::MAX,
            ..auth_config()
        };
        let service = AuthService::new(store, &config);
        let err = service.login("a@b.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::Signing(_))));
    }
}
