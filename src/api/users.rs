use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::{spawn_hash_password, AuthenticatedUser};
use crate::db::User;
use crate::error::AppError;
use crate::{AppState, Result};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(AppError::ValidationError("email is required".into()));
        }
        if self.password.is_empty() {
            return Err(AppError::ValidationError("password is required".into()));
        }
        Ok(())
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

pub async fn create_user(
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received registration request for email: {}", req.email);
    req.validate()?;

    let hashed = spawn_hash_password(req.password.clone()).await?;
    let user = state.store.create_user(&req.email, &hashed).await.map_err(|e| {
        error!("Registration failed for email: {}: {}", req.email, e);
        e
    })?;

    info!("Registration successful for email: {}", req.email);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

pub async fn update_user(
    auth: AuthenticatedUser,
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    req.validate()?;

    let hashed = spawn_hash_password(req.password.clone()).await?;
    let user = state
        .store
        .update_user_credentials(auth.user_id, &req.email, &hashed)
        .await
        .map_err(|e| {
            error!("Updating credentials failed for user {}: {}", auth.user_id, e);
            e
        })?;

    info!("Credentials updated for user {}", auth.user_id);
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
