use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::users::UserResponse;
use crate::auth::headers::get_bearer_token;
use crate::error::AppError;
use crate::{AppState, Result};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received login request for email: {}", req.email);
    match state.auth_service.login(&req.email, &req.password).await {
        Ok(outcome) => {
            info!("Login successful for email: {}", req.email);
            Ok(HttpResponse::Ok().json(LoginResponse {
                user: UserResponse::from(outcome.user),
                token: outcome.access_token,
                refresh_token: outcome.refresh_token,
            }))
        }
        Err(e) => {
            warn!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

/// Exchanges the refresh token in the bearer header for a new access token.
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let refresh_token = get_bearer_token(req.headers()).map_err(AppError::from)?;

    let token = state.auth_service.refresh(refresh_token).await.map_err(|e| {
        warn!("Token refresh rejected: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let refresh_token = get_bearer_token(req.headers()).map_err(AppError::from)?;

    state.auth_service.revoke(refresh_token).await.map_err(|e| {
        warn!("Token revocation rejected: {}", e);
        e
    })?;

    info!("Refresh token revoked");
    Ok(HttpResponse::NoContent().finish())
}
