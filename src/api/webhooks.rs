use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::get_api_key;
use crate::error::{AppError, AuthError};
use crate::{AppState, Result};

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: Option<WebhookData>,
}

fn check_api_key(req: &HttpRequest, expected: Option<&str>) -> Result<()> {
    let provided = get_api_key(req.headers())?;
    // No configured key means nothing is accepted.
    let expected = expected.ok_or(AuthError::InvalidApiKey)?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey.into())
    }
}

/// Payment provider callback; upgrades a user on `user.upgraded`.
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Authenticate before looking at the payload.
    check_api_key(&req, state.config.polka.api_key.as_deref()).map_err(|e| {
        warn!("Rejected webhook call: {}", e);
        e
    })?;

    let body: PolkaWebhook = serde_json::from_slice(&payload)
        .map_err(|e| AppError::ValidationError(format!("invalid webhook payload: {}", e)))?;

    if body.event != USER_UPGRADED_EVENT {
        info!("Ignoring webhook event: {}", body.event);
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = body
        .data
        .as_ref()
        .map(|data| data.user_id)
        .ok_or_else(|| AppError::ValidationError("missing data.user_id".into()))?;

    if !state.store.upgrade_user(user_id).await? {
        return Err(AppError::NotFound(format!("user {}", user_id)));
    }

    info!("Upgraded user {} to Chirpy Red", user_id);
    Ok(HttpResponse::NoContent().finish())
}
