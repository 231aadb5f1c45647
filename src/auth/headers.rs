use actix_web::dev::Payload;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    authorization_credential(headers, "Bearer")
}

/// Extracts the key from `Authorization: ApiKey <key>`.
pub fn get_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    authorization_credential(headers, "ApiKey")
}

fn authorization_credential<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;

    let (found_scheme, credential) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingHeader)?;

    let credential = credential.trim();
    if !found_scheme.eq_ignore_ascii_case(scheme) || credential.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    Ok(credential)
}

/// Caller identity taken from a valid bearer access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state not configured".into()))?;

    let token = get_bearer_token(req.headers())?;
    let user_id = state.auth_service.verify_access_token(token)?;

    Ok(AuthenticatedUser { user_id })
}
