use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError};
use crate::{AppState, Result};

pub const MAX_CHIRP_LENGTH: usize = 140;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Masks banned words with `****`.
///
/// Words are split on single spaces and compared case-insensitively; a word
/// with punctuation attached does not match.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if BANNED_WORDS.contains(&lower.as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError(format!("invalid {}: {}", what, raw)))
}

pub async fn create_chirp(
    auth: AuthenticatedUser,
    req: web::Json<CreateChirpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::ValidationError("Chirp is too long".into()));
    }

    let chirp = state
        .store
        .create_chirp(auth.user_id, &clean_body(&req.body))
        .await?;

    info!("User {} created chirp {}", auth.user_id, chirp.id);
    Ok(HttpResponse::Created().json(chirp))
}

pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let author_id = query
        .author_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id(raw, "author_id"))
        .transpose()?;

    let mut chirps = state.store.list_chirps(author_id).await?;
    match query.sort {
        SortOrder::Asc => chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Desc => chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    Ok(HttpResponse::Ok().json(chirps))
}

pub async fn get_chirp(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let chirp_id = parse_id(&path, "chirp id")?;

    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chirp {}", chirp_id)))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// Only the author may delete a chirp.
pub async fn delete_chirp(
    auth: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let chirp_id = parse_id(&path, "chirp id")?;

    let chirp = state
        .store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chirp {}", chirp_id)))?;

    if chirp.user_id != auth.user_id {
        warn!("User {} attempted to delete chirp {} owned by {}", auth.user_id, chirp_id, chirp.user_id);
        return Err(AuthError::Forbidden("only the author may delete a chirp".into()).into());
    }

    if !state.store.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound(format!("chirp {}", chirp_id)));
    }

    info!("User {} deleted chirp {}", auth.user_id, chirp_id);
    Ok(HttpResponse::NoContent().finish())
}
