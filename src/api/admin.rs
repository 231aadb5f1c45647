use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::{AppState, Result};

pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let body = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        state.hits.hits()
    );

    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// Deletes all users and zeroes the hit counter. Dev environment only.
pub async fn reset(state: web::Data<AppState>) -> Result<HttpResponse> {
    if !state.config.is_dev() {
        warn!("Reset refused in environment: {}", state.config.environment);
        return Err(AuthError::Forbidden("reset is only allowed in dev".into()).into());
    }

    state.store.delete_all_users().await?;
    state.hits.reset();

    info!("Store and hit counter reset");
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset to 0"))
}
