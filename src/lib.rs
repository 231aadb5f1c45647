pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;

use std::sync::Arc;
use std::time::Duration;
use actix_files::Files;
use actix_web::{web, HttpResponse};
use actix_web::http::header::ContentType;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::AuthService;
pub use db::{CredentialStore, MemoryStore, PgStore};
pub use metrics::HitCounter;

/// Liveness probe.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("OK")
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn CredentialStore>,
    pub auth_service: Arc<AuthService>,
    pub hits: Arc<HitCounter>,
}

impl AppState {
    /// Connects to PostgreSQL and applies the bundled migrations.
    pub async fn new(config: Settings) -> Result<Self> {
        let store = PgStore::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;
        store.migrate().await?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Settings, store: Arc<dyn CredentialStore>) -> Self {
        let auth_service = AuthService::new(store.clone(), &config.auth);
        Self {
            config: Arc::new(config),
            store,
            auth_service: Arc::new(auth_service),
            hits: Arc::new(HitCounter::new()),
        }
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Registers state, extractor config and every route.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let static_dir = state.config.server.static_dir.clone();
        let hits = state.hits.clone();

        cfg.app_data(state)
            .app_data(json_config())
            .app_data(query_config())
            .service(
                web::scope("/app")
                    .wrap(metrics::CountHits::new(hits))
                    .service(Files::new("", static_dir).index_file("index.html")),
            )
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .service(
                        web::resource("/users")
                            .route(web::post().to(api::users::create_user))
                            .route(web::put().to(api::users::update_user)),
                    )
                    .route("/login", web::post().to(auth::handlers::login))
                    .route("/refresh", web::post().to(auth::handlers::refresh))
                    .route("/revoke", web::post().to(auth::handlers::revoke))
                    .service(
                        web::resource("/chirps")
                            .route(web::get().to(api::chirps::list_chirps))
                            .route(web::post().to(api::chirps::create_chirp)),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .route(web::get().to(api::chirps::get_chirp))
                            .route(web::delete().to(api::chirps::delete_chirp)),
                    )
                    .route("/polka/webhooks", web::post().to(api::webhooks::polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(api::admin::metrics))
                    .route("/reset", web::post().to(api::admin::reset)),
            );
    }
}
