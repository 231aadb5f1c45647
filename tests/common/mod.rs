#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use actix_web::web;
use chirpy_server::{AppState, MemoryStore, Settings};

pub fn test_state() -> web::Data<AppState> {
    let config = Settings::new_for_test().expect("Failed to load test config");
    web::Data::new(AppState::with_store(config, Arc::new(MemoryStore::new())))
}

pub fn dev_state() -> web::Data<AppState> {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    config.environment = "dev".into();
    web::Data::new(AppState::with_store(config, Arc::new(MemoryStore::new())))
}

/// Builds the full application around `$state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(chirpy_server::configure($state.clone())),
        )
        .await
    };
}

/// Registers a user and returns the response body.
macro_rules! register {
    ($app:expr, $email:expr, $password:expr) => {{
        let resp = actix_web::test::TestRequest::post()
            .uri("/api/users")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .send_request(&$app)
            .await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body
    }};
}

/// Logs in and returns the response body with `token` and `refresh_token`.
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let resp = actix_web::test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .send_request(&$app)
            .await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body
    }};
}

pub fn bearer(token: &serde_json::Value) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token.as_str().expect("token is a string")))
}
