#[macro_use]
mod common;

use actix_web::test;
use chirpy_server::auth::make_jwt;
use common::bearer;
use serde_json::{json, Value};
use uuid::Uuid;

#[actix_web::test]
async fn test_register_and_login() {
    let state = common::test_state();
    let app = test_app!(state);

    let user = register!(app, "a@b.com", "secret");
    assert!(Uuid::parse_str(user["id"].as_str().unwrap()).is_ok());
    assert_eq!(user["email"], "a@b.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());

    let session = login!(app, "a@b.com", "secret");
    assert_eq!(session["id"], user["id"]);
    assert!(session["token"].as_str().is_some());
    assert_eq!(session["refresh_token"].as_str().unwrap().len(), 43);
    assert!(session.get("hashed_password").is_none());
}

#[actix_web::test]
async fn test_invalid_login() {
    let state = common::test_state();
    let app = test_app!(state);
    register!(app, "a@b.com", "secret");

    for (email, password) in [("a@b.com", "wrong"), ("nobody@b.com", "secret")] {
        let resp = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": email, "password": password }))
            .send_request(&app)
            .await;

        assert_eq!(resp.status(), 401);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Incorrect email or password"));
    }
}

#[actix_web::test]
async fn test_invalid_registration() {
    let state = common::test_state();
    let app = test_app!(state);

    for payload in [
        json!({ "email": "", "password": "secret" }),
        json!({ "email": "a@b.com", "password": "" }),
        json!({ "email": "a@b.com" }),
    ] {
        let resp = test::TestRequest::post()
            .uri("/api/users")
            .set_json(payload)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400);
    }
}

#[actix_web::test]
async fn test_duplicate_registration() {
    let state = common::test_state();
    let app = test_app!(state);
    register!(app, "a@b.com", "secret");

    let resp = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "email": "a@b.com", "password": "other" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn test_update_credentials() {
    let state = common::test_state();
    let app = test_app!(state);
    register!(app, "a@b.com", "secret");
    let session = login!(app, "a@b.com", "secret");

    let resp = test::TestRequest::put()
        .uri("/api/users")
        .insert_header(bearer(&session["token"]))
        .set_json(json!({ "email": "new@b.com", "password": "new-secret" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "new@b.com");
    assert_eq!(body["id"], session["id"]);
    assert!(body.get("password").is_none());

    let relogin = login!(app, "new@b.com", "new-secret");
    assert_eq!(relogin["id"], session["id"]);

    let resp = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "a@b.com", "password": "secret" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_update_requires_valid_access_token() {
    let state = common::test_state();
    let app = test_app!(state);
    let user = register!(app, "a@b.com", "secret");
    let session = login!(app, "a@b.com", "secret");
    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();

    let expired = make_jwt(user_id, "test_secret", chrono::Duration::seconds(-1)).unwrap();
    let forged = make_jwt(user_id, "not_the_secret", chrono::Duration::hours(1)).unwrap();

    let cases = [
        None,
        Some(format!("Bearer {}", expired)),
        Some(format!("Bearer {}", forged)),
        // A refresh token is not an access token.
        Some(format!("Bearer {}", session["refresh_token"].as_str().unwrap())),
    ];

    for header in cases {
        let mut req = test::TestRequest::put()
            .uri("/api/users")
            .set_json(json!({ "email": "x@b.com", "password": "x" }));
        if let Some(value) = header {
            req = req.insert_header(("Authorization", value));
        }
        let resp = req.send_request(&app).await;
        assert_eq!(resp.status(), 401);
    }
}

#[actix_web::test]
async fn test_refresh_and_revoke() {
    let state = common::test_state();
    let app = test_app!(state);
    register!(app, "a@b.com", "secret");
    let session = login!(app, "a@b.com", "secret");

    let resp = test::TestRequest::post()
        .uri("/api/refresh")
        .insert_header(bearer(&session["refresh_token"]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let user_id = Uuid::parse_str(session["id"].as_str().unwrap()).unwrap();
    assert_eq!(state.auth_service.verify_access_token(body["token"].as_str().unwrap()).unwrap(), user_id);

    let resp = test::TestRequest::post()
        .uri("/api/revoke")
        .insert_header(bearer(&session["refresh_token"]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 204);

    for _ in 0..2 {
        let resp = test::TestRequest::post()
            .uri("/api/refresh")
            .insert_header(bearer(&session["refresh_token"]))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 401);
    }

    // Revoking again stays a success.
    let resp = test::TestRequest::post()
        .uri("/api/revoke")
        .insert_header(bearer(&session["refresh_token"]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 204);
}

#[actix_web::test]
async fn test_refresh_rejects_unknown_or_missing_token() {
    let state = common::test_state();
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/api/refresh")
        .insert_header(("Authorization", "Bearer unknown-token"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    let resp = test::TestRequest::post().uri("/api/refresh").send_request(&app).await;
    assert_eq!(resp.status(), 401);

    let resp = test::TestRequest::post()
        .uri("/api/revoke")
        .insert_header(("Authorization", "Bearer unknown-token"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_each_login_gets_its_own_refresh_token() {
    let state = common::test_state();
    let app = test_app!(state);
    register!(app, "a@b.com", "secret");
    let first = login!(app, "a@b.com", "secret");
    let second = login!(app, "a@b.com", "secret");
    assert_ne!(first["refresh_token"], second["refresh_token"]);

    let resp = test::TestRequest::post()
        .uri("/api/revoke")
        .insert_header(bearer(&first["refresh_token"]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 204);

    let resp = test::TestRequest::post()
        .uri("/api/refresh")
        .insert_header(bearer(&second["refresh_token"]))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
}
