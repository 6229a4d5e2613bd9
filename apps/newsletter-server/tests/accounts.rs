//! Login form, logout and the JSON auth API.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use newsletter_core::access::CapabilitySet;
use newsletter_server::middleware::auth::TOKEN_COOKIE;

use common::{location, state};

#[actix_web::test]
async fn test_login_sets_token_and_follows_next() {
    let state = state();
    state
        .register_user("ada", "correct horse", CapabilitySet::all())
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/accounts/login")
        .set_form([
            ("username", "ada"),
            ("password", "correct horse"),
            ("next", "/create"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create");
    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .map(|c| c.into_owned())
        .expect("token cookie set");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/create")
            .cookie(token)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/accounts/login")
        .set_form([
            ("username", "ada"),
            ("password", "wrong"),
            ("next", "//evil.example"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_ignores_foreign_next() {
    let state = state();
    state
        .register_user("bob", "hunter2hunter2", CapabilitySet::empty())
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/accounts/login")
        .set_form([
            ("username", "bob"),
            ("password", "hunter2hunter2"),
            ("next", "https://evil.example/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_logout_clears_token() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/accounts/logout").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let removal = resp
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .expect("removal cookie");
    assert_eq!(removal.value(), "");
}

#[actix_web::test]
async fn test_api_register_then_me() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({"username": "carol", "password": "longenough"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["username"], "carol");
    assert_eq!(me["capabilities"], serde_json::json!(["add_comment"]));

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({"username": "carol", "password": "longenough"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_api_me_requires_token() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/auth/me").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
