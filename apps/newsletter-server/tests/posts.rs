//! Post pages over the real route table and an in-memory store.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use newsletter_core::access::Capability;
use newsletter_core::forms::PostForm;

use common::{admin, location, post, session_cookie, state, user};

#[actix_web::test]
async fn test_empty_list_shows_empty_state() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("No posts yet."));
    assert!(body.contains("Page 1 of 1"));
}

#[actix_web::test]
async fn test_list_pages_ten_at_a_time() {
    let state = state();
    let author = admin(&state).await;
    for n in 0..11 {
        post(&state, &author, &format!("Post {n}"), "").await;
    }
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(body.matches("<li>").count(), 10);
    assert!(body.contains("Post 10"));
    assert!(body.contains("page=2"));

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=2").to_request()).await;
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(body.matches("<li>").count(), 1);
    assert!(body.contains("Post 0"));

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=3").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/?page=abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_huge_page_is_not_found() {
    let state = state();
    let author = admin(&state).await;
    post(&state, &author, "Only", "").await;
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/?page=18446744073709551615")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let state = state();
    let app = app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/create").to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/accounts/login?next=%2Fcreate");
}

#[actix_web::test]
async fn test_create_without_capability_is_forbidden() {
    let state = state();
    let reader = user(&state, "reader", &[Capability::CreateComment]).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create")
        .insert_header(reader.auth_header())
        .set_form([("title", "Toto"), ("text", "## Toto")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(state.posts.list(1).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_redirects_to_rendered_detail() {
    let state = state();
    let author = user(&state, "author", &[Capability::CreatePost]).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create")
        .insert_header(author.auth_header())
        .set_form([("title", "Toto"), ("text", "## Toto")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let detail = location(&resp);
    let created = state.posts.list(1).await.unwrap().items.remove(0);
    assert_eq!(detail, format!("/{}", created.id));
    assert_eq!(created.title, "Toto");

    let resp = test::call_service(&app, test::TestRequest::get().uri(&detail).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Toto</h2>"));
    assert!(!body.contains("## Toto"));
}

#[actix_web::test]
async fn test_create_with_blank_title_rerenders_form() {
    let state = state();
    let author = admin(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create")
        .insert_header(author.auth_header())
        .set_form([("title", "   "), ("text", "body")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Title must be between 1 and 512 characters."));
    assert!(state.posts.list(1).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_detail_is_not_found() {
    let state = state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/42").to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(session_cookie(&resp).is_none());
}

#[actix_web::test]
async fn test_update_keeps_author_and_created() {
    let state = state();
    let author = admin(&state).await;
    let editor = user(&state, "editor", &[Capability::ChangePost]).await;
    let original = post(&state, &author, "Before", "text").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/update", original.id))
        .insert_header(editor.auth_header())
        .set_form([("title", "After"), ("text", "new text")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/{}", original.id));

    let updated = state.posts.get(original.id).await.unwrap();
    assert_eq!(updated.title, "After");
    assert_eq!(updated.text, "new text");
    assert_eq!(updated.author_id, original.author_id);
    assert_eq!(updated.created, original.created);
    assert!(updated.modified >= original.modified);
}

#[actix_web::test]
async fn test_delete_cascades_to_comments() {
    let state = state();
    let author = admin(&state).await;
    let doomed = post(&state, &author, "Doomed", "").await;
    let comment = common::comment(&state, &author, &doomed, "bye").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/delete", doomed.id))
        .insert_header(author.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(state.posts.get(doomed.id).await.is_err());
    assert!(state.comments.get(comment.id).await.is_err());
}

#[actix_web::test]
async fn test_flash_is_shown_once() {
    let state = state();
    let author = admin(&state).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/create")
        .insert_header(author.auth_header())
        .set_form(PostForm::new("Hello", "world"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let detail = location(&resp);
    let cookie = session_cookie(&resp).expect("session cookie minted");

    let first = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&detail)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body = String::from_utf8(test::read_body(first).await.to_vec()).unwrap();
    assert!(body.contains("class=\"flash\""));
    assert!(body.contains("added successfully"));

    let second = test::call_service(
        &app,
        test::TestRequest::get().uri(&detail).cookie(cookie).to_request(),
    )
    .await;
    let body = String::from_utf8(test::read_body(second).await.to_vec()).unwrap();
    assert!(!body.contains("added successfully"));
}
