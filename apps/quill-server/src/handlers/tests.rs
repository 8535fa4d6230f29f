use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use quill_core::ports::{ROLE_STAFF, TokenService};
use quill_infra::{JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "quill-test".to_string(),
    }))
}

macro_rules! app {
    ($tokens:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory()))
                .app_data(web::Data::new($tokens))
                .configure(configure_routes),
        )
        .await
    };
}

fn bearer(tokens: &Arc<dyn TokenService>, name: &str, roles: &[&str]) -> String {
    let token = tokens
        .generate_token(
            Uuid::new_v4(),
            name,
            &format!("{name}@example.com"),
            roles.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap();
    format!("Bearer {token}")
}

fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_rt::test]
async fn test_health() {
    let app = app!(token_service());

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request())
            .await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[actix_rt::test]
async fn test_staff_publishes_and_reader_comments() {
    let tokens = token_service();
    let app = app!(tokens.clone());
    let editor = bearer(&tokens, "editor", &[ROLE_STAFF]);
    let reader = bearer(&tokens, "reader", &[]);

    let req = test::TestRequest::post()
        .uri("/admin/categories")
        .insert_header((header::AUTHORIZATION, editor.clone()))
        .set_json(json!({ "name": "Travel" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["slug"], "travel");
    let category_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/blog/create_post/")
        .insert_header((header::AUTHORIZATION, editor))
        .set_json(json!({
            "title": "Trip",
            "content": "Went **far**.",
            "category": category_id,
            "tags_str": "a; b, a",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/blog/1/");

    let req = test::TestRequest::post()
        .uri("/blog/1/new_comment/")
        .insert_header((header::AUTHORIZATION, reader))
        .set_json(json!({ "content": "nice!" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/blog/1/#comment-1");

    let detail: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/blog/1/").to_request())
            .await;
    assert_eq!(detail["post"]["title"], "Trip");
    assert_eq!(detail["post"]["label"], "[1]Trip :: editor");
    assert_eq!(detail["post"]["tags"].as_array().unwrap().len(), 2);
    assert_eq!(detail["comments"][0]["content"], "nice!");
    assert_eq!(detail["categories"][0]["post_count"], 1);
    assert_eq!(detail["no_category_post_count"], 0);
}

#[actix_rt::test]
async fn test_anonymous_create_is_redirected() {
    let app = app!(token_service());

    let req = test::TestRequest::post()
        .uri("/blog/create_post/")
        .set_json(json!({ "title": "Sneaky", "content": "x" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/blog/");

    let list: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/blog/").to_request())
            .await;
    assert!(list["post_list"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_forged_token_counts_as_anonymous() {
    let app = app!(token_service());
    let forged = bearer(&token_service_with_other_secret(), "mallory", &[ROLE_STAFF]);

    let req = test::TestRequest::get()
        .uri("/blog/create_post/")
        .insert_header((header::AUTHORIZATION, forged))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
}

fn token_service_with_other_secret() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "not-the-server-secret".to_string(),
        expiration_hours: 1,
        issuer: "quill-test".to_string(),
    }))
}

#[actix_rt::test]
async fn test_anonymous_comment_is_forbidden() {
    let tokens = token_service();
    let app = app!(tokens.clone());

    let req = test::TestRequest::post()
        .uri("/blog/create_post/")
        .insert_header((header::AUTHORIZATION, bearer(&tokens, "editor", &[ROLE_STAFF])))
        .set_json(json!({ "title": "Open", "content": "x" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/blog/1/new_comment/")
        .set_json(json!({ "content": "hi" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 403);
}

#[actix_rt::test]
async fn test_missing_post_is_404_before_auth() {
    let app = app!(token_service());

    for req in [
        test::TestRequest::get().uri("/blog/42/").to_request(),
        test::TestRequest::get().uri("/blog/42/new_comment/").to_request(),
        test::TestRequest::get().uri("/blog/update_post/42/").to_request(),
        test::TestRequest::get().uri("/blog/category/nowhere/").to_request(),
        test::TestRequest::get().uri("/blog/tag/nothing/").to_request(),
        test::TestRequest::get().uri("/blog/?page=9").to_request(),
    ] {
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_rt::test]
async fn test_blank_comment_lists_field_errors() {
    let tokens = token_service();
    let app = app!(tokens.clone());
    let editor = bearer(&tokens, "editor", &[ROLE_STAFF]);

    let req = test::TestRequest::post()
        .uri("/blog/create_post/")
        .insert_header((header::AUTHORIZATION, editor.clone()))
        .set_json(json!({ "title": "Quiet", "content": "x" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/blog/1/new_comment/")
        .insert_header((header::AUTHORIZATION, editor))
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"][0]["field"], "content");
}

#[actix_rt::test]
async fn test_only_author_may_update() {
    let tokens = token_service();
    let app = app!(tokens.clone());
    let author = bearer(&tokens, "author", &[ROLE_STAFF]);
    let rival = bearer(&tokens, "rival", &[ROLE_STAFF]);

    let req = test::TestRequest::post()
        .uri("/blog/create_post/")
        .insert_header((header::AUTHORIZATION, author.clone()))
        .set_json(json!({ "title": "Mine", "content": "x", "tags_str": "one" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/blog/update_post/1/")
        .insert_header((header::AUTHORIZATION, rival))
        .set_json(json!({ "title": "Stolen", "content": "y" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/blog/update_post/1/")
        .insert_header((header::AUTHORIZATION, author.clone()))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["post"]["title"], "Mine");
    assert_eq!(form["tag_str_default"], "one");

    let req = test::TestRequest::post()
        .uri("/blog/update_post/1/")
        .insert_header((header::AUTHORIZATION, author))
        .set_json(json!({ "title": "Still mine", "content": "z", "tags_str": "two" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/blog/1/");

    let found: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/blog/search/STILL/").to_request(),
    )
    .await;
    assert_eq!(found["search_info"], "Search : STILL(1)");
    assert_eq!(found["post_list"][0]["tags"][0]["name"], "two");
}

#[actix_rt::test]
async fn test_malformed_body_is_problem_document() {
    let tokens = token_service();
    let app = app!(tokens.clone());

    let req = test::TestRequest::post()
        .uri("/admin/tags")
        .insert_header((header::AUTHORIZATION, bearer(&tokens, "editor", &[ROLE_STAFF])))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "Bad Request");
}

#[actix_rt::test]
async fn test_duplicate_tag_is_conflict() {
    let tokens = token_service();
    let app = app!(tokens.clone());
    let editor = bearer(&tokens, "editor", &[ROLE_STAFF]);

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/admin/tags")
            .insert_header((header::AUTHORIZATION, editor.clone()))
            .set_json(json!({ "name": "Rust" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), expected);
    }
}

#[actix_rt::test]
async fn test_landing_lists_recent_posts() {
    let tokens = token_service();
    let app = app!(tokens.clone());
    let editor = bearer(&tokens, "editor", &[ROLE_STAFF]);

    for n in 0..4 {
        let req = test::TestRequest::post()
            .uri("/blog/create_post/")
            .insert_header((header::AUTHORIZATION, editor.clone()))
            .set_json(json!({ "title": format!("Post {n}"), "content": "x" }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    let recent = body["recent_posts"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0]["title"], "Post 3");
}
