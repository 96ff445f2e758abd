//! Owner-scoped todo store integration tests.
//!
//! These run against a live Postgres at DATABASE_URL, so they are `#[ignore]`
//! by default. Run with `cargo test -- --ignored` after pointing DATABASE_URL
//! at a scratch database.

use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use jsonwebtoken::Algorithm;
use serde_json::json;
use sqlx::PgPool;
use todoforge::config::Config;
use todoforge::routes;
use todoforge::store;

fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_algorithm: Algorithm::HS256,
        token_ttl_minutes: 30,
    }
}

async fn setup_pool() -> (PgPool, Config) {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    (pool, test_config(database_url))
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    // Owned todos go with the user (explicit cascade in store, FK in schema).
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! init_app {
    ($pool:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config.clone()))
                .wrap(Logger::default())
                .configure(routes::config),
        )
        .await
    };
}

/// Registers the user and returns a bearer token for them.
macro_rules! register_and_login {
    ($app:expr, $email:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": $email,
                "username": $username,
                "password": "Password123!"
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert!(resp.status().is_success(), "setup: registration failed");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": $username, "password": "Password123!" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert!(resp.status().is_success(), "setup: login failed");
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

macro_rules! bearer {
    ($token:expr) => {
        ("Authorization", format!("Bearer {}", $token))
    };
}

#[ignore] // requires a running Postgres
#[actix_rt::test]
async fn test_todo_crud_and_search() {
    let (pool, config) = setup_pool().await;
    cleanup_user(&pool, "crud@example.com").await;
    let app = init_app!(pool, config);
    let token = register_and_login!(app, "crud@example.com", "crud_user");

    // Create three todos.
    let mut ids = Vec::new();
    for (title, description) in [
        ("Buy milk", Some("Two liters")),
        ("Buy eggs", None),
        ("Walk dog", Some("Evening walk")),
    ] {
        let req = test::TestRequest::post()
            .uri("/todos")
            .append_header(bearer!(token))
            .set_json(json!({ "title": title, "description": description }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["completed"], false);
        ids.push(body["id"].as_i64().unwrap());
    }

    // Case-insensitive search over title and description, counted before
    // pagination.
    let req = test::TestRequest::get()
        .uri("/todos?search=BUY")
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    let titles: Vec<&str> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Buy milk", "Buy eggs"]);

    // Pagination: page 2 of per_page=2 holds the third todo; total still 3.
    let req = test::TestRequest::get()
        .uri("/todos?page=2&per_page=2")
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["todos"].as_array().unwrap().len(), 1);
    assert_eq!(body["todos"][0]["title"], "Walk dog");

    // Partial update: completing a todo leaves title and description alone.
    let req = test::TestRequest::put()
        .uri(&format!("/todos/{}", ids[0]))
        .append_header(bearer!(token))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["completed"], true);
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["description"], "Two liters");

    // Explicit null clears the description.
    let req = test::TestRequest::put()
        .uri(&format!("/todos/{}", ids[0]))
        .append_header(bearer!(token))
        .set_json(json!({ "description": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["description"].is_null());
    assert_eq!(body["title"], "Buy milk");

    // Completion filter.
    let req = test::TestRequest::get()
        .uri("/todos?completed=true")
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["todos"][0]["id"], ids[0]);

    // Toggle flips completion back off.
    let req = test::TestRequest::post()
        .uri(&format!("/todos/{}/toggle", ids[0]))
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["completed"], false);

    // Delete succeeds once; the second attempt is 404, not idempotent.
    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", ids[1]))
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Todo deleted successfully");

    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", ids[1]))
        .append_header(bearer!(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    cleanup_user(&pool, "crud@example.com").await;
}

#[ignore] // requires a running Postgres
#[actix_rt::test]
async fn test_cross_user_access_is_not_found() {
    let (pool, config) = setup_pool().await;
    cleanup_user(&pool, "owner-a@example.com").await;
    cleanup_user(&pool, "owner-b@example.com").await;
    let app = init_app!(pool, config);

    let token_a = register_and_login!(app, "owner-a@example.com", "owner_a");
    let token_b = register_and_login!(app, "owner-b@example.com", "owner_b");

    // A creates a todo.
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer!(token_a))
        .set_json(json!({ "title": "A's private todo" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let todo_id = body["id"].as_i64().unwrap();

    // Every operation by B against A's todo reports 404, never 403, so B
    // cannot confirm the todo exists at all.
    let attempts = vec![
        test::TestRequest::get().uri(&format!("/todos/{}", todo_id)),
        test::TestRequest::put()
            .uri(&format!("/todos/{}", todo_id))
            .set_json(json!({ "title": "hijacked" })),
        test::TestRequest::delete().uri(&format!("/todos/{}", todo_id)),
        test::TestRequest::post().uri(&format!("/todos/{}/toggle", todo_id)),
    ];
    for attempt in attempts {
        let req = attempt.append_header(bearer!(token_b)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    // B's listing does not leak A's todo.
    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(bearer!(token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);

    // A still sees it untouched.
    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(bearer!(token_a))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "A's private todo");

    cleanup_user(&pool, "owner-a@example.com").await;
    cleanup_user(&pool, "owner-b@example.com").await;
}

#[ignore] // requires a running Postgres
#[actix_rt::test]
async fn test_invalid_todo_inputs() {
    let (pool, config) = setup_pool().await;
    cleanup_user(&pool, "inputs@example.com").await;
    let app = init_app!(pool, config);
    let token = register_and_login!(app, "inputs@example.com", "inputs_user");

    // Empty title.
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer!(token))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);

    // Title too long.
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer!(token))
        .set_json(json!({ "title": "a".repeat(201) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);

    // Description too long.
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(bearer!(token))
        .set_json(json!({ "title": "ok", "description": "b".repeat(1001) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNPROCESSABLE_ENTITY);

    // Pagination bounds.
    for uri in ["/todos?page=0", "/todos?per_page=0", "/todos?per_page=101"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .append_header(bearer!(token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "expected 422 for {}",
            uri
        );
    }

    // Todos require a token at all.
    let req = test::TestRequest::get().uri("/todos").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    cleanup_user(&pool, "inputs@example.com").await;
}

#[ignore] // requires a running Postgres
#[actix_rt::test]
async fn test_user_delete_cascades_to_todos() {
    let (pool, config) = setup_pool().await;
    cleanup_user(&pool, "cascade@example.com").await;
    let app = init_app!(pool, config);
    let token = register_and_login!(app, "cascade@example.com", "cascade_user");

    for title in ["one", "two"] {
        let req = test::TestRequest::post()
            .uri("/todos")
            .append_header(bearer!(token))
            .set_json(json!({ "title": title }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let user = store::users::find_by_username(&pool, "cascade_user")
        .await
        .unwrap()
        .expect("user should exist");

    assert!(store::users::delete(&pool, user.id).await.unwrap());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE owner_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    // The user row is gone too, and a repeat delete reports false.
    assert!(store::users::find_by_username(&pool, "cascade_user")
        .await
        .unwrap()
        .is_none());
    assert!(!store::users::delete(&pool, user.id).await.unwrap());
}
