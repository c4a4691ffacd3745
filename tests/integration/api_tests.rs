//! API integration tests against a live PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use std::{net::SocketAddr, sync::Arc};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};

use bookstore_server::{
    api, config::AppConfig, models::UserClaims, repository::Repository, services::Services,
    AppState,
};

struct TestServer {
    addr: SocketAddr,
    pool: PgPool,
    config: AppConfig,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("Failed to connect to database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let mut config = AppConfig::default();
        config.database.url = url;

        let state = AppState {
            config: Arc::new(config.clone()),
            services: Arc::new(Services::new(Arc::new(Repository::new(pool.clone())))),
        };
        let app = api::router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        TestServer {
            addr,
            pool,
            config,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Insert a user and return a bearer token for it
    async fn user(&self, username: &str, is_staff: bool) -> (i32, String) {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO users (username, first_name, last_name, is_staff) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(username)
        .bind(format!("{}-first", username))
        .bind(format!("{}-last", username))
        .bind(is_staff)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert user");

        let token = UserClaims::new(id, username, is_staff, 1)
            .create_token(&self.config.auth.jwt_secret)
            .expect("Failed to create token");
        (id, token)
    }

    async fn create_book(&self, token: &str, name: &str, price: &str, author_name: &str) -> Value {
        let response = self
            .client
            .post(self.url("/books/"))
            .bearer_auth(token)
            .json(&json!({"name": name, "price": price, "author_name": author_name}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

/// Marker unique to one test run so that rows from other runs never match
fn marker() -> String {
    format!("m{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("Expected a list")
        .iter()
        .map(|b| b["name"].as_str().expect("Missing name"))
        .collect()
}

#[tokio::test]
#[ignore]
async fn test_health_and_readiness() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = server.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_filter_search_and_ordering() {
    let server = TestServer::start().await;
    let m = marker();
    let (_, token) = server.user(&format!("owner-{}", m), false).await;

    server
        .create_book(&token, &format!("Test book 1 {}", m), "25", &format!("Author 1 {}", m))
        .await;
    server
        .create_book(&token, &format!("Test book 2 {}", m), "550", &format!("Author 5 {}", m))
        .await;
    server
        .create_book(&token, &format!("Test book Author 1 {}", m), "55", &format!("Author 2 {}", m))
        .await;

    let (status, body) = server.get(&format!("/books/?search={}&price=55", m)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec![format!("Test book Author 1 {}", m)]);
    assert_eq!(body[0]["price"], "55.00");

    let (_, body) = server.get(&format!("/books/?search={}&ordering=-price", m)).await;
    assert_eq!(
        names(&body),
        vec![
            format!("Test book 2 {}", m),
            format!("Test book Author 1 {}", m),
            format!("Test book 1 {}", m),
        ]
    );

    let (_, body) = server.get(&format!("/books/?search=Author%201%20{}&ordering=price", m)).await;
    assert_eq!(
        names(&body),
        vec![format!("Test book 1 {}", m), format!("Test book Author 1 {}", m)]
    );

    let (_, body) = server
        .get(&format!("/books/?search=tEST%20BOOK%20author%201%20{}", m.to_uppercase()))
        .await;
    assert_eq!(names(&body), vec![format!("Test book Author 1 {}", m)]);

    let (status, body) = server.get("/books/?price=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"price": ["Enter a number."]}));
}

#[tokio::test]
#[ignore]
async fn test_owner_permissions() {
    let server = TestServer::start().await;
    let m = marker();
    let (_, owner) = server.user(&format!("owner-{}", m), false).await;
    let (_, stranger) = server.user(&format!("stranger-{}", m), false).await;
    let (_, staff) = server.user(&format!("staff-{}", m), true).await;

    let book = server
        .create_book(&owner, &format!("Owned {}", m), "25", "Author 1")
        .await;
    assert_eq!(book["owner_name"], format!("owner-{}", m));
    let path = format!("/books/{}/", book["id"]);
    let update = json!({"name": format!("Owned {}", m), "price": "575", "author_name": "Author 1"});

    let response = server
        .client
        .put(server.url(&path))
        .bearer_auth(&stranger)
        .json(&update)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let (_, body) = server.get(&path).await;
    assert_eq!(body["price"], "25.00");

    let response = server
        .client
        .put(server.url(&path))
        .bearer_auth(&staff)
        .json(&update)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let (_, body) = server.get(&path).await;
    assert_eq!(body["price"], "575.00");

    let response = server
        .client
        .delete(server.url(&path))
        .bearer_auth(&stranger)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .client
        .delete(server.url(&path))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, body) = server.get(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not found."}));
}

#[tokio::test]
#[ignore]
async fn test_relations_drive_annotations() {
    let server = TestServer::start().await;
    let m = marker();
    let (_, owner) = server.user(&format!("owner-{}", m), false).await;
    let book = server
        .create_book(&owner, &format!("Rated {}", m), "25", "Author 1")
        .await;
    let relation_path = format!("/relations/{}/", book["id"]);

    for (i, (like, rate)) in [(true, 5), (true, 5), (false, 4)].into_iter().enumerate() {
        let (_, token) = server.user(&format!("reader{}-{}", i, m), false).await;
        let response = server
            .client
            .patch(server.url(&relation_path))
            .bearer_auth(&token)
            .json(&json!({"like": like, "rate": rate}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["like"], like);
        assert_eq!(body["rate"], rate);
        assert_eq!(body["in_bookmarks"], false);
    }

    let (_, body) = server.get(&format!("/books/{}/", book["id"])).await;
    assert_eq!(body["rating"], "4.67");
    assert_eq!(body["readers"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["readers"][0]["first_name"], format!("reader0-{}-first", m));

    let response = server
        .client
        .patch(server.url(&relation_path))
        .bearer_auth(&owner)
        .json(&json!({"rate": 6}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"rate": ["\"6\" is not a valid choice."]}));

    let response = server
        .client
        .patch(server.url(&relation_path))
        .json(&json!({"like": true}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_invalid_rate_keeps_stored_rate() {
    let server = TestServer::start().await;
    let m = marker();
    let (_, owner) = server.user(&format!("owner-{}", m), false).await;
    let (_, reader) = server.user(&format!("reader-{}", m), false).await;
    let book = server
        .create_book(&owner, &format!("Kept rate {}", m), "25", "Author 1")
        .await;
    let relation_path = format!("/relations/{}/", book["id"]);

    let patch = |body: Value| {
        server
            .client
            .patch(server.url(&relation_path))
            .bearer_auth(&reader)
            .json(&body)
            .send()
    };

    let response = patch(json!({"rate": 3})).await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch(json!({"rate": 6})).await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored: Option<i16> = sqlx::query_scalar(
        "SELECT r.rate FROM user_book_relations r JOIN users u ON u.id = r.user_id WHERE r.book_id = $1 AND u.username = $2",
    )
    .bind(book["id"].as_i64().expect("Missing id") as i32)
    .bind(format!("reader-{}", m))
    .fetch_one(&server.pool)
    .await
    .expect("Relation row missing");
    assert_eq!(stored, Some(3));

    let (_, body) = server.get(&format!("/books/{}/", book["id"])).await;
    assert_eq!(body["rating"], "3.00");

    let response = patch(json!({"like": true})).await.expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"book": book["id"], "like": true, "in_bookmarks": false, "rate": 3}));
}
