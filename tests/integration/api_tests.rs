//! API integration tests, run in-process against the in-memory backend

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use catalog_server::{
    api,
    authz::ClaimsAuthorizer,
    config::AppConfig,
    models::{
        book::CreateBook,
        book_instance::{BookInstance, LoanStatus},
        user::{Capability, UserClaims},
    },
    repository::{BookInstanceStore, BookStore, MemoryStore, Repository},
    services::Services,
    AppState,
};

const SECRET: &str = "integration-secret";

struct TestApp {
    router: Router,
    store: MemoryStore,
}

impl TestApp {
    fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = SECRET.to_string();

        let store = MemoryStore::new();
        let services = Services::new(
            Repository::in_memory(store.clone()),
            Arc::new(ClaimsAuthorizer),
            &config,
        );
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };
        Self {
            router: api::router(state),
            store,
        }
    }

    async fn add_book(&self, title: &str, isbn: &str) -> i32 {
        BookStore::create(
            &self.store,
            &CreateBook {
                title: title.into(),
                author_id: None,
                summary: None,
                isbn: isbn.into(),
                genre_ids: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn add_copy(&self, book_id: i32, due_back: Option<NaiveDate>, borrower_id: Option<i32>) -> Uuid {
        let status = if due_back.is_some() {
            LoanStatus::OnLoan
        } else {
            LoanStatus::Available
        };
        BookInstanceStore::create(
            &self.store,
            &BookInstance {
                id: Uuid::new_v4(),
                book_id,
                imprint: "Faber, 1962".into(),
                due_back,
                status,
                borrower_id,
                version: 0,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

fn token(user_id: i32, sid: Option<&str>, capabilities: &[Capability]) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: format!("user-{}", user_id),
        user_id,
        sid: sid.map(str::to_string),
        is_superuser: false,
        capabilities: capabilities.iter().map(|c| c.as_str().to_string()).collect(),
        exp: now + 3600,
        iat: now,
    }
    .create_token(SECRET)
    .unwrap()
}

fn librarian() -> String {
    token(1, None, &[Capability::MarkReturned])
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_renew_over_http() {
    let app = TestApp::new();
    let book = app.add_book("The Drowned World", "9780007221837").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(2)), Some(7)).await;
    let new_due = today() + Duration::weeks(2);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/book-instances/{}/renew", copy),
            Some(&librarian()),
            Some(json!({ "due_back": new_due })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["due_back"], new_due.to_string());
    assert_eq!(body["status"], "on_loan");
    assert_eq!(body["borrower_id"], 7);
    assert_eq!(body["version"], 1);
}

#[tokio::test]
async fn test_renewal_proposal_defaults_to_three_weeks() {
    let app = TestApp::new();
    let book = app.add_book("Concrete Island", "9780007221844").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(1)), Some(7)).await;

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/book-instances/{}/renew", copy),
            Some(&librarian()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proposed_due_back"], (today() + Duration::weeks(3)).to_string());
    assert_eq!(body["latest_due_back"], (today() + Duration::weeks(4)).to_string());
    assert_eq!(body["book_instance"]["id"], copy.to_string());
}

#[tokio::test]
async fn test_renew_without_body_uses_proposed_date() {
    let app = TestApp::new();
    let book = app.add_book("The Wind from Nowhere", "9780007221936").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(1)), Some(7)).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/book-instances/{}/renew", copy),
            Some(&librarian()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["due_back"], (today() + Duration::weeks(3)).to_string());
}

#[tokio::test]
async fn test_renew_with_malformed_body_is_bad_request() {
    let app = TestApp::new();
    let book = app.add_book("The Drought", "9780007221943").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(1)), Some(7)).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/book-instances/{}/renew", copy),
            Some(&librarian()),
            Some(json!({ "due_back": "next tuesday" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_renew_rejects_dates_outside_window() {
    let app = TestApp::new();
    let book = app.add_book("High-Rise", "9780007221851").await;
    let due = today() + Duration::days(2);
    let copy = app.add_copy(book, Some(due), Some(7)).await;
    let uri = format!("/api/v1/book-instances/{}/renew", copy);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&librarian()),
            Some(json!({ "due_back": today() - Duration::days(1) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "date in past");
    assert_eq!(body["retryable"], false);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&librarian()),
            Some(json!({ "due_back": today() + Duration::weeks(4) + Duration::days(1) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "date too far in future");

    // Copy unchanged
    let (_, body) = app
        .send(Method::GET, &format!("/api/v1/book-instances/{}", copy), Some(&librarian()), None)
        .await;
    assert_eq!(body["due_back"], due.to_string());
    assert_eq!(body["version"], 0);
}

#[tokio::test]
async fn test_return_over_http_is_idempotent() {
    let app = TestApp::new();
    let book = app.add_book("Crash", "9780007221868").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(3)), Some(9)).await;
    let uri = format!("/api/v1/book-instances/{}/return", copy);

    let (status, body) = app.send(Method::POST, &uri, Some(&librarian()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["due_back"], Value::Null);
    assert_eq!(body["borrower_id"], Value::Null);

    let (status, body) = app.send(Method::POST, &uri, Some(&librarian()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
}

#[tokio::test]
async fn test_loan_endpoints_require_authentication_and_capability() {
    let app = TestApp::new();
    let book = app.add_book("The Atrocity Exhibition", "9780007221875").await;
    let copy = app.add_copy(book, Some(today() + Duration::days(3)), Some(9)).await;
    let uri = format!("/api/v1/book-instances/{}/return", copy);

    let (status, body) = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");

    let (status, _) = app.send(Method::POST, &uri, Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let reader = token(9, None, &[]);
    let (status, body) = app.send(Method::POST, &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = app.send(Method::GET, "/api/v1/loans", Some(&reader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Copy still on loan
    let (_, body) = app
        .send(Method::GET, &format!("/api/v1/book-instances/{}", copy), Some(&reader), None)
        .await;
    assert_eq!(body["status"], "on_loan");
}

#[tokio::test]
async fn test_unknown_copy_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/book-instances/{}/return", Uuid::new_v4()),
            Some(&librarian()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchRecord");
}

#[tokio::test]
async fn test_renewing_available_copy_is_refused() {
    let app = TestApp::new();
    let book = app.add_book("Super-Cannes", "9780007221882").await;
    let copy = app.add_copy(book, None, None).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/v1/book-instances/{}/renew", copy),
            Some(&librarian()),
            Some(json!({})),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvalidState");
}

#[tokio::test]
async fn test_loan_listings() {
    let app = TestApp::new();
    let book = app.add_book("Empire of the Sun", "9780007221899").await;
    let overdue = app.add_copy(book, Some(today() - Duration::days(2)), Some(5)).await;
    let upcoming = app.add_copy(book, Some(today() + Duration::days(5)), Some(6)).await;
    app.add_copy(book, None, None).await;

    let (status, body) = app.send(Method::GET, "/api/v1/loans", Some(&librarian()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["id"], overdue.to_string());
    assert_eq!(body["items"][0]["is_overdue"], true);
    assert_eq!(body["items"][0]["title"], "Empire of the Sun");
    assert_eq!(body["items"][1]["id"], upcoming.to_string());
    assert_eq!(body["items"][1]["is_overdue"], false);

    let borrower = token(6, None, &[]);
    let (status, body) = app.send(Method::GET, "/api/v1/loans/mine", Some(&borrower), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], upcoming.to_string());
}

#[tokio::test]
async fn test_summary_counts_visits_per_session() {
    let app = TestApp::new();
    let book = app.add_book("El Aleph", "9780007221905").await;
    app.add_book("The Unlimited Dream Company", "9780007221912").await;
    app.add_copy(book, None, None).await;
    app.add_copy(book, Some(today() - Duration::days(1)), Some(3)).await;

    let session = token(3, Some("session-a"), &[]);
    let (status, body) = app.send(Method::GET, "/api/v1/summary", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["num_books"], 2);
    assert_eq!(body["num_books_matching"], 1);
    assert_eq!(body["num_instances"], 2);
    assert_eq!(body["num_instances_available"], 1);
    assert_eq!(body["num_instances_overdue"], 1);
    assert_eq!(body["num_visits"], 1);

    let (_, body) = app.send(Method::GET, "/api/v1/summary", Some(&session), None).await;
    assert_eq!(body["num_visits"], 2);

    let other = token(3, Some("session-b"), &[]);
    let (_, body) = app
        .send(Method::GET, "/api/v1/summary?title_contains=dream", Some(&other), None)
        .await;
    assert_eq!(body["num_visits"], 1);
    assert_eq!(body["title_filter"], "dream");
    assert_eq!(body["num_books_matching"], 1);
}

#[tokio::test]
async fn test_catalog_management() {
    let app = TestApp::new();
    let staff = token(
        2,
        None,
        &[
            Capability::AddAuthor,
            Capability::DeleteAuthor,
            Capability::AddBook,
            Capability::DeleteBook,
            Capability::AddBookInstance,
        ],
    );

    let (status, author) = app
        .send(
            Method::POST,
            "/api/v1/authors",
            Some(&staff),
            Some(json!({ "first_name": "J. G.", "last_name": "Ballard", "date_of_birth": "1930-11-15" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&staff),
            Some(json!({
                "title": "The Crystal World",
                "author_id": author["id"],
                "isbn": "9780007221929"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/books",
            Some(&staff),
            Some(json!({ "title": "Duplicate", "isbn": "9780007221929" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
    assert_eq!(body["retryable"], false);

    let (status, copy) = app
        .send(
            Method::POST,
            "/api/v1/book-instances",
            Some(&staff),
            Some(json!({ "book_id": book["id"], "imprint": "Cape, 1966" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["status"], "maintenance");

    let book_uri = format!("/api/v1/books/{}", book["id"]);
    let (status, details) = app.send(Method::GET, &book_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["author"]["last_name"], "Ballard");
    assert_eq!(details["copies"].as_array().map(Vec::len), Some(1));

    let (status, _) = app.send(Method::DELETE, &book_uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/authors/{}", author["id"]), Some(&staff), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, details) = app.send(Method::GET, &book_uri, None, None).await;
    assert_eq!(details["book"]["author_id"], Value::Null);
    assert_eq!(details["author"], Value::Null);

    let (status, _) = app.send(Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, page) = app.send(Method::GET, "/api/v1/books", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}
