#![allow(dead_code)]
use std::{env, sync::Arc};

use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use http_body_util::BodyExt;
use lifeline_backend::{
    app::build_router,
    config::Config,
    models::{
        account::{Account, AccountKind, AccountProfile, BloodType},
        caller::{Caller, CallerRole},
        lifecycle::LifecycleState,
    },
    repositories::InMemoryAccountRepository,
    state::AppState,
    types::OperatorId,
    utils::jwt::create_access_token,
};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub const TEST_SECRET: &str = "lifeline-test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: None,
        db_max_connections: 2,
        jwt_secret: TEST_SECRET.into(),
        jwt_expiration_hours: 1,
        time_zone: chrono_tz::Africa::Cairo,
        bind_addr: "127.0.0.1:0".into(),
        cors_allow_origins: Vec::new(),
    }
}

/// Full router over a fresh in-memory store, plus a handle to that store
/// for seeding.
pub fn test_app() -> (Router, Arc<InMemoryAccountRepository>) {
    let repository = Arc::new(InMemoryAccountRepository::new());
    let state = AppState::new(repository.clone(), test_config());
    (build_router(state), repository)
}

pub fn caller_with_token(role: CallerRole) -> (Caller, String) {
    let caller = Caller::new(OperatorId::new(), role);
    let token = create_access_token(caller.id, role, TEST_SECRET, 1).expect("create token");
    (caller, token)
}

pub fn profile(name: &str) -> AccountProfile {
    AccountProfile {
        display_name: name.to_string(),
        email: Some(format!("{}@example.org", name.to_lowercase().replace(' ', "."))),
        phone: Some("+20 100 555 0101".into()),
        blood_type: Some(BloodType::APos),
        location_id: Some("cairo".into()),
        avatar_url: None,
    }
}

pub fn account_in(state: LifecycleState, is_active: bool) -> Account {
    let mut account = Account::new(AccountKind::Donor, profile("Nour"), Utc::now());
    account.lifecycle_state = state;
    account.is_active = is_active;
    account
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn send_json(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pool for PostgreSQL-backed tests; `None` when `TEST_DATABASE_URL` is unset.
pub async fn test_pool() -> Option<PgPool> {
    let url = env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}
