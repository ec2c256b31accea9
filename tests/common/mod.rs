#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use praxis_api::auth;
use praxis_api::cache::MemoryCache;
use praxis_api::state::AppState;
use praxis_api::store::MemoryStore;

pub const PASSWORD: &str = "geheim123";

/// In-process app over a seeded memory store: two active practices, one
/// soft-deleted practice, and one user per interesting role/tier.
pub struct Fixture {
    pub app: Router,
    pub store: Arc<MemoryStore>,

    pub practice_a: Uuid,
    pub practice_b: Uuid,
    pub practice_deleted: Uuid,

    pub member_a: Uuid,
    pub admin_a: Uuid,
    pub member_deleted: Uuid,
    pub super_admin: Uuid,
    pub legacy_super_admin: Uuid,
    pub inactive_a: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let practice_a = store.seed_practice("Praxis Dr. Weber");
        let practice_b = store.seed_practice("Zahnarztpraxis Schmidt");
        let practice_deleted = store.seed_practice("Geschlossene Praxis");
        store.soft_delete_practice(practice_deleted);

        let hash = Some(auth::password_digest(PASSWORD));
        let member_a = store.seed_user(
            "anna@praxis-weber.de",
            "Anna Becker",
            Some("member"),
            Some(practice_a),
            true,
            hash.clone(),
        );
        let admin_a = store.seed_user(
            "weber@praxis-weber.de",
            "Dr. Weber",
            Some("practice_admin"),
            Some(practice_a),
            true,
            hash.clone(),
        );
        let member_deleted = store.seed_user(
            "alt@geschlossene-praxis.de",
            "Alte Praxis Nutzerin",
            Some("member"),
            Some(practice_deleted),
            true,
            hash.clone(),
        );
        let super_admin = store.seed_user(
            "root@effizienz-praxis.de",
            "Plattform Admin",
            Some("super_admin"),
            Some(practice_a),
            true,
            hash.clone(),
        );
        // Historical role spelling that must classify identically
        let legacy_super_admin = store.seed_user(
            "legacy@effizienz-praxis.de",
            "Legacy Admin",
            Some("superadmin"),
            None,
            true,
            hash.clone(),
        );
        let inactive_a = store.seed_user(
            "weg@praxis-weber.de",
            "Ehemalige Mitarbeiterin",
            Some("member"),
            Some(practice_a),
            false,
            hash,
        );

        let state = AppState::new(store.clone(), Arc::new(MemoryCache::new()));
        let app = praxis_api::app(state);

        Self {
            app,
            store,
            practice_a,
            practice_b,
            practice_deleted,
            member_a,
            admin_a,
            member_deleted,
            super_admin,
            legacy_super_admin,
            inactive_a,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        auth::issue_token(user_id).expect("issue token")
    }
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(app, Method::GET, uri, token, None).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    request(app, Method::POST, uri, token, body).await
}

pub async fn patch(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(app, Method::DELETE, uri, token, None).await
}
