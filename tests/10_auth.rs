mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::Fixture;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::get(&fx.app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_returns_token_and_tier() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::post(
        &fx.app,
        "/auth/login",
        None,
        Some(json!({ "email": "weber@praxis-weber.de", "password": common::PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["data"]["user"]["tier"], "practice_admin");
    assert_eq!(
        body["data"]["user"]["practiceId"],
        json!(fx.practice_a.to_string())
    );
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthenticated() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::post(
        &fx.app,
        "/auth/login",
        None,
        Some(json!({ "email": "weber@praxis-weber.de", "password": "falsch" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "Unauthenticated");
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_email_matches_wrong_password_response() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::post(
        &fx.app,
        "/auth/login",
        None,
        Some(json!({ "email": "niemand@praxis-weber.de", "password": common::PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "Unauthenticated");
    Ok(())
}

#[tokio::test]
async fn deactivated_user_cannot_login() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::post(
        &fx.app,
        "/auth/login",
        None,
        Some(json!({ "email": "weg@praxis-weber.de", "password": common::PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "Forbidden");
    Ok(())
}

#[tokio::test]
async fn whoami_without_token_is_unauthenticated() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::get(&fx.app, "/api/auth/whoami", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "Unauthenticated");
    Ok(())
}

#[tokio::test]
async fn whoami_with_garbage_token_is_unauthenticated() -> Result<()> {
    let fx = Fixture::new();
    let (status, body) = common::get(&fx.app, "/api/auth/whoami", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["reason"], "Unauthenticated");
    Ok(())
}

#[tokio::test]
async fn whoami_echoes_the_resolved_principal() -> Result<()> {
    let fx = Fixture::new();
    let token = fx.token_for(fx.member_a);
    let (status, body) = common::get(&fx.app, "/api/auth/whoami", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(fx.member_a.to_string()));
    assert_eq!(body["data"]["tier"], "member");
    assert_eq!(
        body["data"]["practiceId"],
        json!(fx.practice_a.to_string())
    );
    Ok(())
}

#[tokio::test]
async fn deactivated_user_with_valid_token_is_rejected() -> Result<()> {
    let fx = Fixture::new();
    let token = fx.token_for(fx.inactive_a);
    let (status, body) = common::get(&fx.app, "/api/auth/whoami", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "Forbidden");
    Ok(())
}
