use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, Tier};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: Value,
}

/// POST /auth/login - exchange credentials for a session token.
///
/// Unknown email and wrong password produce the same response, and a
/// deactivated account is rejected even with correct credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::invalid("email and password are required"));
    }

    let user = state
        .store
        .user_by_email(body.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthenticated("unknown credentials"))?;

    let digest = auth::password_digest(&body.password);
    match &user.password_hash {
        Some(stored) if *stored == digest => {}
        _ => return Err(ApiError::unauthenticated("unknown credentials")),
    }

    if !user.is_active {
        tracing::warn!("login rejected for deactivated user {}", user.id);
        return Err(ApiError::Forbidden);
    }

    let token = auth::issue_token(user.id).map_err(|e| {
        tracing::error!("token issuance failed: {}", e);
        ApiError::Upstream(e.to_string())
    })?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: user_summary(user.id, &user.email, &user.name, user.role.as_deref(), user.practice_id),
    }))
}

fn user_summary(
    id: Uuid,
    email: &str,
    name: &str,
    role: Option<&str>,
    practice_id: Option<Uuid>,
) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": name,
        "tier": Tier::classify(role),
        "practiceId": practice_id,
    })
}
