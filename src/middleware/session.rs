use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Principal, Tier};
use crate::error::ApiError;
use crate::state::AppState;

/// Session middleware: verifies the bearer token, re-reads the user record,
/// and injects a [`Principal`] into the request.
///
/// Only the token subject is trusted. Role and practice membership come from
/// the current user row, so a role change or deactivation takes effect on
/// the next request, not at token expiry.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;

    let claims = auth::verify_token(&token)
        .map_err(|e| ApiError::unauthenticated(e.to_string()))?;

    let user = state
        .store
        .user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthenticated(format!("no user record for {}", claims.sub)))?;

    if !user.is_active {
        tracing::warn!("rejected request from deactivated user {}", user.id);
        return Err(ApiError::Forbidden);
    }

    let principal = Principal {
        user_id: user.id,
        email: user.email,
        name: user.name,
        tier: Tier::classify(user.role.as_deref()),
        practice_id: user.practice_id,
    };

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthenticated("missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("invalid Authorization header encoding"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthenticated("empty bearer token")),
        None => Err(ApiError::unauthenticated(
            "Authorization header must use Bearer token format",
        )),
    }
}
