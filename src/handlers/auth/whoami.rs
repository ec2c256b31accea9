use axum::Extension;
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/whoami - echo the principal resolved for this request.
pub async fn whoami(Extension(principal): Extension<Principal>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": principal.user_id,
        "email": principal.email,
        "name": principal.name,
        "tier": principal.tier,
        "practiceId": principal.practice_id,
    })))
}
