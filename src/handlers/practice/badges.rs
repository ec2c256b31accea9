use std::time::Duration;

use axum::extract::State;
use serde_json::Value;

use crate::cache;
use crate::config;
use crate::error::ApiError;
use crate::guard::AccessGrant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/practices/:practice_id/sidebar-badges
///
/// Open-item counts for the sidebar navigation, cache-aside per practice.
pub async fn sidebar_badges(State(state): State<AppState>, grant: AccessGrant) -> ApiResult<Value> {
    let ttl = Duration::from_secs(config::config().cache.badges_ttl_secs);
    let repo = grant.repo();

    let badges = cache::get_or_compute(
        state.cache.as_ref(),
        grant.practice_id(),
        "sidebar-badges",
        ttl,
        move || async move {
            let counts = repo.badge_counts().await?;
            serde_json::to_value(counts).map_err(|e| {
                tracing::error!("failed to serialize badge counts: {}", e);
                ApiError::Upstream(e.to_string())
            })
        },
    )
    .await?;

    Ok(ApiResponse::success(badges))
}
