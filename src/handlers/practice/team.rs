use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::{self, CacheStore};
use crate::error::ApiError;
use crate::guard::AccessGrant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::{NewTeamMember, TeamMember, TeamMemberPatch};

#[derive(Debug, Deserialize)]
pub struct MemberPath {
    #[allow(dead_code)]
    pub practice_id: Uuid,
    pub id: Uuid,
}

/// GET /api/practices/:practice_id/team-members
pub async fn list(grant: AccessGrant) -> ApiResult<Vec<TeamMember>> {
    let members = grant.repo().team_members().await?;
    Ok(ApiResponse::success(members))
}

/// POST /api/practices/:practice_id/team-members
pub async fn create(
    State(state): State<AppState>,
    grant: AccessGrant,
    Json(body): Json<NewTeamMember>,
) -> ApiResult<TeamMember> {
    grant.require_admin()?;

    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(ApiError::invalid("first and last name are required"));
    }

    let member = grant.repo().insert_team_member(body).await?;
    invalidate_aggregates(state.cache.as_ref(), grant.practice_id()).await;
    Ok(ApiResponse::created(member))
}

/// GET /api/practices/:practice_id/team-members/:id
pub async fn get(grant: AccessGrant, Path(path): Path<MemberPath>) -> ApiResult<TeamMember> {
    let member = grant
        .repo()
        .team_member(path.id)
        .await?
        .ok_or_else(|| ApiError::not_found("team member"))?;
    Ok(ApiResponse::success(member))
}

/// PATCH /api/practices/:practice_id/team-members/:id
pub async fn update(
    State(state): State<AppState>,
    grant: AccessGrant,
    Path(path): Path<MemberPath>,
    Json(patch): Json<TeamMemberPatch>,
) -> ApiResult<TeamMember> {
    grant.require_admin()?;

    let member = grant
        .repo()
        .update_team_member(path.id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("team member"))?;
    invalidate_aggregates(state.cache.as_ref(), grant.practice_id()).await;
    Ok(ApiResponse::success(member))
}

/// DELETE /api/practices/:practice_id/team-members/:id - soft delete
pub async fn remove(
    State(state): State<AppState>,
    grant: AccessGrant,
    Path(path): Path<MemberPath>,
) -> ApiResult<()> {
    grant.require_admin()?;

    if !grant.repo().soft_delete_team_member(path.id).await? {
        return Err(ApiError::not_found("team member"));
    }
    invalidate_aggregates(state.cache.as_ref(), grant.practice_id()).await;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/practices/:practice_id/team-members/:id/restore
pub async fn restore(
    State(state): State<AppState>,
    grant: AccessGrant,
    Path(path): Path<MemberPath>,
) -> ApiResult<TeamMember> {
    grant.require_admin()?;

    let member = grant
        .repo()
        .restore_team_member(path.id)
        .await?
        .ok_or_else(|| ApiError::not_found("team member"))?;
    invalidate_aggregates(state.cache.as_ref(), grant.practice_id()).await;
    Ok(ApiResponse::success(member))
}

/// Team mutations change the dashboard and badge aggregates, so their
/// cached entries are dropped eagerly instead of waiting out the TTL.
async fn invalidate_aggregates(cache: &dyn CacheStore, practice_id: Uuid) {
    cache
        .invalidate(&cache::cache_key(practice_id, "dashboard-stats"))
        .await;
    cache
        .invalidate(&cache::cache_key(practice_id, "sidebar-badges"))
        .await;
}
