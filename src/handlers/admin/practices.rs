use axum::extract::{Path, State};
use uuid::Uuid;

use crate::guard::RequireSuperAdmin;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::PracticeRow;

/// GET /api/admin/practices - every practice, soft-deleted ones included.
pub async fn list(
    State(state): State<AppState>,
    RequireSuperAdmin(_principal): RequireSuperAdmin,
) -> ApiResult<Vec<PracticeRow>> {
    let practices = state.store.practices().await?;
    Ok(ApiResponse::success(practices))
}

/// POST /api/admin/practices/:practice_id/restore
///
/// Clears a practice's soft delete. This is the one operation that acts on
/// an unavailable tenant, which is why it lives on the admin surface instead
/// of behind the tenant guard.
pub async fn restore(
    State(state): State<AppState>,
    RequireSuperAdmin(principal): RequireSuperAdmin,
    Path(practice_id): Path<Uuid>,
) -> ApiResult<PracticeRow> {
    let practice = state.store.restore_practice(practice_id).await?;
    tracing::info!(
        "practice {} restored by super admin {}",
        practice.id,
        principal.user_id
    );
    Ok(ApiResponse::success(practice))
}
