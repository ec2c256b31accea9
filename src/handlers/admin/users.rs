use axum::extract::State;

use crate::guard::RequireSuperAdmin;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::UserRow;

/// GET /api/admin/users - all users across practices.
pub async fn list(
    State(state): State<AppState>,
    RequireSuperAdmin(_principal): RequireSuperAdmin,
) -> ApiResult<Vec<UserRow>> {
    let users = state.store.users().await?;
    Ok(ApiResponse::success(users))
}
