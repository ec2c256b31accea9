//! Tenant-access guard. Every practice-scoped handler goes through
//! [`AccessGrant`]; there is no other way to reach practice data, which is
//! the invariant that keeps tenants isolated from each other.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::{Principal, Tier};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{
    BadgeCounts, DashboardCounts, NewTeamMember, PracticeRow, PracticeStore, TeamMember,
    TeamMemberPatch,
};

/// Data-access handle pinned to one practice. Every call forwards the
/// practice id, so a handler holding this cannot address another tenant's
/// rows even with a guessed primary key.
#[derive(Clone)]
pub struct ScopedRepo {
    store: Arc<dyn PracticeStore>,
    practice_id: Uuid,
}

impl std::fmt::Debug for ScopedRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedRepo")
            .field("practice_id", &self.practice_id)
            .finish_non_exhaustive()
    }
}

impl ScopedRepo {
    pub fn practice_id(&self) -> Uuid {
        self.practice_id
    }

    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, ApiError> {
        Ok(self.store.dashboard_counts(self.practice_id).await?)
    }

    pub async fn badge_counts(&self) -> Result<BadgeCounts, ApiError> {
        Ok(self.store.badge_counts(self.practice_id).await?)
    }

    pub async fn team_members(&self) -> Result<Vec<TeamMember>, ApiError> {
        Ok(self.store.team_members(self.practice_id).await?)
    }

    pub async fn team_member(&self, id: Uuid) -> Result<Option<TeamMember>, ApiError> {
        Ok(self.store.team_member(self.practice_id, id).await?)
    }

    pub async fn insert_team_member(&self, new: NewTeamMember) -> Result<TeamMember, ApiError> {
        Ok(self.store.insert_team_member(self.practice_id, new).await?)
    }

    pub async fn update_team_member(
        &self,
        id: Uuid,
        patch: TeamMemberPatch,
    ) -> Result<Option<TeamMember>, ApiError> {
        Ok(self
            .store
            .update_team_member(self.practice_id, id, patch)
            .await?)
    }

    pub async fn soft_delete_team_member(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self
            .store
            .soft_delete_team_member(self.practice_id, id)
            .await?)
    }

    pub async fn restore_team_member(&self, id: Uuid) -> Result<Option<TeamMember>, ApiError> {
        Ok(self.store.restore_team_member(self.practice_id, id).await?)
    }
}

/// Proof that the guard ran: principal, validated practice and capability
/// tier, plus the scoped data handle. Constructed only by [`authorize`].
#[derive(Debug)]
pub struct AccessGrant {
    pub principal: Principal,
    pub practice: PracticeRow,
    pub tier: Tier,
    repo: ScopedRepo,
}

impl AccessGrant {
    pub fn practice_id(&self) -> Uuid {
        self.practice.id
    }

    pub fn repo(&self) -> &ScopedRepo {
        &self.repo
    }

    /// Mutating operations need at least practice-admin tier.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.tier.at_least(Tier::PracticeAdmin) {
            Ok(())
        } else {
            tracing::warn!(
                "member {} attempted an admin operation on practice {}",
                self.principal.user_id,
                self.practice.id
            );
            Err(ApiError::Forbidden)
        }
    }
}

/// Decide whether `principal` may act on `practice_id`.
///
/// Super admins cross the tenant boundary by design; everyone else must be
/// requesting their own practice, and that check runs before the practice
/// lookup so a mismatch costs no database round trip. A soft-deleted or
/// unknown practice is unavailable for every tier - admin restore lives on
/// the unscoped admin routes, not here.
pub async fn authorize(
    principal: &Principal,
    practice_id: Uuid,
    store: &Arc<dyn PracticeStore>,
) -> Result<AccessGrant, ApiError> {
    if !principal.tier.is_super_admin() && principal.practice_id != Some(practice_id) {
        tracing::warn!(
            "user {} denied access to practice {}",
            principal.user_id,
            practice_id
        );
        return Err(ApiError::Forbidden);
    }

    let practice = store
        .practice(practice_id)
        .await?
        .filter(PracticeRow::is_available)
        .ok_or(ApiError::TenantUnavailable)?;

    Ok(AccessGrant {
        tier: principal.tier,
        principal: principal.clone(),
        practice,
        repo: ScopedRepo {
            store: store.clone(),
            practice_id,
        },
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AccessGrant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("session required"))?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid("missing practice id"))?;

        let practice_id = params
            .get("practice_id")
            .ok_or_else(|| ApiError::invalid("missing practice id"))
            .and_then(|raw| {
                Uuid::parse_str(raw).map_err(|_| ApiError::invalid("practice id must be a UUID"))
            })?;

        authorize(&principal, practice_id, &state.store).await
    }
}

/// Extractor for the unscoped admin routes: any authenticated principal
/// whose role classifies to super admin.
pub struct RequireSuperAdmin(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("session required"))?;

        if !principal.tier.is_super_admin() {
            tracing::warn!(
                "user {} denied access to admin surface",
                principal.user_id
            );
            return Err(ApiError::Forbidden);
        }

        Ok(RequireSuperAdmin(principal))
    }
}
