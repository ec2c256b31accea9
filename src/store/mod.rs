use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A practice (tenant). Soft-deleted practices keep their row with
/// `deleted_at` set and are invisible to everything but admin operations.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PracticeRow {
    pub fn is_available(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Option<String>,
    pub practice_id: Option<Uuid>,
    pub is_active: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub practice_id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMember {
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// Raw counts behind the dashboard endpoint. The `prev_*` columns are the
/// same counts restricted to rows at least a week old, used for trends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub team_members: i64,
    pub active_goals: i64,
    pub workflows: i64,
    pub documents: i64,
    pub open_tasks: i64,
    pub today_appointments: i64,
    pub prev_team_members: i64,
    pub prev_active_goals: i64,
    pub prev_workflows: i64,
    pub prev_documents: i64,
}

/// Open-item counts shown next to sidebar navigation entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCounts {
    pub tasks: i64,
    pub goals: i64,
    pub workflows: i64,
    pub candidates: i64,
    pub tickets: i64,
    pub team_members: i64,
    pub documents: i64,
    pub calendar: i64,
}

/// The relational backend, behind a trait so tests and local demos can run
/// against an in-memory implementation. Every practice-scoped method takes
/// the practice id explicitly and implementations must filter by it - callers
/// never get a row from another practice back, even with a valid primary key.
#[async_trait]
pub trait PracticeStore: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn practice(&self, id: Uuid) -> Result<Option<PracticeRow>, StoreError>;
    /// All practices, soft-deleted included. Admin surface only.
    async fn practices(&self) -> Result<Vec<PracticeRow>, StoreError>;
    async fn restore_practice(&self, id: Uuid) -> Result<PracticeRow, StoreError>;

    async fn user(&self, id: Uuid) -> Result<Option<UserRow>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError>;
    /// All users across practices. Admin surface only.
    async fn users(&self) -> Result<Vec<UserRow>, StoreError>;

    async fn dashboard_counts(&self, practice_id: Uuid) -> Result<DashboardCounts, StoreError>;
    async fn badge_counts(&self, practice_id: Uuid) -> Result<BadgeCounts, StoreError>;

    async fn team_members(&self, practice_id: Uuid) -> Result<Vec<TeamMember>, StoreError>;
    async fn team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError>;
    async fn insert_team_member(
        &self,
        practice_id: Uuid,
        new: NewTeamMember,
    ) -> Result<TeamMember, StoreError>;
    async fn update_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
        patch: TeamMemberPatch,
    ) -> Result<Option<TeamMember>, StoreError>;
    async fn soft_delete_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<bool, StoreError>;
    async fn restore_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError>;
}
