use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::config;

use super::{
    BadgeCounts, DashboardCounts, NewTeamMember, PracticeRow, PracticeStore, StoreError,
    TeamMember, TeamMemberPatch, UserRow,
};

/// Postgres-backed store. The database also carries row-level policies, but
/// every query here still binds the practice id itself - this layer is the
/// defense above any database-level policy, not a delegate to it.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str, practice_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(sql)
            .bind(practice_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl PracticeStore for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn practice(&self, id: Uuid) -> Result<Option<PracticeRow>, StoreError> {
        let row = sqlx::query_as::<_, PracticeRow>(
            "SELECT id, name, created_at, deleted_at FROM practices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn practices(&self) -> Result<Vec<PracticeRow>, StoreError> {
        let rows = sqlx::query_as::<_, PracticeRow>(
            "SELECT id, name, created_at, deleted_at FROM practices ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn restore_practice(&self, id: Uuid) -> Result<PracticeRow, StoreError> {
        let row = sqlx::query_as::<_, PracticeRow>(
            r#"
            UPDATE practices SET deleted_at = NULL
            WHERE id = $1
            RETURNING id, name, created_at, deleted_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::NotFound(format!("practice {}", id)))
    }

    async fn user(&self, id: Uuid) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, practice_id, is_active, password_hash, created_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, practice_id, is_active, password_hash, created_at
            FROM users WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn users(&self) -> Result<Vec<UserRow>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, practice_id, is_active, password_hash, created_at
            FROM users ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn dashboard_counts(&self, practice_id: Uuid) -> Result<DashboardCounts, StoreError> {
        // One round trip per aggregate, issued concurrently. Mirrors the set
        // of widgets on the practice dashboard.
        let (
            team_members,
            active_goals,
            workflows,
            documents,
            open_tasks,
            today_appointments,
            prev_team_members,
            prev_active_goals,
            prev_workflows,
            prev_documents,
        ) = tokio::try_join!(
            self.count(
                "SELECT COUNT(*) FROM team_members WHERE practice_id = $1 AND status = 'active' AND deleted_at IS NULL",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM goals WHERE practice_id = $1 AND status = 'active'",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM workflows WHERE practice_id = $1 AND status IN ('active', 'in_progress')",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM documents WHERE practice_id = $1 AND deleted_at IS NULL",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM todos WHERE practice_id = $1 AND completed = FALSE",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM calendar_events WHERE practice_id = $1 AND start_date = CURRENT_DATE",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM team_members WHERE practice_id = $1 AND status = 'active' AND deleted_at IS NULL AND created_at <= NOW() - INTERVAL '7 days'",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM goals WHERE practice_id = $1 AND created_at <= NOW() - INTERVAL '7 days'",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM workflows WHERE practice_id = $1 AND created_at <= NOW() - INTERVAL '7 days'",
                practice_id
            ),
            self.count(
                "SELECT COUNT(*) FROM documents WHERE practice_id = $1 AND created_at <= NOW() - INTERVAL '7 days'",
                practice_id
            ),
        )?;

        Ok(DashboardCounts {
            team_members,
            active_goals,
            workflows,
            documents,
            open_tasks,
            today_appointments,
            prev_team_members,
            prev_active_goals,
            prev_workflows,
            prev_documents,
        })
    }

    async fn badge_counts(&self, practice_id: Uuid) -> Result<BadgeCounts, StoreError> {
        let (tasks, goals, workflows, candidates, tickets, team_members, documents, calendar) =
            tokio::try_join!(
                self.count(
                    "SELECT COUNT(*) FROM todos WHERE practice_id = $1 AND completed = FALSE",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM goals WHERE practice_id = $1 AND status NOT IN ('completed', 'cancelled')",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM workflows WHERE practice_id = $1 AND status = 'active'",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM candidates WHERE practice_id = $1 AND status <> 'archived'",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM tickets WHERE practice_id = $1 AND status NOT IN ('resolved', 'closed')",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM team_members WHERE practice_id = $1 AND status = 'active' AND deleted_at IS NULL",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM documents WHERE practice_id = $1 AND deleted_at IS NULL",
                    practice_id
                ),
                self.count(
                    "SELECT COUNT(*) FROM calendar_events WHERE practice_id = $1 AND start_date = CURRENT_DATE",
                    practice_id
                ),
            )?;

        Ok(BadgeCounts {
            tasks,
            goals,
            workflows,
            candidates,
            tickets,
            team_members,
            documents,
            calendar,
        })
    }

    async fn team_members(&self, practice_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let rows = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, practice_id, user_id, first_name, last_name, role, status, created_at, deleted_at
            FROM team_members
            WHERE practice_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(practice_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError> {
        // The practice id is bound even though the primary key is unique;
        // a guessed key from another practice must come back empty.
        let row = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, practice_id, user_id, first_name, last_name, role, status, created_at, deleted_at
            FROM team_members
            WHERE id = $1 AND practice_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(practice_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_team_member(
        &self,
        practice_id: Uuid,
        new: NewTeamMember,
    ) -> Result<TeamMember, StoreError> {
        let row = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (id, practice_id, user_id, first_name, last_name, role, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', NOW())
            RETURNING id, practice_id, user_id, first_name, last_name, role, status, created_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(practice_id)
        .bind(new.user_id)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
        patch: TeamMemberPatch,
    ) -> Result<Option<TeamMember>, StoreError> {
        let row = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members SET
                first_name = COALESCE($3, first_name),
                last_name  = COALESCE($4, last_name),
                role       = COALESCE($5, role),
                status     = COALESCE($6, status)
            WHERE id = $1 AND practice_id = $2 AND deleted_at IS NULL
            RETURNING id, practice_id, user_id, first_name, last_name, role, status, created_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(practice_id)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.role)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn soft_delete_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE team_members SET deleted_at = NOW() WHERE id = $1 AND practice_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(practice_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn restore_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError> {
        let row = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members SET deleted_at = NULL
            WHERE id = $1 AND practice_id = $2
            RETURNING id, practice_id, user_id, first_name, last_name, role, status, created_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(practice_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
