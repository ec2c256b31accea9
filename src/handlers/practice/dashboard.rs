use std::time::Duration;

use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

use crate::cache;
use crate::config;
use crate::guard::AccessGrant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::DashboardCounts;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub team_members: i64,
    pub active_goals: i64,
    pub workflows: i64,
    pub documents: i64,
    pub open_tasks: i64,
    pub today_appointments: i64,
    pub team_members_trend: i64,
    pub goals_trend: i64,
    pub workflows_trend: i64,
    pub documents_trend: i64,
}

impl From<DashboardCounts> for DashboardStats {
    fn from(c: DashboardCounts) -> Self {
        Self {
            team_members_trend: trend(c.team_members, c.prev_team_members),
            goals_trend: trend(c.active_goals, c.prev_active_goals),
            workflows_trend: trend(c.workflows, c.prev_workflows),
            documents_trend: trend(c.documents, c.prev_documents),
            team_members: c.team_members,
            active_goals: c.active_goals,
            workflows: c.workflows,
            documents: c.documents,
            open_tasks: c.open_tasks,
            today_appointments: c.today_appointments,
        }
    }
}

/// Week-over-week change in percent.
fn trend(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        return 0;
    }
    (((current - previous) as f64 / previous as f64) * 100.0).round() as i64
}

/// GET /api/practices/:practice_id/dashboard-stats
///
/// Served cache-aside: the aggregate battery is expensive and the dashboard
/// polls, so results are held for a short TTL per practice.
pub async fn dashboard_stats(State(state): State<AppState>, grant: AccessGrant) -> ApiResult<Value> {
    let ttl = Duration::from_secs(config::config().cache.dashboard_ttl_secs);
    let repo = grant.repo();

    let stats = cache::get_or_compute(
        state.cache.as_ref(),
        grant.practice_id(),
        "dashboard-stats",
        ttl,
        move || async move {
            let counts = repo.dashboard_counts().await?;
            let stats = DashboardStats::from(counts);
            serde_json::to_value(stats).map_err(|e| {
                tracing::error!("failed to serialize dashboard stats: {}", e);
                crate::error::ApiError::Upstream(e.to_string())
            })
        },
    )
    .await?;

    Ok(ApiResponse::success(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_is_zero_without_baseline() {
        assert_eq!(trend(10, 0), 0);
    }

    #[test]
    fn trend_rounds_percent_change() {
        assert_eq!(trend(12, 10), 20);
        assert_eq!(trend(9, 10), -10);
        assert_eq!(trend(10, 3), 233);
    }

    #[test]
    fn stats_carry_trends_from_counts() {
        let stats = DashboardStats::from(DashboardCounts {
            team_members: 6,
            prev_team_members: 5,
            active_goals: 4,
            prev_active_goals: 4,
            ..Default::default()
        });
        assert_eq!(stats.team_members_trend, 20);
        assert_eq!(stats.goals_trend, 0);
        assert_eq!(stats.team_members, 6);
    }
}
