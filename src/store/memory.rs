use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    BadgeCounts, DashboardCounts, NewTeamMember, PracticeRow, PracticeStore, StoreError,
    TeamMember, TeamMemberPatch, UserRow,
};

#[derive(Default)]
struct Tables {
    practices: HashMap<Uuid, PracticeRow>,
    users: HashMap<Uuid, UserRow>,
    team_members: HashMap<Uuid, TeamMember>,
    dashboard: HashMap<Uuid, DashboardCounts>,
    badges: HashMap<Uuid, BadgeCounts>,
}

/// In-process store used by the test suite and local demos. Aggregate reads
/// are counted so cache-aside behavior can be observed from the outside.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    aggregate_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times an aggregate (dashboard/badge) query hit the store.
    pub fn aggregate_query_count(&self) -> usize {
        self.aggregate_queries.load(Ordering::SeqCst)
    }

    pub fn seed_practice(&self, name: &str) -> Uuid {
        let row = PracticeRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        let id = row.id;
        self.tables.write().unwrap().practices.insert(id, row);
        id
    }

    pub fn soft_delete_practice(&self, id: Uuid) {
        if let Some(p) = self.tables.write().unwrap().practices.get_mut(&id) {
            p.deleted_at = Some(Utc::now());
        }
    }

    pub fn seed_user(
        &self,
        email: &str,
        name: &str,
        role: Option<&str>,
        practice_id: Option<Uuid>,
        is_active: bool,
        password_hash: Option<String>,
    ) -> Uuid {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.map(str::to_string),
            practice_id,
            is_active,
            password_hash,
            created_at: Utc::now(),
        };
        let id = row.id;
        self.tables.write().unwrap().users.insert(id, row);
        id
    }

    pub fn seed_dashboard_counts(&self, practice_id: Uuid, counts: DashboardCounts) {
        self.tables
            .write()
            .unwrap()
            .dashboard
            .insert(practice_id, counts);
    }

    pub fn seed_badge_counts(&self, practice_id: Uuid, counts: BadgeCounts) {
        self.tables
            .write()
            .unwrap()
            .badges
            .insert(practice_id, counts);
    }
}

#[async_trait]
impl PracticeStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn practice(&self, id: Uuid) -> Result<Option<PracticeRow>, StoreError> {
        Ok(self.tables.read().unwrap().practices.get(&id).cloned())
    }

    async fn practices(&self) -> Result<Vec<PracticeRow>, StoreError> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .unwrap()
            .practices
            .values()
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.created_at);
        Ok(rows)
    }

    async fn restore_practice(&self, id: Uuid) -> Result<PracticeRow, StoreError> {
        let mut tables = self.tables.write().unwrap();
        match tables.practices.get_mut(&id) {
            Some(p) => {
                p.deleted_at = None;
                Ok(p.clone())
            }
            None => Err(StoreError::NotFound(format!("practice {}", id))),
        }
    }

    async fn user(&self, id: Uuid) -> Result<Option<UserRow>, StoreError> {
        Ok(self.tables.read().unwrap().users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn users(&self) -> Result<Vec<UserRow>, StoreError> {
        let mut rows: Vec<_> = self.tables.read().unwrap().users.values().cloned().collect();
        rows.sort_by_key(|u| u.created_at);
        Ok(rows)
    }

    async fn dashboard_counts(&self, practice_id: Uuid) -> Result<DashboardCounts, StoreError> {
        self.aggregate_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tables
            .read()
            .unwrap()
            .dashboard
            .get(&practice_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn badge_counts(&self, practice_id: Uuid) -> Result<BadgeCounts, StoreError> {
        self.aggregate_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tables
            .read()
            .unwrap()
            .badges
            .get(&practice_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn team_members(&self, practice_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .unwrap()
            .team_members
            .values()
            .filter(|m| m.practice_id == practice_id && m.deleted_at.is_none())
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .team_members
            .get(&id)
            .filter(|m| m.practice_id == practice_id && m.deleted_at.is_none())
            .cloned())
    }

    async fn insert_team_member(
        &self,
        practice_id: Uuid,
        new: NewTeamMember,
    ) -> Result<TeamMember, StoreError> {
        let row = TeamMember {
            id: Uuid::new_v4(),
            practice_id,
            user_id: new.user_id,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            status: "active".to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.tables
            .write()
            .unwrap()
            .team_members
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
        patch: TeamMemberPatch,
    ) -> Result<Option<TeamMember>, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let member = tables
            .team_members
            .get_mut(&id)
            .filter(|m| m.practice_id == practice_id && m.deleted_at.is_none());

        Ok(member.map(|m| {
            if let Some(v) = patch.first_name {
                m.first_name = v;
            }
            if let Some(v) = patch.last_name {
                m.last_name = v;
            }
            if let Some(v) = patch.role {
                m.role = Some(v);
            }
            if let Some(v) = patch.status {
                m.status = v;
            }
            m.clone()
        }))
    }

    async fn soft_delete_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let member = tables
            .team_members
            .get_mut(&id)
            .filter(|m| m.practice_id == practice_id && m.deleted_at.is_none());

        Ok(match member {
            Some(m) => {
                m.deleted_at = Some(Utc::now());
                true
            }
            None => false,
        })
    }

    async fn restore_team_member(
        &self,
        practice_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TeamMember>, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let member = tables
            .team_members
            .get_mut(&id)
            .filter(|m| m.practice_id == practice_id);

        Ok(member.map(|m| {
            m.deleted_at = None;
            m.clone()
        }))
    }
}
