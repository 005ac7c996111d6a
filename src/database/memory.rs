use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Panel, PanelPatch, Role, UserRecord};
use crate::database::store::Store;

/// In-process store used by tests and `DATABASE_BACKEND=memory`.
///
/// Records are kept in insertion order. Email uniqueness and the first-user
/// check run under the same write lock as the insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
    panels: RwLock<Vec<Panel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn count_users(&self) -> Result<i64, DatabaseError> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserRecord>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError> {
        Ok(self.users.read().await.clone())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<Role, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation(format!(
                "email '{}' already exists",
                user.email
            )));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(DatabaseError::UniqueViolation(format!("user id {} already exists", user.id)));
        }
        let mut stored = user.clone();
        if users.is_empty() {
            stored.role = Role::Admin;
        }
        let role = stored.role;
        users.push(stored);
        Ok(role)
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> Result<Option<UserRecord>, DatabaseError> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn list_panels(&self, owner: Option<Uuid>) -> Result<Vec<Panel>, DatabaseError> {
        let panels = self.panels.read().await;
        Ok(panels
            .iter()
            .filter(|p| owner.is_none() || p.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn find_panel(&self, id: Uuid) -> Result<Option<Panel>, DatabaseError> {
        Ok(self.panels.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_panel(&self, panel: &Panel) -> Result<(), DatabaseError> {
        let mut panels = self.panels.write().await;
        if panels.iter().any(|p| p.id == panel.id) {
            return Err(DatabaseError::UniqueViolation(format!("panel id {} already exists", panel.id)));
        }
        panels.push(panel.clone());
        Ok(())
    }

    async fn update_panel(&self, id: Uuid, patch: &PanelPatch) -> Result<Option<Panel>, DatabaseError> {
        let mut panels = self.panels.write().await;
        Ok(panels.iter_mut().find(|p| p.id == id).map(|panel| {
            patch.apply(panel);
            panel.clone()
        }))
    }

    async fn set_panel_owner(&self, id: Uuid, owner: Option<Uuid>) -> Result<Option<Panel>, DatabaseError> {
        let mut panels = self.panels.write().await;
        Ok(panels.iter_mut().find(|p| p.id == id).map(|panel| {
            panel.owner_id = owner;
            panel.clone()
        }))
    }

    async fn clear_panel_owner(&self, owner: Uuid) -> Result<u64, DatabaseError> {
        let mut panels = self.panels.write().await;
        let mut cleared = 0;
        for panel in panels.iter_mut().filter(|p| p.owner_id == Some(owner)) {
            panel.owner_id = None;
            cleared += 1;
        }
        Ok(cleared)
    }

    async fn delete_panel(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut panels = self.panels.write().await;
        let before = panels.len();
        panels.retain(|p| p.id != id);
        Ok(panels.len() < before)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
