use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Panel, PanelPatch, Role, UserRecord};

/// Persistence operations for users and panels.
///
/// Every method is atomic for the single record it touches; nothing here
/// spans records in a transaction. Callers that need several writes (user
/// removal) issue them one by one, each safe to repeat.
#[async_trait]
pub trait Store: Send + Sync {
    async fn count_users(&self) -> Result<i64, DatabaseError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    /// Users whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserRecord>, DatabaseError>;

    /// All users in registration order.
    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError>;

    /// Insert `user` and return the role actually stored.
    ///
    /// The first user ever stored is saved as `Admin` whatever `user.role`
    /// says; the emptiness check and the insert are one atomic step.
    /// Fails with `UniqueViolation` when the email is taken.
    async fn insert_user(&self, user: &UserRecord) -> Result<Role, DatabaseError>;

    async fn update_user_role(&self, id: Uuid, role: Role) -> Result<Option<UserRecord>, DatabaseError>;

    /// Returns whether a user was removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Panels in creation order; `owner` restricts to panels assigned to that user.
    async fn list_panels(&self, owner: Option<Uuid>) -> Result<Vec<Panel>, DatabaseError>;

    async fn find_panel(&self, id: Uuid) -> Result<Option<Panel>, DatabaseError>;

    async fn insert_panel(&self, panel: &Panel) -> Result<(), DatabaseError>;

    async fn update_panel(&self, id: Uuid, patch: &PanelPatch) -> Result<Option<Panel>, DatabaseError>;

    async fn set_panel_owner(&self, id: Uuid, owner: Option<Uuid>) -> Result<Option<Panel>, DatabaseError>;

    /// Unassign every panel owned by `owner`; returns how many changed.
    async fn clear_panel_owner(&self, owner: Uuid) -> Result<u64, DatabaseError>;

    async fn delete_panel(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self) {}
}
