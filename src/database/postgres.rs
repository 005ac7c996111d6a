use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Panel, PanelPatch, Role, UserRecord};
use crate::database::store::Store;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at";
const PANEL_COLUMNS: &str = "id, model, location, capacity, status, owner_id, created_at";

/// Transaction-scoped advisory lock taken around user inserts.
const REGISTRATION_LOCK_KEY: i64 = 0x736f_6c61_7275;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            role: row.role.parse().map_err(DatabaseError::CorruptRecord)?,
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PanelRow {
    id: Uuid,
    model: String,
    location: String,
    capacity: f64,
    status: String,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PanelRow> for Panel {
    type Error = DatabaseError;

    fn try_from(row: PanelRow) -> Result<Self, Self::Error> {
        Ok(Panel {
            status: row.status.parse().map_err(DatabaseError::CorruptRecord)?,
            id: row.id,
            model: row.model,
            location: row.location,
            capacity: row.capacity,
            owner_id: row.owner_id,
            created_at: row.created_at,
        })
    }
}

fn users_from_rows(rows: Vec<UserRow>) -> Result<Vec<UserRecord>, DatabaseError> {
    rows.into_iter().map(UserRecord::try_from).collect()
}

fn panels_from_rows(rows: Vec<PanelRow>) -> Result<Vec<Panel>, DatabaseError> {
    rows.into_iter().map(Panel::try_from).collect()
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn count_users(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserRecord>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        users_from_rows(rows)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        users_from_rows(rows)
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<Role, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Serialise registrations so only one of them can see an empty table
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let has_users: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(&mut *tx)
            .await?;
        let role = if has_users { user.role } else { Role::Admin };

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(role.as_str())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(role)
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_panels(&self, owner: Option<Uuid>) -> Result<Vec<Panel>, DatabaseError> {
        let rows = match owner {
            Some(owner_id) => {
                let sql = format!(
                    "SELECT {} FROM panels WHERE owner_id = $1 ORDER BY created_at, id",
                    PANEL_COLUMNS
                );
                sqlx::query_as::<_, PanelRow>(&sql)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM panels ORDER BY created_at, id", PANEL_COLUMNS);
                sqlx::query_as::<_, PanelRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        panels_from_rows(rows)
    }

    async fn find_panel(&self, id: Uuid) -> Result<Option<Panel>, DatabaseError> {
        let sql = format!("SELECT {} FROM panels WHERE id = $1", PANEL_COLUMNS);
        sqlx::query_as::<_, PanelRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Panel::try_from)
            .transpose()
    }

    async fn insert_panel(&self, panel: &Panel) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO panels (id, model, location, capacity, status, owner_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(panel.id)
        .bind(&panel.model)
        .bind(&panel.location)
        .bind(panel.capacity)
        .bind(panel.status.as_str())
        .bind(panel.owner_id)
        .bind(panel.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_panel(&self, id: Uuid, patch: &PanelPatch) -> Result<Option<Panel>, DatabaseError> {
        // COALESCE keeps the stored value for every field the patch leaves out
        let sql = format!(
            "UPDATE panels SET
                model = COALESCE($2, model),
                location = COALESCE($3, location),
                capacity = COALESCE($4, capacity),
                status = COALESCE($5, status),
                owner_id = COALESCE($6, owner_id)
             WHERE id = $1
             RETURNING {}",
            PANEL_COLUMNS
        );
        sqlx::query_as::<_, PanelRow>(&sql)
            .bind(id)
            .bind(patch.model.as_deref())
            .bind(patch.location.as_deref())
            .bind(patch.capacity)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.owner_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Panel::try_from)
            .transpose()
    }

    async fn set_panel_owner(&self, id: Uuid, owner: Option<Uuid>) -> Result<Option<Panel>, DatabaseError> {
        let sql = format!("UPDATE panels SET owner_id = $2 WHERE id = $1 RETURNING {}", PANEL_COLUMNS);
        sqlx::query_as::<_, PanelRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .map(Panel::try_from)
            .transpose()
    }

    async fn clear_panel_owner(&self, owner: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE panels SET owner_id = NULL WHERE owner_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_panel(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM panels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed database pool");
    }
}
