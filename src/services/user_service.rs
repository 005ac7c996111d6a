use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{CredentialHasher, TokenIssuer};
use crate::database::manager::DatabaseError;
use crate::database::models::{Role, User, UserRecord};
use crate::database::store::Store;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::gate::require_role;
use crate::services::validation::{validate_email_format, validate_password, FieldErrors};

/// Token plus user returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// Account data submitted at registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Registration, login and admin-side user management
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenIssuer>,
    hasher: Arc<CredentialHasher>,
    min_password_length: usize,
}

impl UserService {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: Arc<TokenIssuer>,
        hasher: Arc<CredentialHasher>,
        min_password_length: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            min_password_length,
        }
    }

    fn session_for(&self, user: User) -> ServiceResult<AuthSession> {
        Ok(AuthSession {
            access_token: self.tokens.issue(user.id)?,
            token_type: "bearer",
            user,
        })
    }

    /// Create an account. The very first account becomes admin.
    pub async fn register(&self, registration: Registration) -> ServiceResult<AuthSession> {
        let mut errors = FieldErrors::new();
        errors
            .check("email", validate_email_format(&registration.email))
            .check("password", validate_password(&registration.password, self.min_password_length))
            .check(
                "full_name",
                if registration.full_name.trim().is_empty() {
                    Err("Full name cannot be empty".to_string())
                } else {
                    Ok(())
                },
            );
        errors.finish()?;

        if self.store.find_user_by_email(&registration.email).await?.is_some() {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&registration.password)?;
        let mut record = UserRecord::new(registration.email, password_hash, registration.full_name, Role::User);

        // The store promotes the first account atomically; the unique index
        // catches a concurrent registration that slipped past the check above
        record.role = match self.store.insert_user(&record).await {
            Ok(role) => role,
            Err(DatabaseError::UniqueViolation(_)) => return Err(ServiceError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %record.id, email = %record.email, role = %record.role, "New user registered");

        self.session_for(record.to_user())
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let record = match self.store.find_user_by_email(email).await? {
            Some(record) => record,
            None => {
                tracing::warn!(email = %email, "Login attempt for unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &record.password_hash)? {
            tracing::warn!(user_id = %record.id, "Failed login attempt");
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %record.id, email = %record.email, "User logged in");

        self.session_for(record.to_user())
    }

    pub async fn list_users(&self, actor: &User) -> ServiceResult<Vec<User>> {
        require_role(actor, Role::Admin)?;

        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn change_role(&self, actor: &User, user_id: Uuid, role: Role) -> ServiceResult<User> {
        require_role(actor, Role::Admin)?;

        if user_id == actor.id && role != Role::Admin {
            return Err(ServiceError::SelfRoleChangeForbidden);
        }

        let updated = self
            .store
            .update_user_role(user_id, role)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        tracing::info!(actor = %actor.id, user_id = %user_id, role = %role, "User role updated");

        Ok(updated.into())
    }

    /// Unassign the user's panels, then remove the user.
    ///
    /// The two writes are separate; if the second never happens the panels
    /// stay unassigned and the call can simply be repeated.
    pub async fn delete_user(&self, actor: &User, user_id: Uuid) -> ServiceResult<()> {
        require_role(actor, Role::Admin)?;

        if user_id == actor.id {
            return Err(ServiceError::SelfDeleteForbidden);
        }

        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }

        let unassigned = self.store.clear_panel_owner(user_id).await?;

        if !self.store.delete_user(user_id).await? {
            return Err(ServiceError::not_found("User not found"));
        }

        tracing::info!(actor = %actor.id, user_id = %user_id, unassigned_panels = unassigned, "User deleted");

        Ok(())
    }
}
