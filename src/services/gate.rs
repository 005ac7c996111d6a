use std::sync::Arc;

use crate::auth::{AuthError, TokenIssuer};
use crate::database::models::{Role, User};
use crate::database::store::Store;
use crate::services::error::{ServiceError, ServiceResult};

/// Resolves bearer tokens to the caller's current user record
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn Store>,
    tokens: Arc<TokenIssuer>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    /// Verify `token` and load its subject fresh from the store.
    ///
    /// There is no session cache: a role change is visible on the next
    /// request and a deleted user's token stops working immediately.
    pub async fn resolve(&self, token: &str) -> ServiceResult<User> {
        let user_id = self.tokens.verify(token).map_err(|e| match e {
            AuthError::TokenExpired => ServiceError::unauthenticated("Token has expired"),
            AuthError::InvalidToken => ServiceError::unauthenticated("Could not validate credentials"),
            other => ServiceError::Auth(other),
        })?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("User not found"))?;

        Ok(user.to_user())
    }
}

/// Reject `user` unless they hold `role`
pub fn require_role(user: &User, role: Role) -> ServiceResult<()> {
    if user.role != role {
        tracing::debug!(user_id = %user.id, required = %role, actual = %user.role, "Role check failed");
        return Err(match role {
            Role::Admin => ServiceError::forbidden("Administrator privileges required"),
            Role::User => ServiceError::forbidden(format!("Role '{}' required", role)),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::testing::TestContext;
    use chrono::Utc;

    #[tokio::test]
    async fn resolves_token_to_current_record() {
        let ctx = TestContext::new();
        let admin = ctx.register("admin@example.com").await;
        let user = ctx.register("user@example.com").await;

        let resolved = ctx.gate.resolve(&user.access_token).await.unwrap();
        assert_eq!(resolved.id, user.user.id);
        assert_eq!(resolved.role, Role::User);

        // Promotion after issuance is reflected without a new token
        ctx.users
            .change_role(&admin.user, user.user.id, Role::Admin)
            .await
            .unwrap();
        let resolved = ctx.gate.resolve(&user.access_token).await.unwrap();
        assert_eq!(resolved.role, Role::Admin);
    }

    #[tokio::test]
    async fn deleted_user_token_is_rejected() {
        let ctx = TestContext::new();
        let admin = ctx.register("admin@example.com").await;
        let user = ctx.register("user@example.com").await;

        ctx.users.delete_user(&admin.user, user.user.id).await.unwrap();

        let err = ctx.gate.resolve(&user.access_token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == "User not found"));
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated() {
        let ctx = TestContext::new();
        let user = ctx.register("admin@example.com").await;

        let now = Utc::now().timestamp();
        let token = ctx
            .tokens
            .sign(&Claims {
                sub: user.user.id.to_string(),
                iat: now - 3600,
                exp: now - 1,
            })
            .unwrap();

        let err = ctx.gate.resolve(&token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == "Token has expired"));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let ctx = TestContext::new();
        let err = ctx.gate.resolve("garbage").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn require_role_gates_admin_operations() {
        let ctx = TestContext::new();
        let admin = ctx.register("admin@example.com").await;
        let user = ctx.register("user@example.com").await;

        assert!(require_role(&admin.user, Role::Admin).is_ok());
        assert!(matches!(
            require_role(&user.user, Role::Admin),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
