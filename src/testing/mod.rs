use std::sync::Arc;

use crate::auth::{CredentialHasher, TokenIssuer};
use crate::database::{MemoryStore, Store};
use crate::database::models::{NewPanel, PanelView, User};
use crate::services::{AuthGate, AuthSession, PanelService, Registration, UserService};

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_PASSWORD: &str = "secret123";

/// Services wired to a fresh in-memory store
pub struct TestContext {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub gate: AuthGate,
    pub users: UserService,
    pub panels: PanelService,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let tokens = Arc::new(TokenIssuer::new(TEST_SECRET, 1).expect("token issuer"));
        // Minimum argon2 cost keeps the suite fast
        let hasher = Arc::new(CredentialHasher::new(1024, 1).expect("hasher"));

        Self {
            gate: AuthGate::new(store.clone(), tokens.clone()),
            users: UserService::new(store.clone(), tokens.clone(), hasher, 6),
            panels: PanelService::new(store.clone()),
            store,
            tokens,
        }
    }

    /// Register an account whose full name is its email
    pub async fn register(&self, email: &str) -> AuthSession {
        self.users
            .register(Registration {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                full_name: email.to_string(),
            })
            .await
            .expect("registration succeeds")
    }

    pub async fn panel(&self, admin: &User, model: &str) -> PanelView {
        self.panels
            .create(
                admin,
                NewPanel {
                    model: model.to_string(),
                    location: "Roof".to_string(),
                    capacity: 100.0,
                },
            )
            .await
            .expect("panel created")
    }
}
