use std::sync::Arc;

use crate::auth::{AuthError, CredentialHasher, TokenIssuer};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{AuthGate, PanelService, UserService};

/// Shared handles passed to every handler and the auth middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub gate: AuthGate,
    pub users: UserService,
    pub panels: PanelService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenIssuer::from_config(&config.security)?);
        let hasher = Arc::new(CredentialHasher::from_config(&config.security)?);

        Ok(Self {
            gate: AuthGate::new(store.clone(), tokens.clone()),
            users: UserService::new(
                store.clone(),
                tokens,
                hasher,
                config.security.min_password_length,
            ),
            panels: PanelService::new(store.clone()),
            config: Arc::new(config),
            store,
        })
    }
}
