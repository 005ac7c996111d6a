use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{NewPanel, Panel, PanelPatch, PanelView, Role, User};
use crate::database::store::Store;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::gate::require_role;
use crate::services::validation::{validate_capacity, FieldErrors};

/// Panel CRUD plus the ownership and visibility rules
#[derive(Clone)]
pub struct PanelService {
    store: Arc<dyn Store>,
}

impl PanelService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Attach owner names with one lookup over the distinct owner ids
    async fn enrich(&self, panels: Vec<Panel>) -> ServiceResult<Vec<PanelView>> {
        let owner_ids: Vec<Uuid> = panels
            .iter()
            .filter_map(|p| p.owner_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let names: HashMap<Uuid, String> = self
            .store
            .find_users_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();

        Ok(panels
            .into_iter()
            .map(|panel| {
                let owner_name = panel.owner_id.and_then(|id| names.get(&id).cloned());
                PanelView { panel, owner_name }
            })
            .collect())
    }

    async fn enrich_one(&self, panel: Panel) -> ServiceResult<PanelView> {
        let owner_name = match panel.owner_id {
            Some(owner_id) => self
                .store
                .find_user_by_id(owner_id)
                .await?
                .map(|u| u.full_name),
            None => None,
        };
        Ok(PanelView { panel, owner_name })
    }

    /// Admins see every panel; everyone else sees only their own
    pub async fn list(&self, actor: &User) -> ServiceResult<Vec<PanelView>> {
        let owner = match actor.role {
            Role::Admin => None,
            Role::User => Some(actor.id),
        };
        let panels = self.store.list_panels(owner).await?;
        self.enrich(panels).await
    }

    pub async fn get(&self, actor: &User, panel_id: Uuid) -> ServiceResult<PanelView> {
        let panel = self
            .store
            .find_panel(panel_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Panel not found"))?;

        if !actor.is_admin() && panel.owner_id != Some(actor.id) {
            return Err(ServiceError::forbidden("You do not have access to this panel"));
        }

        self.enrich_one(panel).await
    }

    pub async fn create(&self, actor: &User, fields: NewPanel) -> ServiceResult<PanelView> {
        require_role(actor, Role::Admin)?;

        let mut errors = FieldErrors::new();
        errors.check("capacity", validate_capacity(fields.capacity));
        errors.finish()?;

        let panel = Panel::new(fields);
        self.store.insert_panel(&panel).await?;

        tracing::info!(actor = %actor.id, panel_id = %panel.id, model = %panel.model, "Panel created");

        Ok(PanelView {
            panel,
            owner_name: None,
        })
    }

    pub async fn update(&self, actor: &User, panel_id: Uuid, patch: PanelPatch) -> ServiceResult<PanelView> {
        require_role(actor, Role::Admin)?;

        if patch.is_empty() {
            return Err(ServiceError::NoOp);
        }

        if let Some(capacity) = patch.capacity {
            let mut errors = FieldErrors::new();
            errors.check("capacity", validate_capacity(capacity));
            errors.finish()?;
        }

        if let Some(owner_id) = patch.owner_id {
            if self.store.find_user_by_id(owner_id).await?.is_none() {
                return Err(ServiceError::not_found("User not found"));
            }
        }

        let panel = self
            .store
            .update_panel(panel_id, &patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Panel not found"))?;

        tracing::info!(actor = %actor.id, panel_id = %panel_id, "Panel updated");

        self.enrich_one(panel).await
    }

    pub async fn delete(&self, actor: &User, panel_id: Uuid) -> ServiceResult<()> {
        require_role(actor, Role::Admin)?;

        if !self.store.delete_panel(panel_id).await? {
            return Err(ServiceError::not_found("Panel not found"));
        }

        tracing::info!(actor = %actor.id, panel_id = %panel_id, "Panel deleted");
        Ok(())
    }

    pub async fn assign(&self, actor: &User, panel_id: Uuid, user_id: Uuid) -> ServiceResult<PanelView> {
        require_role(actor, Role::Admin)?;

        let owner = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        let panel = self
            .store
            .set_panel_owner(panel_id, Some(owner.id))
            .await?
            .ok_or_else(|| ServiceError::not_found("Panel not found"))?;

        tracing::info!(actor = %actor.id, panel_id = %panel_id, user_id = %user_id, "Panel assigned");

        Ok(PanelView {
            panel,
            owner_name: Some(owner.full_name),
        })
    }

    pub async fn unassign(&self, actor: &User, panel_id: Uuid) -> ServiceResult<PanelView> {
        require_role(actor, Role::Admin)?;

        let panel = self
            .store
            .set_panel_owner(panel_id, None)
            .await?
            .ok_or_else(|| ServiceError::not_found("Panel not found"))?;

        tracing::info!(actor = %actor.id, panel_id = %panel_id, "Panel unassigned");

        Ok(PanelView {
            panel,
            owner_name: None,
        })
    }
}
