use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::ProviderSecret;
use postwizard_types::SecretType;
use tracing::info;

use crate::controller::vault_entries;
use crate::mongercash::MongerCashController;
use crate::postwizard_api::PostWizardApiController;
use crate::search::{BraveSearchController, GoogleSearchController};
use crate::telegram::TelegramController;
use crate::wordpress::WordPressController;
use crate::x::XController;
use crate::yandex::YandexController;
use crate::{ControllerError, SecretController};

/// What `store_or_update` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    Updated,
}

/// Routes secret operations to the controller that owns the secret type.
pub struct SecretHandler {
    vault: Arc<Vault>,
    controllers: Vec<Box<dyn SecretController>>,
}

impl SecretHandler {
    /// Handler with every provider controller registered.
    pub fn new(vault: Arc<Vault>) -> Self {
        let controllers: Vec<Box<dyn SecretController>> = vec![
            Box::new(WordPressController::new(vault.clone())),
            Box::new(XController::new(vault.clone())),
            Box::new(TelegramController::new(vault.clone())),
            Box::new(GoogleSearchController::new(vault.clone())),
            Box::new(BraveSearchController::new(vault.clone())),
            Box::new(MongerCashController::new(vault.clone())),
            Box::new(YandexController::new(vault.clone())),
            Box::new(PostWizardApiController::new(vault.clone())),
        ];
        Self::with_controllers(vault, controllers)
    }

    pub fn with_controllers(vault: Arc<Vault>, controllers: Vec<Box<dyn SecretController>>) -> Self {
        Self { vault, controllers }
    }

    /// First registered controller supporting `secret_type`.
    pub fn controller_for(&self, secret_type: SecretType) -> Result<&dyn SecretController, ControllerError> {
        self.controllers
            .iter()
            .find(|c| c.supports(secret_type))
            .map(|c| c.as_ref())
            .ok_or(ControllerError::NoController(secret_type))
    }

    /// Secret types some controller handles.
    pub fn supported_secret_types(&self) -> Vec<SecretType> {
        self.controllers
            .iter()
            .flat_map(|c| c.supported_secret_types().iter().copied())
            .collect()
    }

    pub fn store(&self, secret: &ProviderSecret) -> Result<usize, ControllerError> {
        let controller = self.controller_for(secret.primary_type())?;
        let rows = controller.store_secrets(secret)?;
        info!("Stored {} credential ({} row(s))", controller.name(), rows);
        Ok(rows)
    }

    pub fn get(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        self.controller_for(secret_type)?.get_secrets(secret_type)
    }

    pub fn update(&self, secret_type: SecretType, name: &str, new_secret: &str) -> Result<usize, ControllerError> {
        self.controller_for(secret_type)?
            .update_secrets(secret_type, name, new_secret)
    }

    pub fn delete(&self, secret_type: SecretType, name: Option<&str>) -> Result<usize, ControllerError> {
        let controller = self.controller_for(secret_type)?;
        let removed = controller.delete_secrets(secret_type, name)?;
        info!("Removed {} {} row(s)", removed, secret_type);
        Ok(removed)
    }

    /// Update the rows of `secret` when they already exist, store it otherwise.
    pub fn store_or_update(&self, secret: &ProviderSecret) -> Result<StoreOutcome, ControllerError> {
        let controller = self.controller_for(secret.primary_type())?;
        let entries = vault_entries(secret);
        for entry in &entries {
            controller.ensure_supported(entry.secret_type)?;
        }

        let mut existing = Vec::with_capacity(entries.len());
        for entry in &entries {
            existing.push(self.vault.retrieve_entry(entry.name, entry.secret_type)?.is_some());
        }

        if existing.iter().all(|e| *e) {
            for entry in &entries {
                controller.update_secrets(entry.secret_type, entry.name, entry.secret)?;
            }
            return Ok(StoreOutcome::Updated);
        }

        // A half-present pair is replaced whole.
        for entry in &entries {
            self.vault.remove_secret(entry.name, entry.secret_type)?;
        }
        controller.store_secrets(secret)?;
        Ok(StoreOutcome::Stored)
    }

    /// Remove any rows `secret` would occupy, then store it fresh.
    pub fn replace(&self, secret: &ProviderSecret) -> Result<usize, ControllerError> {
        let controller = self.controller_for(secret.primary_type())?;
        for entry in vault_entries(secret) {
            controller.delete_secrets(entry.secret_type, Some(entry.name))?;
        }
        controller.store_secrets(secret)
    }
}
