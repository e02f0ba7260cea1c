use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{BraveAuth, GoogleSearch, ProviderSecret};
use postwizard_types::SecretType;

use crate::controller::BRAVE_ENTRY_NAME;
use crate::{ControllerError, SecretController};

/// Google Custom Search keys, one row per search engine (CSE) id.
pub struct GoogleSearchController {
    vault: Arc<Vault>,
}

impl GoogleSearchController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for GoogleSearchController {
    fn name(&self) -> &'static str {
        "Google Search"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::GoogleApiKey]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(row, api_key)| {
                ProviderSecret::Google(GoogleSearch {
                    cse_id: row.name,
                    api_key,
                })
            })
            .collect())
    }
}

/// The Brave Search key. There is only ever one, stored as `BraveAPI`.
pub struct BraveSearchController {
    vault: Arc<Vault>,
}

impl BraveSearchController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for BraveSearchController {
    fn name(&self) -> &'static str {
        "Brave Search"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::BraveApiKey]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(_, api_key)| ProviderSecret::Brave(BraveAuth { api_key }))
            .collect())
    }

    fn update_secrets(
        &self,
        secret_type: SecretType,
        _name: &str,
        new_secret: &str,
    ) -> Result<usize, ControllerError> {
        self.ensure_supported(secret_type)?;
        Ok(self.vault.update_secret(BRAVE_ENTRY_NAME, secret_type, new_secret)?)
    }
}
