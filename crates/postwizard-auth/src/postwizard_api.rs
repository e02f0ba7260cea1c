use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{PostWizardApiLogin, PostWizardApiToken, ProviderSecret};
use postwizard_types::SecretType;

use crate::{ControllerError, SecretController};

/// Login and bearer token for the PostWizard REST API.
///
/// Only one account is used, so `get_secrets` returns the first row.
pub struct PostWizardApiController {
    vault: Arc<Vault>,
}

impl PostWizardApiController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for PostWizardApiController {
    fn name(&self) -> &'static str {
        "PostWizard API"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::PwapiPassword, SecretType::PwapiToken]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        let first = self.revealed(secret_type)?.into_iter().next();
        Ok(first
            .map(|(row, secret)| match secret_type {
                SecretType::PwapiToken => ProviderSecret::PostWizardToken(PostWizardApiToken {
                    api_user: row.name,
                    access_token: secret,
                }),
                _ => ProviderSecret::PostWizardLogin(PostWizardApiLogin {
                    api_user: row.name,
                    api_secret: secret,
                }),
            })
            .into_iter()
            .collect())
    }
}
