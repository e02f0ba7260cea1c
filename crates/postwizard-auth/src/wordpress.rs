use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{ProviderSecret, WpSecrets};
use postwizard_types::SecretType;

use crate::{ControllerError, SecretController};

/// WordPress application passwords, one row per site hostname.
pub struct WordPressController {
    vault: Arc<Vault>,
}

impl WordPressController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for WordPressController {
    fn name(&self) -> &'static str {
        "WordPress"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::WpAppPassword]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(row, app_password)| {
                ProviderSecret::WordPress(WpSecrets {
                    user: row.metadata_str().to_string(),
                    hostname: row.name,
                    app_password,
                })
            })
            .collect())
    }
}
