use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{MongerCashAuth, ProviderSecret};
use postwizard_types::SecretType;
use tracing::debug;

use crate::{ControllerError, SecretController};

/// MongerCash affiliate login, keyed by username.
pub struct MongerCashController {
    vault: Arc<Vault>,
}

impl MongerCashController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for MongerCashController {
    fn name(&self) -> &'static str {
        "MongerCash"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::MongercashPassword]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(row, password)| {
                ProviderSecret::MongerCash(MongerCashAuth {
                    username: row.name,
                    password,
                })
            })
            .collect())
    }

    /// An empty `name` targets the first stored account.
    fn update_secrets(
        &self,
        secret_type: SecretType,
        name: &str,
        new_secret: &str,
    ) -> Result<usize, ControllerError> {
        self.ensure_supported(secret_type)?;
        let name = if name.is_empty() {
            let first = self.vault.entries_by_secret_type(secret_type)?.into_iter().next();
            match first {
                Some(row) => {
                    debug!("Updating MongerCash password of {}", row.name);
                    row.name
                }
                None => {
                    return Err(postwizard_db::VaultError::NotFound {
                        name: String::new(),
                        secret_type,
                    }
                    .into());
                }
            }
        } else {
            name.to_string()
        };
        Ok(self.vault.update_secret(&name, secret_type, new_secret)?)
    }
}
