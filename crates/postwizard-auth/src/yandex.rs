use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{ProviderSecret, YandexAuth};
use postwizard_types::SecretType;

use crate::{ControllerError, SecretController};

pub struct YandexController {
    vault: Arc<Vault>,
}

impl YandexController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for YandexController {
    fn name(&self) -> &'static str {
        "Yandex"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::YandexClientSecret]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(row, client_secret)| {
                ProviderSecret::Yandex(YandexAuth {
                    client_id: row.name,
                    client_secret,
                })
            })
            .collect())
    }
}
