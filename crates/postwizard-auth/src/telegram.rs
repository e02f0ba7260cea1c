use std::sync::Arc;

use postwizard_db::Vault;
use postwizard_types::models::{BotAuth, ProviderSecret};
use postwizard_types::SecretType;

use crate::{ControllerError, SecretController};

/// BotFather tokens, keyed by the chat the bot posts to.
pub struct TelegramController {
    vault: Arc<Vault>,
}

impl TelegramController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

impl SecretController for TelegramController {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[SecretType::TelegramAccessToken]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        Ok(self
            .revealed(secret_type)?
            .into_iter()
            .map(|(row, token)| {
                ProviderSecret::Telegram(BotAuth {
                    chat_id: row.name,
                    token,
                })
            })
            .collect())
    }
}
