use postwizard_db::{SecretRow, Vault};
use postwizard_types::models::ProviderSecret;
use postwizard_types::SecretType;

use crate::ControllerError;

/// One vault row as written for a provider credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultEntry<'a> {
    pub name: &'a str,
    pub secret_type: SecretType,
    pub secret: &'a str,
    pub metadata: Option<&'a str>,
}

impl<'a> VaultEntry<'a> {
    fn new(name: &'a str, secret_type: SecretType, secret: &'a str) -> Self {
        Self {
            name,
            secret_type,
            secret,
            metadata: None,
        }
    }

    fn with_metadata(mut self, metadata: &'a str) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Name given to the single Brave Search key.
pub const BRAVE_ENTRY_NAME: &str = "BraveAPI";

/// The rows a credential occupies in the vault.
pub fn vault_entries(secret: &ProviderSecret) -> Vec<VaultEntry<'_>> {
    match secret {
        ProviderSecret::WordPress(wp) => {
            vec![VaultEntry::new(&wp.hostname, SecretType::WpAppPassword, &wp.app_password).with_metadata(&wp.user)]
        }
        ProviderSecret::XCredentials(c) => {
            vec![VaultEntry::new(&c.username, SecretType::XPassword, &c.password).with_metadata(&c.email)]
        }
        ProviderSecret::XApi(a) => vec![
            VaultEntry::new(&a.username, SecretType::XApiKey, &a.api_key),
            VaultEntry::new(&a.username, SecretType::XApiSecret, &a.api_secret),
        ],
        ProviderSecret::XClient(c) => vec![
            VaultEntry::new(&c.client_id, SecretType::XClientSecret, &c.client_secret).with_metadata(&c.username),
        ],
        ProviderSecret::XTokens(t) => vec![
            VaultEntry::new(&t.username, SecretType::XAccessToken, &t.access_token),
            VaultEntry::new(&t.username, SecretType::XRefreshToken, &t.refresh_token),
        ],
        ProviderSecret::Telegram(b) => {
            vec![VaultEntry::new(&b.chat_id, SecretType::TelegramAccessToken, &b.token)]
        }
        ProviderSecret::Google(g) => vec![VaultEntry::new(&g.cse_id, SecretType::GoogleApiKey, &g.api_key)],
        ProviderSecret::Brave(b) => vec![VaultEntry::new(BRAVE_ENTRY_NAME, SecretType::BraveApiKey, &b.api_key)],
        ProviderSecret::MongerCash(m) => {
            vec![VaultEntry::new(&m.username, SecretType::MongercashPassword, &m.password)]
        }
        ProviderSecret::Yandex(y) => {
            vec![VaultEntry::new(&y.client_id, SecretType::YandexClientSecret, &y.client_secret)]
        }
        ProviderSecret::PostWizardLogin(l) => {
            vec![VaultEntry::new(&l.api_user, SecretType::PwapiPassword, &l.api_secret)]
        }
        ProviderSecret::PostWizardToken(t) => {
            vec![VaultEntry::new(&t.api_user, SecretType::PwapiToken, &t.access_token)]
        }
    }
}

/// Store/update/get/delete for one provider's secrets.
pub trait SecretController: Send + Sync {
    fn name(&self) -> &'static str;

    fn supported_secret_types(&self) -> &'static [SecretType];

    fn vault(&self) -> &Vault;

    /// Decrypted credentials holding `secret_type`.
    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError>;

    fn supports(&self, secret_type: SecretType) -> bool {
        self.supported_secret_types().contains(&secret_type)
    }

    fn ensure_supported(&self, secret_type: SecretType) -> Result<(), ControllerError> {
        if self.supports(secret_type) {
            Ok(())
        } else {
            Err(ControllerError::Unsupported {
                controller: self.name(),
                secret_type,
            })
        }
    }

    /// Write every row of `secret`. Nothing is written unless all of its
    /// types belong to this controller.
    fn store_secrets(&self, secret: &ProviderSecret) -> Result<usize, ControllerError> {
        let entries = vault_entries(secret);
        for entry in &entries {
            self.ensure_supported(entry.secret_type)?;
        }
        for entry in &entries {
            self.vault()
                .store_secret(entry.name, entry.secret_type, entry.secret, entry.metadata)?;
        }
        Ok(entries.len())
    }

    fn update_secrets(
        &self,
        secret_type: SecretType,
        name: &str,
        new_secret: &str,
    ) -> Result<usize, ControllerError> {
        self.ensure_supported(secret_type)?;
        Ok(self.vault().update_secret(name, secret_type, new_secret)?)
    }

    /// Remove `name`'s rows of `secret_type`, or every row of the type when
    /// no name is given. Returns rows removed.
    fn delete_secrets(&self, secret_type: SecretType, name: Option<&str>) -> Result<usize, ControllerError> {
        self.ensure_supported(secret_type)?;
        let removed = match name {
            Some(name) => self.vault().remove_secret(name, secret_type)?,
            None => self.vault().remove_secret_by_type(secret_type)?,
        };
        Ok(removed)
    }

    /// Rows of `secret_type` paired with their decrypted secret.
    fn revealed(&self, secret_type: SecretType) -> Result<Vec<(SecretRow, String)>, ControllerError> {
        self.ensure_supported(secret_type)?;
        let vault = self.vault();
        vault
            .entries_by_secret_type(secret_type)?
            .into_iter()
            .map(|row| {
                let plain = vault.reveal(&row)?;
                Ok((row, plain))
            })
            .collect()
    }
}
