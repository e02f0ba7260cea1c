use std::collections::BTreeMap;
use std::sync::Arc;

use postwizard_db::{SecretColumn, SecretRow, Vault};
use postwizard_types::models::{ProviderSecret, XApiSecrets, XClientSecrets, XCredentials, XTokens};
use postwizard_types::SecretType;
use tracing::warn;

use crate::{ControllerError, SecretController};

/// Credentials for X (Twitter): login, API key pair, OAuth client and tokens.
///
/// Key/secret and access/refresh rows are stored separately under the
/// account username and paired again on read.
pub struct XController {
    vault: Arc<Vault>,
}

impl XController {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }
}

/// Two halves of a paired credential, by username.
#[derive(Default)]
struct Pair {
    first: Option<String>,
    second: Option<String>,
}

fn put(slot: &mut Option<String>, value: String, row: &SecretRow) {
    if slot.is_some() {
        warn!(
            "Duplicate {} rows for {}, keeping row {}",
            row.secret_type, row.name, row.id
        );
    }
    *slot = Some(value);
}

impl XController {
    /// Rebuild every X credential from the vault. Rows are read in id order,
    /// so when a username has duplicates the most recent row wins.
    fn assemble(&self) -> Result<Vec<ProviderSecret>, ControllerError> {
        let rows = self.vault.retrieve_like_entry(SecretColumn::SecretType, "x_%")?;

        let mut api: BTreeMap<String, Pair> = BTreeMap::new();
        let mut tokens: BTreeMap<String, Pair> = BTreeMap::new();
        let mut singles = Vec::new();

        for row in rows {
            let Some(kind) = row.kind() else {
                warn!("Skipping row {} with unknown type {}", row.id, row.secret_type);
                continue;
            };
            let plain = self.vault.reveal(&row)?;
            match kind {
                SecretType::XApiKey => {
                    put(&mut api.entry(row.name.clone()).or_default().first, plain, &row)
                }
                SecretType::XApiSecret => {
                    put(&mut api.entry(row.name.clone()).or_default().second, plain, &row)
                }
                SecretType::XAccessToken => {
                    put(&mut tokens.entry(row.name.clone()).or_default().first, plain, &row)
                }
                SecretType::XRefreshToken => {
                    put(&mut tokens.entry(row.name.clone()).or_default().second, plain, &row)
                }
                SecretType::XPassword => singles.push(ProviderSecret::XCredentials(XCredentials {
                    email: row.metadata_str().to_string(),
                    username: row.name,
                    password: plain,
                })),
                SecretType::XClientSecret => singles.push(ProviderSecret::XClient(XClientSecrets {
                    username: row.metadata_str().to_string(),
                    client_id: row.name,
                    client_secret: plain,
                })),
                _ => {}
            }
        }

        let mut out = singles;
        for (username, pair) in api {
            match (pair.first, pair.second) {
                (Some(api_key), Some(api_secret)) => out.push(ProviderSecret::XApi(XApiSecrets {
                    username,
                    api_key,
                    api_secret,
                })),
                _ => warn!("Incomplete X API key pair for {}", username),
            }
        }
        for (username, pair) in tokens {
            match (pair.first, pair.second) {
                (Some(access_token), Some(refresh_token)) => out.push(ProviderSecret::XTokens(XTokens {
                    username,
                    access_token,
                    refresh_token,
                })),
                _ => warn!("Incomplete X token pair for {}", username),
            }
        }
        Ok(out)
    }
}

impl SecretController for XController {
    fn name(&self) -> &'static str {
        "X"
    }

    fn supported_secret_types(&self) -> &'static [SecretType] {
        &[
            SecretType::XApiKey,
            SecretType::XApiSecret,
            SecretType::XClientSecret,
            SecretType::XAccessToken,
            SecretType::XRefreshToken,
            SecretType::XPassword,
        ]
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Every credential that includes `secret_type`; asking for either half
    /// of a pair returns the whole pair.
    fn get_secrets(&self, secret_type: SecretType) -> Result<Vec<ProviderSecret>, ControllerError> {
        self.ensure_supported(secret_type)?;
        Ok(self
            .assemble()?
            .into_iter()
            .filter(|s| s.has_type(secret_type))
            .collect())
    }
}
