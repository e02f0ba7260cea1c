use postwizard_db::VaultError;
use postwizard_types::SecretType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("{controller} controller does not handle {secret_type} secrets")]
    Unsupported {
        controller: &'static str,
        secret_type: SecretType,
    },

    #[error("no controller handles {0} secrets")]
    NoController(SecretType),
}
