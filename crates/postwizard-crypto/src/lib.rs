/// PostWizard Crypto Library
///
/// Fernet symmetric tokens (AES-128-CBC + HMAC-SHA256) for vault secrets,
/// wire compatible with other Fernet implementations so existing vaults keep
/// decrypting, plus management of the vault key file.
pub mod error;
pub mod fernet;
pub mod keys;

pub use error::CryptoError;
pub use fernet::FernetKey;
