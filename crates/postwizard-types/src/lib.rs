/// Shared data types for the PostWizard workspace.
///
/// Kept free of storage and I/O so every other crate can depend on it:
/// secret type tags, provider credential models, the WordPress post cache
/// shape and the REST payloads built from content records.
pub mod models;
pub mod payload;
pub mod secret_type;
pub mod wordpress;

pub use models::ProviderSecret;
pub use secret_type::{SecretType, UnknownSecretType};
