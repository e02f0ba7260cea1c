/// Per-provider secret controllers over the shared vault.
///
/// Each controller owns the mapping between one provider's credential model
/// and vault rows; `SecretHandler` picks the controller for a secret type.
pub mod controller;
pub mod error;
pub mod handler;

pub mod mongercash;
pub mod postwizard_api;
pub mod search;
pub mod telegram;
pub mod wordpress;
pub mod x;
pub mod yandex;

pub use controller::{SecretController, VaultEntry};
pub use error::ControllerError;
pub use handler::{SecretHandler, StoreOutcome};
