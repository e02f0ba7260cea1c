use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid Fernet key: {0}")]
    InvalidKey(String),

    /// Bad signature, bad padding or a malformed token. Fernet does not say which.
    #[error("invalid token")]
    InvalidToken,

    #[error("no vault key found in {0}")]
    KeyNotFound(PathBuf),

    #[error("key file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
