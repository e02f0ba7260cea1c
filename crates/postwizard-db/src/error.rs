use std::path::PathBuf;

use postwizard_crypto::CryptoError;
use postwizard_types::SecretType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no secret named {name:?} of type {secret_type}")]
    NotFound { name: String, secret_type: SecretType },

    #[error("vault storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("vault schema mismatch: {0}")]
    Schema(#[from] SchemaError),

    #[error(
        "secret{} is not valid UTF-8",
        .id.map(|id| format!(" in row {}", id)).unwrap_or_default()
    )]
    Encoding { id: Option<i64> },

    #[error("vault file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("vault lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(
        "invalid or absent database at {path}. Make sure you have the database required by the command you're running"
    )]
    InvalidDb { path: String },

    #[error("table index {index} out of range, database has {available} table(s)")]
    TableIndexOutOfRange { index: usize, available: usize },

    #[error("table {table} is missing required column(s): {missing}")]
    MissingColumns { table: String, missing: String },

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("partner SQL configuration is invalid ({sql}): {source}")]
    InvalidSqlConfig {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("content database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("content database lock poisoned")]
    LockPoisoned,
}
