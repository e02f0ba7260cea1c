pub mod content;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use postwizard_crypto::{FernetKey, keys};
use rusqlite::Connection;
use tracing::{error, info};

pub use content::{ContentDb, QueryRows};
pub use error::{ContentError, SchemaError, VaultError};
pub use models::{SecretColumn, SecretRow};
pub use schema::{ColumnMap, ContentField, SchemaField, SecretField, TableSchema};

/// How the vault holds its SQLite connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// One connection for the life of the vault.
    #[default]
    Shared,
    /// A fresh connection per operation, closed afterwards.
    PerOperation,
}

enum Handle {
    Shared(Mutex<Connection>),
    PerOperation(PathBuf),
}

/// Where the vault and its key live on disk.
#[derive(Debug, Clone)]
pub struct VaultLocation {
    pub vault_dir: PathBuf,
    pub key_dir: PathBuf,
    pub test_mode: bool,
    pub mode: ConnectionMode,
}

impl VaultLocation {
    /// `<user>_<os>_<arch>.db`, or `test_vault.db` in test mode.
    pub fn db_file_name(&self) -> String {
        if self.test_mode {
            return "test_vault.db".to_string();
        }
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "user".into());
        format!("{}_{}_{}.db", user, std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn db_path(&self) -> PathBuf {
        self.vault_dir.join(self.db_file_name())
    }
}

/// The encrypted secrets store.
///
/// One instance per process, shared as `Arc<Vault>`.
pub struct Vault {
    handle: Handle,
    key: FernetKey,
    columns: ColumnMap<SecretField>,
}

impl Vault {
    /// Create key and vault directories as needed, then open the vault.
    pub fn initialize(location: &VaultLocation) -> Result<Self, VaultError> {
        let (key_path, _) = keys::initialize_key_file(&location.key_dir)?;
        let key = keys::load_key(&key_path)?;

        std::fs::create_dir_all(&location.vault_dir).map_err(|source| VaultError::Io {
            path: location.vault_dir.clone(),
            source,
        })?;
        keys::restrict_dir(&location.vault_dir)?;

        Self::open(&location.db_path(), key, location.mode)
    }

    pub fn open(path: &Path, key: FernetKey, mode: ConnectionMode) -> Result<Self, VaultError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run(&conn)?;
        let columns = Self::reflect(&conn)?;

        let handle = match mode {
            ConnectionMode::Shared => Handle::Shared(Mutex::new(conn)),
            ConnectionMode::PerOperation => {
                drop(conn);
                Handle::PerOperation(path.to_path_buf())
            }
        };

        info!(
            "Vault opened at {} ({:?}, key {})",
            path.display(),
            mode,
            keys::key_fingerprint(&key)
        );
        Ok(Self { handle, key, columns })
    }

    pub fn open_in_memory(key: FernetKey) -> Result<Self, VaultError> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        let columns = Self::reflect(&conn)?;
        Ok(Self {
            handle: Handle::Shared(Mutex::new(conn)),
            key,
            columns,
        })
    }

    fn reflect(conn: &Connection) -> Result<ColumnMap<SecretField>, VaultError> {
        let columns = ColumnMap::resolve(TableSchema::read_table(conn, migrations::SECRETS_TABLE)?);
        columns.require(SecretField::ALL)?;
        Ok(columns)
    }

    pub(crate) fn key(&self) -> &FernetKey {
        &self.key
    }

    pub(crate) fn columns(&self) -> &ColumnMap<SecretField> {
        &self.columns
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, VaultError>
    where
        F: FnOnce(&Connection) -> Result<T, VaultError>,
    {
        let result = match &self.handle {
            Handle::Shared(conn) => {
                let conn = conn.lock().map_err(|_| VaultError::LockPoisoned)?;
                f(&conn)
            }
            Handle::PerOperation(path) => {
                let conn = Connection::open(path)?;
                f(&conn)
            }
        };
        log_storage_error(result)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, VaultError>
    where
        F: FnOnce(&mut Connection) -> Result<T, VaultError>,
    {
        let result = match &self.handle {
            Handle::Shared(conn) => {
                let mut conn = conn.lock().map_err(|_| VaultError::LockPoisoned)?;
                f(&mut conn)
            }
            Handle::PerOperation(path) => {
                let mut conn = Connection::open(path)?;
                f(&mut conn)
            }
        };
        log_storage_error(result)
    }
}

fn log_storage_error<T>(result: Result<T, VaultError>) -> Result<T, VaultError> {
    if let Err(VaultError::Storage(e)) = &result {
        error!("Vault storage error: {}", e);
    }
    result
}
