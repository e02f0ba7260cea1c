use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::{CryptoError, FernetKey};

/// Name given to a freshly generated vault key.
pub const KEY_FILE_NAME: &str = "vault_access.key";

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CryptoError + '_ {
    move |source| CryptoError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// First `*.key` file in `key_dir`, in name order.
pub fn find_key_file(key_dir: &Path) -> Result<Option<PathBuf>, CryptoError> {
    if !key_dir.is_dir() {
        return Ok(None);
    }
    let mut keys: Vec<PathBuf> = fs::read_dir(key_dir)
        .map_err(io_err(key_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "key"))
        .collect();
    keys.sort();
    if keys.len() > 1 {
        warn!(
            "{} key files in {}, using {}",
            keys.len(),
            key_dir.display(),
            keys[0].display()
        );
    }
    Ok(keys.into_iter().next())
}

/// Make sure the key directory holds a key and return its path.
///
/// An existing `.key` file is reused; otherwise a new key is written to
/// `vault_access.key` and the file is made read-only. Returns whether a key
/// was created.
pub fn initialize_key_file(key_dir: &Path) -> Result<(PathBuf, bool), CryptoError> {
    if let Some(existing) = find_key_file(key_dir)? {
        return Ok((existing, false));
    }

    fs::create_dir_all(key_dir).map_err(io_err(key_dir))?;
    restrict_dir(key_dir)?;

    let path = key_dir.join(KEY_FILE_NAME);
    let key = FernetKey::generate();
    fs::write(&path, key.to_base64()).map_err(io_err(&path))?;
    make_read_only(&path)?;

    info!(
        "Vault key created at {} (fingerprint {})",
        path.display(),
        key_fingerprint(&key)
    );
    Ok((path, true))
}

pub fn load_key(path: &Path) -> Result<FernetKey, CryptoError> {
    let encoded = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CryptoError::KeyNotFound(path.to_path_buf())
        } else {
            CryptoError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    FernetKey::from_base64(&encoded)
}

/// Load the key from `key_dir`, failing when none has been initialized.
pub fn load_key_from_dir(key_dir: &Path) -> Result<FernetKey, CryptoError> {
    let path = find_key_file(key_dir)?.ok_or_else(|| CryptoError::KeyNotFound(key_dir.to_path_buf()))?;
    load_key(&path)
}

/// Short SHA-256 fingerprint, safe to log.
pub fn key_fingerprint(key: &FernetKey) -> String {
    let digest = Sha256::digest(key.to_bytes());
    hex::encode(&digest[..6])
}

#[cfg(unix)]
pub fn restrict_dir(dir: &Path) -> Result<(), CryptoError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).map_err(io_err(dir))
}

#[cfg(not(unix))]
pub fn restrict_dir(_dir: &Path) -> Result<(), CryptoError> {
    Ok(())
}

fn make_read_only(path: &Path) -> Result<(), CryptoError> {
    let mut perms = fs::metadata(path).map_err(io_err(path))?.permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms).map_err(io_err(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_key_once_and_reuses_it() {
        let dir = tempfile::tempdir().unwrap();
        let key_dir = dir.path().join("keys");

        let (path, created) = initialize_key_file(&key_dir).unwrap();
        assert!(created);
        assert_eq!(path.file_name().unwrap(), KEY_FILE_NAME);
        assert!(fs::metadata(&path).unwrap().permissions().readonly());

        let (again, created_again) = initialize_key_file(&key_dir).unwrap();
        assert!(!created_again);
        assert_eq!(again, path);

        let first = load_key(&path).unwrap();
        assert_eq!(load_key_from_dir(&key_dir).unwrap(), first);
    }

    #[test]
    fn existing_key_with_other_name_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let key = FernetKey::generate();
        fs::write(dir.path().join("legacy.key"), key.to_base64()).unwrap();

        let (path, created) = initialize_key_file(dir.path()).unwrap();
        assert!(!created);
        assert_eq!(path.file_name().unwrap(), "legacy.key");
        assert_eq!(load_key(&path).unwrap(), key);
    }

    #[test]
    fn missing_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_key_from_dir(dir.path()),
            Err(CryptoError::KeyNotFound(_))
        ));
    }

    #[test]
    fn fingerprint_is_stable() {
        let key = FernetKey::generate();
        assert_eq!(key_fingerprint(&key), key_fingerprint(&key.clone()));
        assert_eq!(key_fingerprint(&key).len(), 12);
    }
}
