use postwizard_types::SecretType;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::models::{SecretColumn, SecretRow};
use crate::schema::{ColumnMap, SecretField};
use crate::{Vault, VaultError};

impl Vault {
    // -- Crypto --

    pub fn encrypt_secret(&self, plaintext: &str) -> Result<String, VaultError> {
        Ok(self.key().encrypt(plaintext.as_bytes())?)
    }

    pub fn decrypt_secret(&self, token: &[u8]) -> Result<String, VaultError> {
        self.decrypt_for(token, None)
    }

    /// Decrypt the secret held by a row.
    pub fn reveal(&self, row: &SecretRow) -> Result<String, VaultError> {
        self.decrypt_for(&row.secret, Some(row.id))
    }

    fn decrypt_for(&self, token: &[u8], id: Option<i64>) -> Result<String, VaultError> {
        let token = std::str::from_utf8(token).map_err(|_| VaultError::Encoding { id })?;
        let plain = self.key().decrypt(token)?;
        String::from_utf8(plain).map_err(|_| VaultError::Encoding { id })
    }

    // -- Writes --

    /// Encrypt and insert a secret. Duplicates are not checked.
    pub fn store_secret(
        &self,
        name: &str,
        secret_type: SecretType,
        secret: &str,
        metadata: Option<&str>,
    ) -> Result<i64, VaultError> {
        let token = self.encrypt_secret(secret)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO secrets (name, secret_type, secret, metadata) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, secret_type.as_str(), token.as_bytes(), metadata],
            )?;
            let id = conn.last_insert_rowid();
            debug!("Stored {} secret {:?} as row {}", secret_type, name, id);
            Ok(id)
        })
    }

    /// Re-encrypt the secret of every row matching `name` and `secret_type`.
    pub fn update_secret(
        &self,
        name: &str,
        secret_type: SecretType,
        new_secret: &str,
    ) -> Result<usize, VaultError> {
        let token = self.encrypt_secret(new_secret)?;
        let changed = self.with_conn_mut(|conn| {
            Ok(conn.execute(
                "UPDATE secrets SET secret = ?1, updated_at = CURRENT_TIMESTAMP
                 WHERE name = ?2 AND secret_type = ?3",
                rusqlite::params![token.as_bytes(), name, secret_type.as_str()],
            )?)
        })?;
        if changed == 0 {
            return Err(VaultError::NotFound {
                name: name.to_string(),
                secret_type,
            });
        }
        debug!("Updated {} row(s) of {} secret {:?}", changed, secret_type, name);
        Ok(changed)
    }

    /// Rows removed; zero is not an error.
    pub fn remove_secret_by_name(&self, name: &str) -> Result<usize, VaultError> {
        self.with_conn_mut(|conn| Ok(conn.execute("DELETE FROM secrets WHERE name = ?1", [name])?))
    }

    pub fn remove_secret_by_type(&self, secret_type: SecretType) -> Result<usize, VaultError> {
        self.with_conn_mut(|conn| {
            Ok(conn.execute(
                "DELETE FROM secrets WHERE secret_type = ?1",
                [secret_type.as_str()],
            )?)
        })
    }

    pub fn remove_secret(&self, name: &str, secret_type: SecretType) -> Result<usize, VaultError> {
        self.with_conn_mut(|conn| {
            Ok(conn.execute(
                "DELETE FROM secrets WHERE name = ?1 AND secret_type = ?2",
                [name, secret_type.as_str()],
            )?)
        })
    }

    // -- Reads --

    pub fn entries_by_secret_type(&self, secret_type: SecretType) -> Result<Vec<SecretRow>, VaultError> {
        self.with_conn(|conn| {
            query_rows(
                conn,
                self.columns(),
                "SELECT * FROM secrets WHERE secret_type = ?1 ORDER BY id",
                [secret_type.as_str()],
            )
        })
    }

    /// Decrypted secrets of every row of `secret_type`.
    pub fn keys_by_secret_type(&self, secret_type: SecretType) -> Result<Vec<String>, VaultError> {
        self.entries_by_secret_type(secret_type)?
            .iter()
            .map(|row| self.reveal(row))
            .collect()
    }

    /// First row (lowest id) called `name`.
    pub fn retrieve_entry_by_name(&self, name: &str) -> Result<Option<SecretRow>, VaultError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM secrets WHERE name = ?1 ORDER BY id LIMIT 1",
                [name],
                |row| row_to_secret(self.columns(), row),
            )
            .optional()
        })
    }

    pub fn retrieve_entry(
        &self,
        name: &str,
        secret_type: SecretType,
    ) -> Result<Option<SecretRow>, VaultError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM secrets WHERE name = ?1 AND secret_type = ?2 ORDER BY id LIMIT 1",
                [name, secret_type.as_str()],
                |row| row_to_secret(self.columns(), row),
            )
            .optional()
        })
    }

    /// SQL `LIKE` search over one column, e.g. `(SecretType, "x_%")`.
    pub fn retrieve_like_entry(
        &self,
        column: SecretColumn,
        pattern: &str,
    ) -> Result<Vec<SecretRow>, VaultError> {
        let sql = format!(
            "SELECT * FROM secrets WHERE {} LIKE ?1 ORDER BY id",
            column.as_sql()
        );
        self.with_conn(|conn| query_rows(conn, self.columns(), &sql, [pattern]))
    }

    /// Decrypted secret of row `id`.
    pub fn retrieve_secret(&self, id: i64) -> Result<Option<String>, VaultError> {
        let row = self.with_conn(|conn| {
            conn.query_row("SELECT * FROM secrets WHERE id = ?1", [id], |row| {
                row_to_secret(self.columns(), row)
            })
            .optional()
        })?;
        row.map(|r| self.reveal(&r)).transpose()
    }

    pub fn list_entries(&self) -> Result<Vec<SecretRow>, VaultError> {
        self.with_conn(|conn| query_rows(conn, self.columns(), "SELECT * FROM secrets ORDER BY id", rusqlite::params![]))
    }
}

fn query_rows<P: rusqlite::Params>(
    conn: &Connection,
    columns: &ColumnMap<SecretField>,
    sql: &str,
    params: P,
) -> Result<Vec<SecretRow>, VaultError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| row_to_secret(columns, row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn row_to_secret(columns: &ColumnMap<SecretField>, row: &Row<'_>) -> rusqlite::Result<SecretRow> {
    let idx = |field: SecretField| {
        columns
            .index(field)
            .ok_or_else(|| rusqlite::Error::InvalidColumnName(format!("{:?}", field)))
    };

    let secret_idx = idx(SecretField::Secret)?;
    let secret = match row.get_ref(secret_idx)? {
        ValueRef::Blob(b) | ValueRef::Text(b) => b.to_vec(),
        other => {
            return Err(rusqlite::Error::InvalidColumnType(
                secret_idx,
                "secret".into(),
                other.data_type(),
            ));
        }
    };

    Ok(SecretRow {
        id: row.get(idx(SecretField::Id)?)?,
        name: row.get(idx(SecretField::Name)?)?,
        secret_type: row.get(idx(SecretField::SecretType)?)?,
        secret,
        metadata: row.get(idx(SecretField::Metadata)?)?,
        created_at: row.get(idx(SecretField::CreatedAt)?)?,
        updated_at: row.get(idx(SecretField::UpdatedAt)?)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, VaultError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, VaultError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
