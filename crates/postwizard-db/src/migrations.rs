use rusqlite::Connection;
use tracing::info;

pub const SECRETS_TABLE: &str = "secrets";

/// Bring a vault file up to the current schema.
///
/// Vaults created before versioning already have the `secrets` table, so v1
/// uses `IF NOT EXISTS` and simply records itself.
pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Vault: running migration v1 (secrets table)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS secrets (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                secret_type TEXT NOT NULL,
                secret      BLOB NOT NULL,
                metadata    TEXT,
                created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Vault: running migration v2 (lookup indexes)");
        conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_secrets_type ON secrets(secret_type);
            CREATE INDEX IF NOT EXISTS idx_secrets_name ON secrets(name, secret_type);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn legacy_vault_is_adopted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE secrets (id INTEGER PRIMARY KEY, name TEXT NOT NULL, secret_type TEXT NOT NULL,
             secret BLOB NOT NULL, metadata TEXT, created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
             updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP);
             INSERT INTO secrets (name, secret_type, secret) VALUES ('BraveAPI', 'brave_api_key', x'00');",
        )
        .unwrap();
        run(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM secrets", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
