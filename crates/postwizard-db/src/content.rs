use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Statement};
use tracing::{debug, info};

use crate::error::{ContentError, SchemaError};
use crate::schema::{ColumnMap, ContentField, TableSchema, quote_ident};

/// One row of a partner dump, in table column order.
pub type ContentRecord = Vec<Value>;

/// A video parsed from a partner text dump, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRow {
    pub title: String,
    pub description: String,
    pub models: Option<String>,
    pub tags: Option<String>,
    pub date: String,
    pub duration: Option<String>,
    pub source_url: String,
    pub thumbnail_url: String,
    pub tracking_url: String,
    pub wp_slug: String,
}

/// Rows of an ad-hoc select, with the columns of that select.
#[derive(Debug)]
pub struct QueryRows {
    pub columns: ColumnMap<ContentField>,
    pub records: Vec<ContentRecord>,
}

/// A reflected partner dump database.
pub struct ContentDb {
    conn: Mutex<Connection>,
    path: PathBuf,
    columns: ColumnMap<ContentField>,
}

impl ContentDb {
    /// Open an existing dump and reflect its `table_number`-th table.
    pub fn open(path: &Path, table_number: usize) -> Result<Self, ContentError> {
        if !path.is_file() {
            return Err(SchemaError::InvalidDb {
                path: path.display().to_string(),
            }
            .into());
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let columns = ColumnMap::resolve(TableSchema::read(&conn, table_number)?);

        info!(
            "Content DB opened at {} (table {}, {} columns)",
            path.display(),
            columns.table(),
            columns.columns().len()
        );
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            columns,
        })
    }

    /// Write `rows` into a fresh `videos` table at `path`, replacing any
    /// previous import. Returns the number of rows inserted.
    pub fn import_videos(path: &Path, rows: &[VideoRow]) -> Result<usize, ContentError> {
        let mut conn = Connection::open(path)?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "
            DROP TABLE IF EXISTS videos;
            CREATE TABLE videos (
                title         TEXT,
                description   TEXT,
                models        TEXT,
                tags          TEXT,
                date          TEXT,
                duration      TEXT,
                source_url    TEXT,
                thumbnail_url TEXT,
                tracking_url  TEXT,
                wp_slug       TEXT
            );
            ",
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO videos VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.title,
                    row.description,
                    row.models,
                    row.tags,
                    row.date,
                    row.duration,
                    row.source_url,
                    row.thumbnail_url,
                    row.tracking_url,
                    row.wp_slug,
                ])?;
            }
        }
        tx.commit()?;
        info!("Imported {} videos into {}", rows.len(), path.display());
        Ok(rows.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &ColumnMap<ContentField> {
        &self.columns
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, ContentError>
    where
        F: FnOnce(&Connection) -> Result<T, ContentError>,
    {
        let conn = self.conn.lock().map_err(|_| ContentError::LockPoisoned)?;
        f(&conn)
    }

    /// Every row of the reflected table.
    pub fn records(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let sql = format!("SELECT * FROM {}", quote_ident(self.columns.table()));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            collect_records(&mut stmt)
        })
    }

    /// Run a partner-configured select.
    ///
    /// Records follow the select's own column list, so read them through
    /// the returned `columns` rather than [`ContentDb::columns`].
    pub fn query(&self, sql: &str) -> Result<QueryRows, ContentError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(|source| ContentError::InvalidSqlConfig {
                sql: sql.to_string(),
                source,
            })?;
            let schema = TableSchema {
                table: self.columns.table().to_string(),
                columns: stmt.column_names().into_iter().map(str::to_string).collect(),
            };
            let records = collect_records(&mut stmt)?;
            Ok(QueryRows {
                columns: ColumnMap::resolve(schema),
                records,
            })
        })
    }

    /// Whether `value` appears in the column holding `field`.
    /// A field with no column is never published.
    pub fn published(&self, field: ContentField, value: &str) -> Result<bool, ContentError> {
        let Some(column) = self.columns.column(field) else {
            debug!("{:?} has no column in {}", field, self.columns.table());
            return Ok(false);
        };
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1",
            quote_ident(self.columns.table()),
            quote_ident(column)
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            Ok(stmt.exists([value])?)
        })
    }
}

fn collect_records(stmt: &mut Statement<'_>) -> Result<Vec<ContentRecord>, ContentError> {
    let width = stmt.column_count();
    let records = stmt
        .query_map([], |row| (0..width).map(|i| row.get::<_, Value>(i)).collect())?
        .collect::<Result<Vec<ContentRecord>, _>>()?;
    Ok(records)
}
