/// Schema reflection for SQLite files whose layout is only known at runtime.
///
/// Partner dumps name and order their columns differently. Instead of
/// guessing a column on every read, a `ColumnMap` resolves each logical field
/// to a column index once, from a static alias table, and reads go through
/// that map.
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::error::SchemaError;

/// A logical field set for one kind of table.
pub trait SchemaField: Copy + Eq + Hash + Debug + 'static {
    const ALL: &'static [Self];

    /// Column names (lowercase) that hold this field.
    fn aliases(&self) -> &'static [&'static str];
}

/// Table name and column order as reported by SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<String>,
}

/// User tables in creation order.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>, SchemaError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != 'schema_version'
         ORDER BY rowid",
    )?;
    let tables = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(tables)
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl TableSchema {
    /// Reflect the `table_number`-th user table.
    pub fn read(conn: &Connection, table_number: usize) -> Result<Self, SchemaError> {
        let tables = list_tables(conn)?;
        if tables.is_empty() {
            return Err(SchemaError::InvalidDb {
                path: conn.path().unwrap_or(":memory:").to_string(),
            });
        }
        let table = tables
            .get(table_number)
            .ok_or(SchemaError::TableIndexOutOfRange {
                index: table_number,
                available: tables.len(),
            })?;
        Self::read_table(conn, table)
    }

    pub fn read_table(conn: &Connection, table: &str) -> Result<Self, SchemaError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        // (cid, name, type, notnull, dflt_value, pk); rows come in cid order
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(SchemaError::InvalidDb {
                path: conn.path().unwrap_or(":memory:").to_string(),
            });
        }
        debug!("Reflected table {} with {} columns", table, columns.len());
        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }
}

/// Field to column index mapping, resolved once per table.
#[derive(Debug, Clone)]
pub struct ColumnMap<F: SchemaField> {
    schema: TableSchema,
    index: HashMap<F, usize>,
    ambiguous: Vec<F>,
}

impl<F: SchemaField> ColumnMap<F> {
    pub fn resolve(schema: TableSchema) -> Self {
        Self::resolve_with(schema, &HashMap::new())
    }

    /// Resolve with per-source alias overrides, tried before the built-in aliases.
    ///
    /// Exact (case-insensitive) matches win. A field left without an exact
    /// match falls back to a column having one of its aliases as an
    /// underscore-separated part, among columns no other field claimed.
    pub fn resolve_with(schema: TableSchema, overrides: &HashMap<F, Vec<String>>) -> Self {
        let lowered: Vec<String> = schema.columns.iter().map(|c| c.to_lowercase()).collect();
        let mut index = HashMap::new();
        let mut ambiguous = Vec::new();

        for &field in F::ALL {
            let aliases: Vec<String> = overrides
                .get(&field)
                .into_iter()
                .flatten()
                .map(|a| a.to_lowercase())
                .chain(field.aliases().iter().map(|a| a.to_string()))
                .collect();

            let hits: Vec<usize> = lowered
                .iter()
                .enumerate()
                .filter(|(_, col)| aliases.iter().any(|a| a == *col))
                .map(|(i, _)| i)
                .collect();

            if let Some(&first) = hits.first() {
                if hits.len() > 1 {
                    warn!(
                        "{:?} matches {} columns in {}, using {}",
                        field,
                        hits.len(),
                        schema.table,
                        schema.columns[first]
                    );
                    ambiguous.push(field);
                }
                index.insert(field, first);
            }
        }

        // A column serves one field; loose matches claim theirs in field order.
        let mut claimed: HashSet<usize> = index.values().copied().collect();
        for &field in F::ALL {
            if index.contains_key(&field) {
                continue;
            }
            let hits: Vec<usize> = lowered
                .iter()
                .enumerate()
                .filter(|(i, col)| {
                    !claimed.contains(i)
                        && col.split('_').any(|part| field.aliases().contains(&part))
                })
                .map(|(i, _)| i)
                .collect();
            if let Some(&first) = hits.first() {
                if hits.len() > 1 {
                    warn!(
                        "{:?} loosely matches {} columns in {}, using {}",
                        field,
                        hits.len(),
                        schema.table,
                        schema.columns[first]
                    );
                    ambiguous.push(field);
                }
                claimed.insert(first);
                index.insert(field, first);
            }
        }

        Self {
            schema,
            index,
            ambiguous,
        }
    }

    pub fn table(&self) -> &str {
        &self.schema.table
    }

    pub fn columns(&self) -> &[String] {
        &self.schema.columns
    }

    pub fn index(&self, field: F) -> Option<usize> {
        self.index.get(&field).copied()
    }

    pub fn column(&self, field: F) -> Option<&str> {
        self.index(field).map(|i| self.schema.columns[i].as_str())
    }

    pub fn ambiguous(&self) -> &[F] {
        &self.ambiguous
    }

    /// Fields with no column in this table.
    pub fn missing(&self) -> Vec<F> {
        F::ALL
            .iter()
            .copied()
            .filter(|f| !self.index.contains_key(f))
            .collect()
    }

    /// Fail unless every field in `required` has a column.
    pub fn require(&self, required: &[F]) -> Result<(), SchemaError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|f| !self.index.contains_key(f))
            .map(|f| format!("{:?}", f))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns {
                table: self.schema.table.clone(),
                missing: missing.join(", "),
            })
        }
    }

    /// Value of `field` in a row read with `SELECT *`.
    ///
    /// `None` when the field has no column or the row is shorter than the schema.
    pub fn get<'r>(&self, record: &'r [Value], field: F) -> Option<&'r Value> {
        self.index(field).and_then(|i| record.get(i))
    }

    /// Text form of `field`; `NULL` and blobs read as `None`.
    pub fn get_text(&self, record: &[Value], field: F) -> Option<String> {
        self.get(record, field).and_then(value_to_text)
    }
}

pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

/// Columns of the vault's `secrets` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretField {
    Id,
    Name,
    SecretType,
    Secret,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

impl SchemaField for SecretField {
    const ALL: &'static [Self] = &[
        SecretField::Id,
        SecretField::Name,
        SecretField::SecretType,
        SecretField::Secret,
        SecretField::Metadata,
        SecretField::CreatedAt,
        SecretField::UpdatedAt,
    ];

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            SecretField::Id => &["id"],
            SecretField::Name => &["name"],
            SecretField::SecretType => &["secret_type"],
            SecretField::Secret => &["secret"],
            SecretField::Metadata => &["metadata"],
            SecretField::CreatedAt => &["created_at"],
            SecretField::UpdatedAt => &["updated_at"],
        }
    }
}

/// Logical fields of a partner content dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    Id,
    Title,
    Description,
    Slug,
    Date,
    Duration,
    Embed,
    Thumbnail,
    Categories,
    Rating,
    Link,
    Url,
    Source,
    Tracking,
    Pornstars,
    Models,
    Resolution,
    Tags,
    Likes,
    Studio,
    Trailer,
    Orientation,
    SiteName,
}

impl SchemaField for ContentField {
    const ALL: &'static [Self] = &[
        ContentField::Id,
        ContentField::Title,
        ContentField::Description,
        ContentField::Slug,
        ContentField::Date,
        ContentField::Duration,
        ContentField::Embed,
        ContentField::Thumbnail,
        ContentField::Categories,
        ContentField::Rating,
        ContentField::Link,
        ContentField::Url,
        ContentField::Source,
        ContentField::Tracking,
        ContentField::Pornstars,
        ContentField::Models,
        ContentField::Resolution,
        ContentField::Tags,
        ContentField::Likes,
        ContentField::Studio,
        ContentField::Trailer,
        ContentField::Orientation,
        ContentField::SiteName,
    ];

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ContentField::Id => &["id"],
            ContentField::Title => &["title", "name"],
            ContentField::Description => &["description", "desc"],
            ContentField::Slug => &["slug", "wp_slug"],
            ContentField::Date => &["date"],
            ContentField::Duration => &["duration"],
            ContentField::Embed => &["embed", "embeds"],
            ContentField::Thumbnail => &["thumb", "thumbs", "thumbnail", "thumbnails", "thumbnail_url"],
            ContentField::Categories => &["category", "categories"],
            ContentField::Rating => &["rating", "ratings"],
            ContentField::Link => &["link", "links"],
            ContentField::Url => &["url", "urls"],
            ContentField::Source => &["source", "source_url"],
            ContentField::Tracking => &["tracking", "tracking_url"],
            ContentField::Pornstars => &["pornstar", "pornstars"],
            ContentField::Models => &["model", "models"],
            ContentField::Resolution => &["resolution"],
            ContentField::Tags => &["tag", "tags"],
            ContentField::Likes => &["like", "likes"],
            ContentField::Studio => &["studio", "studios"],
            ContentField::Trailer => &["trailer", "trailers"],
            ContentField::Orientation => &["orientation"],
            ContentField::SiteName => &["site_name", "site", "partner"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn reads_table_by_position() {
        let conn = conn_with(
            "CREATE TABLE first (a TEXT);
             CREATE TABLE embeds (Title TEXT, duration TEXT, embed TEXT);",
        );
        let schema = TableSchema::read(&conn, 1).unwrap();
        assert_eq!(schema.table, "embeds");
        assert_eq!(schema.columns, vec!["Title", "duration", "embed"]);

        assert!(matches!(
            TableSchema::read(&conn, 5),
            Err(SchemaError::TableIndexOutOfRange { index: 5, available: 2 })
        ));
    }

    #[test]
    fn empty_database_is_invalid() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            TableSchema::read(&conn, 0),
            Err(SchemaError::InvalidDb { .. })
        ));
    }

    #[test]
    fn resolves_fields_case_insensitively() {
        let conn = conn_with("CREATE TABLE embeds (Title TEXT, DURATION TEXT, categories TEXT, thumbnail_url TEXT, source_url TEXT);");
        let map: ColumnMap<ContentField> = ColumnMap::resolve(TableSchema::read(&conn, 0).unwrap());

        assert_eq!(map.index(ContentField::Title), Some(0));
        assert_eq!(map.index(ContentField::Duration), Some(1));
        assert_eq!(map.column(ContentField::Categories), Some("categories"));
        assert_eq!(map.index(ContentField::Thumbnail), Some(3));
        assert_eq!(map.index(ContentField::Source), Some(4));
        // every *_url column is already claimed exactly
        assert_eq!(map.index(ContentField::Url), None);
        assert!(map.missing().contains(&ContentField::Tags));
    }

    #[test]
    fn loose_match_and_ambiguity() {
        let schema = TableSchema {
            table: "feed".into(),
            columns: vec!["video_title".into(), "main_tags".into(), "extra_tags".into()],
        };
        let map: ColumnMap<ContentField> = ColumnMap::resolve(schema);
        assert_eq!(map.index(ContentField::Title), Some(0));
        assert_eq!(map.index(ContentField::Tags), Some(1));
        assert!(map.ambiguous().contains(&ContentField::Tags));
    }

    #[test]
    fn loose_column_serves_one_field() {
        let schema = TableSchema {
            table: "feed".into(),
            columns: vec!["model_tags".into()],
        };
        let map: ColumnMap<ContentField> = ColumnMap::resolve(schema);
        assert_eq!(map.index(ContentField::Models), Some(0));
        assert_eq!(map.index(ContentField::Tags), None);

        let schema = TableSchema {
            table: "feed".into(),
            columns: vec!["model_tags".into(), "extra_tags".into()],
        };
        let map: ColumnMap<ContentField> = ColumnMap::resolve(schema);
        assert_eq!(map.index(ContentField::Models), Some(0));
        assert_eq!(map.index(ContentField::Tags), Some(1));
        assert!(!map.ambiguous().contains(&ContentField::Tags));
    }

    #[test]
    fn overrides_take_precedence() {
        let schema = TableSchema {
            table: "feed".into(),
            columns: vec!["headline".into(), "title".into()],
        };
        let overrides = HashMap::from([(ContentField::Title, vec!["Headline".to_string()])]);
        let map: ColumnMap<ContentField> = ColumnMap::resolve_with(schema, &overrides);
        assert_eq!(map.index(ContentField::Title), Some(0));
        assert!(map.ambiguous().contains(&ContentField::Title));
    }

    #[test]
    fn get_tolerates_short_rows_and_missing_fields() {
        let schema = TableSchema {
            table: "feed".into(),
            columns: vec!["title".into(), "duration".into(), "tags".into()],
        };
        let map: ColumnMap<ContentField> = ColumnMap::resolve(schema);
        let row = vec![Value::Text("Clip".into()), Value::Integer(320)];

        assert_eq!(map.get_text(&row, ContentField::Title).as_deref(), Some("Clip"));
        assert_eq!(map.get_text(&row, ContentField::Duration).as_deref(), Some("320"));
        assert_eq!(map.get(&row, ContentField::Tags), None);
        assert_eq!(map.get(&row, ContentField::Studio), None);
    }

    #[test]
    fn require_lists_missing_columns() {
        let schema = TableSchema {
            table: "secrets".into(),
            columns: vec!["id".into(), "name".into()],
        };
        let map: ColumnMap<SecretField> = ColumnMap::resolve(schema);
        let err = map.require(SecretField::ALL).unwrap_err();
        assert!(err.to_string().contains("Secret"));
    }
}
