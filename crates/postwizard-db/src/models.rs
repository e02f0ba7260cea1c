/// Database row types. These map directly to SQLite rows.
/// Distinct from postwizard-types provider models to keep the DB layer independent.
use postwizard_types::SecretType;

/// One vault row. `secret` is the Fernet token, still encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRow {
    pub id: i64,
    pub name: String,
    pub secret_type: String,
    pub secret: Vec<u8>,
    pub metadata: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl SecretRow {
    /// Parsed tag; `None` for rows written with a tag this build doesn't know.
    pub fn kind(&self) -> Option<SecretType> {
        self.secret_type.parse().ok()
    }

    pub fn metadata_str(&self) -> &str {
        self.metadata.as_deref().unwrap_or_default()
    }
}

/// Columns that may be searched with `LIKE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretColumn {
    Name,
    SecretType,
    Metadata,
}

impl SecretColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SecretColumn::Name => "name",
            SecretColumn::SecretType => "secret_type",
            SecretColumn::Metadata => "metadata",
        }
    }
}
