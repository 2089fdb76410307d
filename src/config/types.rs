//! Store configuration types.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Document,
    Relational,
    Filesystem,
}

impl BackendKind {
    pub fn needs_database(self) -> bool {
        matches!(self, BackendKind::Document | BackendKind::Relational)
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "mongo" => Ok(BackendKind::Document),
            "relational" | "sql" => Ok(BackendKind::Relational),
            "filesystem" | "nodb" | "file" => Ok(BackendKind::Filesystem),
            _ => Err(ConfigError::Invalid {
                key: super::loader::BACKEND_VAR,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendKind::Document => "document",
            BackendKind::Relational => "relational",
            BackendKind::Filesystem => "filesystem",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Required for the document and relational backends.
    #[serde(default)]
    pub database_url: Option<String>,
    /// PostgreSQL schema holding collections and tables.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Directory of the filesystem backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

pub(crate) fn default_schema() -> String {
    "public".into()
}

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub(crate) fn default_max_connections() -> u32 {
    5
}

pub(crate) fn default_body_limit() -> usize {
    1024 * 1024
}

impl StoreConfig {
    /// Filesystem store rooted at `dir`, everything else defaulted.
    pub fn filesystem(dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            backend: BackendKind::Filesystem,
            database_url: None,
            schema: default_schema(),
            data_dir: dir.into(),
            max_connections: default_max_connections(),
            body_limit: default_body_limit(),
        }
    }

    /// PostgreSQL-backed store of the given kind.
    pub fn postgres(backend: BackendKind, database_url: &str) -> Self {
        StoreConfig {
            backend,
            database_url: Some(database_url.to_string()),
            ..Self::filesystem(default_data_dir())
        }
    }
}
