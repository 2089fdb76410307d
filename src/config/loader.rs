//! Load store config from environment variables (with `.env` support).

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::path::PathBuf;

pub const BACKEND_VAR: &str = "ENTITY_BACKEND";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const SCHEMA_VAR: &str = "ENTITY_SCHEMA";
pub const DATA_DIR_VAR: &str = "ENTITY_DATA_DIR";
pub const MAX_CONNECTIONS_VAR: &str = "ENTITY_MAX_CONNECTIONS";
pub const BODY_LIMIT_VAR: &str = "ENTITY_BODY_LIMIT";

/// Read `.env` if present, then build config from the process environment.
pub fn from_env() -> Result<StoreConfig, ConfigError> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build config from any key lookup. Empty values count as unset.
pub fn from_lookup<F>(lookup: F) -> Result<StoreConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let backend = match get(BACKEND_VAR) {
        Some(v) => v.parse()?,
        None => BackendKind::Filesystem,
    };
    let config = StoreConfig {
        backend,
        database_url: get(DATABASE_URL_VAR),
        schema: get(SCHEMA_VAR).unwrap_or_else(default_schema),
        data_dir: get(DATA_DIR_VAR).map(PathBuf::from).unwrap_or_else(default_data_dir),
        max_connections: parse_number(MAX_CONNECTIONS_VAR, get(MAX_CONNECTIONS_VAR))?
            .unwrap_or_else(default_max_connections),
        body_limit: parse_number(BODY_LIMIT_VAR, get(BODY_LIMIT_VAR))?.unwrap_or_else(default_body_limit),
    };
    validate(&config)?;
    Ok(config)
}

fn parse_number<N: std::str::FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<N>, ConfigError> {
    raw.map(|v| {
        v.trim()
            .parse::<N>()
            .map_err(|_| ConfigError::Invalid { key, value: v.clone() })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_to_filesystem() {
        let config = from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, BackendKind::Filesystem);
        assert_eq!(config.schema, "public");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn sql_backend_needs_database_url() {
        let err = from_lookup(lookup(&[(BACKEND_VAR, "relational")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATABASE_URL_VAR)));

        let config = from_lookup(lookup(&[
            (BACKEND_VAR, "Document"),
            (DATABASE_URL_VAR, "postgres://localhost/entities"),
            (SCHEMA_VAR, "app"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::Document);
        assert_eq!(config.schema, "app");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(from_lookup(lookup(&[(BACKEND_VAR, "redis")])).is_err());
        assert!(from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "many")])).is_err());
        assert!(from_lookup(lookup(&[(SCHEMA_VAR, "bad schema")])).is_err());
    }
}
