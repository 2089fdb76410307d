//! Config validation: required settings per backend and identifier safety.

use crate::config::StoreConfig;
use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").ok());

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.as_ref().map(|re| re.is_match(name)).unwrap_or(false)
}

pub fn validate(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.backend.needs_database() && config.database_url.is_none() {
        return Err(ConfigError::Missing(super::loader::DATABASE_URL_VAR));
    }
    if !is_valid_identifier(&config.schema) {
        return Err(ConfigError::Invalid {
            key: super::loader::SCHEMA_VAR,
            value: config.schema.clone(),
        });
    }
    if config.max_connections == 0 {
        return Err(ConfigError::Validation("max_connections must be at least 1".into()));
    }
    if config.body_limit == 0 {
        return Err(ConfigError::Validation("body_limit must be at least 1 byte".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("public"));
        assert!(is_valid_identifier("_app1"));
        assert!(!is_valid_identifier("1app"));
        assert!(!is_valid_identifier("app; drop"));
    }

    #[test]
    fn zero_connections_rejected() {
        let mut config = StoreConfig::filesystem("/tmp/x");
        config.max_connections = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }
}
