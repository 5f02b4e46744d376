use std::env;

use thiserror::Error;

use crate::error::ValidationError;
use crate::pagination::PageConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error(transparent)]
    Pagination(#[from] ValidationError),
}

/// Settings read once at startup and handed to the state explicitly.
///
/// | Env Var                   | Default                         |
/// |---------------------------|---------------------------------|
/// | `DATABASE_URL`            | `sqlite://courses.db?mode=rwc`  |
/// | `HOST`                    | `127.0.0.1`                     |
/// | `PORT`                    | `3000`                          |
/// | `TOKEN`                   | required                        |
/// | `PAGINATOR_LIMIT_DEFAULT` | required                        |
/// | `PAGINATOR_LIMIT_MAX`     | `100`                           |
/// | `REQUEST_TIMEOUT_SECS`    | `5`                             |
/// | `DB_QUERY_TIMEOUT_SECS`   | `3`                             |
/// | `DB_MAX_CONNECTIONS`      | `5`                             |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token: String,
    pub page: PageConfig,
    pub request_timeout_secs: u64,
    pub db_query_timeout_secs: u64,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let token = required("TOKEN")?;
        let default_limit = required("PAGINATOR_LIMIT_DEFAULT")?;
        let max_limit = or_default("PAGINATOR_LIMIT_MAX", "100");
        let page = PageConfig::parse(&default_limit, &max_limit)?;

        Ok(Self {
            database_url: or_default("DATABASE_URL", "sqlite://courses.db?mode=rwc"),
            host: or_default("HOST", "127.0.0.1"),
            port: parse_var("PORT", or_default("PORT", "3000"))?,
            token,
            page,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", or_default("REQUEST_TIMEOUT_SECS", "5"))?,
            db_query_timeout_secs: parse_var("DB_QUERY_TIMEOUT_SECS", or_default("DB_QUERY_TIMEOUT_SECS", "3"))?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", or_default("DB_MAX_CONNECTIONS", "5"))?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TOKEN", "secret"),
            ("PAGINATOR_LIMIT_DEFAULT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:3000");
        assert_eq!(config.page.default_limit(), 10);
        assert_eq!(config.page.max_limit(), 100);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn requires_token_and_default_limit() {
        let err = AppConfig::from_lookup(lookup(&[("PAGINATOR_LIMIT_DEFAULT", "10")])).unwrap_err();
        assert_matches!(err, ConfigError::Missing("TOKEN"));

        let err = AppConfig::from_lookup(lookup(&[("TOKEN", "secret")])).unwrap_err();
        assert_matches!(err, ConfigError::Missing("PAGINATOR_LIMIT_DEFAULT"));
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("TOKEN", "secret"),
            ("PAGINATOR_LIMIT_DEFAULT", "ten"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Pagination(ValidationError::InvalidDefaultLimit(_)));

        let err = AppConfig::from_lookup(lookup(&[
            ("TOKEN", "secret"),
            ("PAGINATOR_LIMIT_DEFAULT", "10"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });
    }
}
