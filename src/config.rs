use std::env;

const DEFAULT_DATABASE_URL: &str = "food-manager.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads `DATABASE_URL`, `HOST`, `PORT`
    /// and `DATABASE_POOL_SIZE`. Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let port = match lookup("PORT") {
            Some(value) => parse_number("PORT", value)?,
            None => defaults.port,
        };
        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(value) => parse_number("DATABASE_POOL_SIZE", value)?,
            None => defaults.pool_size,
        };
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                value: "0".to_string(),
                reason: "pool needs at least one connection".to_string(),
            });
        }
        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            pool_size,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_number<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("DATABASE_URL", ":memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("DATABASE_POOL_SIZE", "2"),
        ])
        .unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 9000));
        assert_eq!(config.pool_size, 2);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PORT has an invalid value 'eighty'"));

        assert!(config_from(&[("DATABASE_POOL_SIZE", "0")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }
}
