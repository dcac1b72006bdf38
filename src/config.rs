use std::env;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://collab.db?mode=rwc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be a positive number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub invitation_ttl_days: i64,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            port: number_var("PORT", 3000)?,
            db_max_connections: number_var("DB_MAX_CONNECTIONS", 10)?,
            invitation_ttl_days: number_var("INVITATION_TTL_DAYS", 7)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        })
    }

    pub fn is_postgres(&self) -> bool {
        self.database_url.starts_with("postgres://") || self.database_url.starts_with("postgresql://")
    }

    pub fn invitation_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.invitation_ttl_days)
    }
}

fn number_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => Ok(value),
            _ => Err(ConfigError::InvalidNumber { var, value: raw }),
        },
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: 3000,
            db_max_connections: 10,
            invitation_ttl_days: 7,
            log_dir: "./logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_urls_select_postgres_backend() {
        let mut config = Config::default();
        assert!(!config.is_postgres());

        config.database_url = "postgresql://collab@localhost/collab".to_string();
        assert!(config.is_postgres());

        config.database_url = "postgres://collab@localhost/collab".to_string();
        assert!(config.is_postgres());
    }

    #[test]
    fn invitation_ttl_is_in_days() {
        let config = Config { invitation_ttl_days: 3, ..Config::default() };
        assert_eq!(config.invitation_ttl(), chrono::Duration::days(3));
    }
}
