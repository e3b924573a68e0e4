//! Configuration management for the bookstore server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Variables that must be present (and non-empty) in the process environment
pub const REQUIRED_ENV_VARS: [&str; 4] = ["DB_USER", "DB_PASSWORD", "DB_HOST", "DB_NAME"];

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub name: String,
    /// `mongodb+srv` for DNS seed lists, `mongodb` for a plain host list
    pub scheme: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, optional files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let missing = missing_env_vars(|key| env::var(key).ok());
        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.scheme", "mongodb+srv")?
            .set_default("database.collection", "books")?
            .set_default("database.connect_timeout_secs", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix BOOKSTORE__ (e.g. BOOKSTORE__LOGGING__LEVEL)
            .add_source(
                Environment::with_prefix("BOOKSTORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.user", env::var("DB_USER").ok())?
            .set_override_option("database.password", env::var("DB_PASSWORD").ok())?
            .set_override_option("database.host", env::var("DB_HOST").ok())?
            .set_override_option("database.name", env::var("DB_NAME").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }
}

/// Names of required variables that `lookup` reports as absent or empty
pub fn missing_env_vars<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|key| lookup(key).map_or(true, |value| value.trim().is_empty()))
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_all_vars_present() {
        let vars = HashMap::from([
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "cluster0.example.net"),
            ("DB_NAME", "livraria"),
        ]);
        assert!(missing_env_vars(lookup_in(&vars)).is_empty());
    }

    #[test]
    fn test_reports_every_missing_var() {
        let vars = HashMap::from([("DB_USER", "reader"), ("DB_HOST", "   ")]);
        assert_eq!(
            missing_env_vars(lookup_in(&vars)),
            vec!["DB_PASSWORD", "DB_HOST", "DB_NAME"]
        );
    }

    #[test]
    fn test_default_port() {
        assert_eq!(ServerConfig::default().port, 3000);
    }
}
