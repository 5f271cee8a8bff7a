//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory; every key can be overridden
//! with a `FUEL_` environment variable (`FUEL_APP__LEVEL=debug`,
//! `FUEL_SERVER__PORT=8080`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! database = { sqlite = "fuel.db" }
//! bind = "127.0.0.1"
//! port = 3000
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("FUEL").separator("__"))
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_server() {
        let settings = Settings::from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            database = { sqlite = "fuel.db" }
            bind = "0.0.0.0"
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Sqlite("fuel.db".to_string()));
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_toml(
            r#"
            [server]
            database = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Memory);
        assert_eq!(server.bind, None);
        assert_eq!(server.port, 3000);
    }

    #[test]
    fn server_is_optional() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.server.is_none());
    }
}
