//! Handles settings for the application.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! `settings.toml` in the working directory, `FINANCAS_*` environment
//! variables (`FINANCAS_SERVER__PORT=9000`) and finally `MONGODB_URI`.
use std::env;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub kind: DatabaseKind,
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub log: Log,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("FINANCAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.uri", env::var("MONGODB_URI").ok())?;

        Self::with_defaults(builder)
    }

    fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("log.level", "info")?
            .set_default("database.kind", "mongo")?
            .set_default("database.uri", "mongodb://localhost:27017")?
            .set_default("database.name", "financas")?
            .build()?
            .try_deserialize()
    }
}
