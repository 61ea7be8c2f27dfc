//! Application settings, read from `settings.toml` in the working
//! directory.
//!
//! The `[server]` section is optional; without it the binary only checks
//! the configuration and exits. A server without a `database` entry runs
//! in single-user local mode and persists JSON files under the
//! `[storage]` path.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the `haulbooks`, `server` and `engine` targets.
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Option<Database>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Scan {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    pub storage: Option<Storage>,
    pub scan: Option<Scan>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
