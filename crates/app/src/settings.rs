use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Where the ledger database lives.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "String")]
pub enum Database {
    Memory,
    File(String),
}

impl From<String> for Database {
    fn from(value: String) -> Self {
        if value == ":memory:" {
            Database::Memory
        } else {
            Database::File(value)
        }
    }
}

impl Database {
    pub fn connection_url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::File(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub log_level: String,
    pub database: Database,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Read `settings.toml` from the working directory. Only `database` is
    /// required.
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("log_level", "info")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .add_source(File::with_name("settings"))
            .build()?
            .try_deserialize()
    }
}
