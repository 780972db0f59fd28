//! Settings for opening entity managers.
//!
//! Settings are layered: built-in defaults, then an optional settings file
//! (any format the `config` crate understands, typically `rowkeeper.toml`),
//! then environment variables such as `ROWKEEPER_DATABASE__PATH`.
//!
//! ```toml
//! [database]
//! mode = "file"            # or "memory"
//! path = "notes.db"
//! busy_timeout_ms = 500
//! init_script = "pragma foreign_keys = on;"
//! ```

use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::error::{OrmError, Result};
use crate::manager::PersistenceMode;

pub const DEFAULT_SETTINGS_FILE: &str = "rowkeeper.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub mode: String,
    pub path: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    /// SQL executed on every new connection.
    pub init_script: Option<String>,
}

impl Settings {
    /// Loads settings from an optional file and the environment.
    /// A missing file is not an error.
    pub fn load(file: Option<&str>) -> Result<Self> {
        let mut builder = Self::defaults()?;
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("ROWKEEPER")
                .prefix_separator("_")
                .separator("__"),
        );
        Ok(builder.build()?.try_deserialize()?)
    }
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder().set_default("database.mode", "memory")?)
    }
    pub fn persistence_mode(&self) -> Result<PersistenceMode> {
        match (self.database.mode.to_lowercase().as_str(), &self.database.path) {
            ("memory", _) => Ok(PersistenceMode::InMemory),
            ("file", Some(path)) if !path.trim().is_empty() => Ok(PersistenceMode::File(path.clone())),
            ("file", _) => Err(OrmError::Config(
                "database.path must be set when database.mode is 'file'".into(),
            )),
            (other, _) => Err(OrmError::Config(format!(
                "unknown database.mode '{}', expected 'memory' or 'file'",
                other
            ))),
        }
    }
    pub fn busy_timeout(&self) -> Option<Duration> {
        self.database.busy_timeout_ms.map(Duration::from_millis)
    }
}
