//! Runtime settings for signform.
//!
//! Values come from built-in defaults, then an optional `signform.toml` in the
//! working directory, then `SIGNFORM_*` environment variables
//! (e.g. `SIGNFORM_DATABASE_PATH`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding the credential table. `:memory:` keeps it in RAM.
    pub database_path: String,
    /// Process-wide name the credential store is registered under.
    pub connection_name: String,
    /// File receiving log output while the terminal is in raw mode.
    pub log_file: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("signform").required(false))
            .add_source(Environment::with_prefix("SIGNFORM"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database_path", "signform.db")?
            .set_default("connection_name", "signform")?
            .set_default("log_file", "signform.log")?
            .set_default("log_level", "info")
    }

    pub fn in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_apply_without_sources() {
        let cfg: AppConfig = AppConfig::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.database_path, "signform.db");
        assert_eq!(cfg.connection_name, "signform");
        assert_eq!(cfg.log_file, "signform.log");
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.in_memory());
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg: AppConfig = AppConfig::builder()
            .unwrap()
            .add_source(File::from_str(
                "database_path = \":memory:\"\nlog_level = \"debug\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(cfg.in_memory());
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.connection_name, "signform");
    }
}
