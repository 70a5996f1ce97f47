// This file is part of the product Vademecum.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImportConfig {
    /// Upper bound on entries (categories, guidelines, tags, references) a
    /// single import file may hold.
    #[serde(default = "default_max_import_entries")]
    pub max_entries: usize,
}

fn default_max_import_entries() -> usize {
    10_000
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_import_entries(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl Config {
    /// Load `config.yaml` when present; a missing or blank file means the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|err| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), err))
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&raw).map_err(|err| {
            ConfigError::LoadError(format!("Failed to parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.import.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "import.max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn missing_file_yields_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-missing").expect("fixture root");
        let config =
            Config::load_or_default(&fixture.path().join("config.yaml")).expect("load config");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.import.max_entries, 10_000);
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_sections() {
        let fixture = TestFixtureRoot::new_unique("config-partial").expect("fixture root");
        let path = fixture.path().join("config.yaml");
        fs::write(&path, "logging:\n  level: debug\n").expect("write config");
        let config = Config::load_or_default(&path).expect("load config");
        assert_eq!(config.log_level_filter(), LevelFilter::Debug);
        assert_eq!(config.import.max_entries, 10_000);
    }

    #[test]
    fn zero_import_limit_is_rejected() {
        let fixture = TestFixtureRoot::new_unique("config-invalid").expect("fixture root");
        let path = fixture.path().join("config.yaml");
        fs::write(&path, "import:\n  max_entries: 0\n").expect("write config");
        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = Config {
            logging: LoggingConfig {
                level: "chatty".to_string(),
            },
            ..Config::default()
        };
        assert_eq!(config.log_level_filter(), LevelFilter::Info);
    }
}
