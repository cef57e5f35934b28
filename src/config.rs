use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::error::Result;

/// `(cycle_ms, beginning_of_time_ms)` must be stable across restarts for
/// cycle numbers to remain comparable, so these are read from a file rather
/// than re-derived at each launch.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    pub beginning_of_time_ms: i64,
    pub cycle_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_path")]
    pub log_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: default_log_level(), log_file: default_log_path() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("control_plane.log")
}

impl LoggingConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Top-level process configuration, loaded once at startup from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlPlaneConfig {
    pub clock: ClockConfig,
    pub actor: ActorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ControlPlaneConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: ControlPlaneConfig = toml::from_str(&data)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let toml = r#"
            [clock]
            beginning_of_time_ms = 0
            cycle_ms = 1000

            [actor]
            name = "authority-1"
            category = "authority"
        "#;
        let config: ControlPlaneConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.clock.cycle_ms, 1000);
        assert_eq!(config.logging.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn from_file_round_trips_through_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [clock]
            beginning_of_time_ms = 500
            cycle_ms = 250

            [actor]
            name = "broker-1"
            category = "broker"

            [logging]
            level = "debug"
            "#
        )
        .unwrap();

        let config = ControlPlaneConfig::from_file(file.path()).unwrap();
        assert_eq!(config.clock.beginning_of_time_ms, 500);
        assert_eq!(config.actor.name, "broker-1");
        assert_eq!(config.logging.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn from_file_missing_path_is_an_error() {
        let result = ControlPlaneConfig::from_file(Path::new("/nonexistent/control-plane.toml"));
        assert!(result.is_err());
    }
}
