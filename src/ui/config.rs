use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use race_replay::ReplayError;
use race_replay::api::{DEFAULT_REQUEST_TIMEOUT_S, DEFAULT_SERVER_URL};
use race_replay::replay::DEFAULT_SPEED_INDEX;
use race_replay::replay::transform::DEFAULT_RIGHT_MARGIN;
use race_replay::session::SessionType;

const CONFIG_DIR_NAME: &str = "race-replay";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) server_url: String,
    pub(crate) request_timeout_s: u64,
    pub(crate) last_year: Option<i32>,
    pub(crate) last_round: Option<u32>,
    pub(crate) last_session_type: SessionType,
    pub(crate) speed_index: usize,
    pub(crate) right_margin: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
            last_year: None,
            last_round: None,
            last_session_type: SessionType::default(),
            speed_index: DEFAULT_SPEED_INDEX,
            right_margin: DEFAULT_RIGHT_MARGIN,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    Some(
        dirs::config_dir()?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

impl AppConfig {
    /// Loads the user's config, `None` when there is none or it is unreadable.
    pub(crate) fn from_local_file() -> Option<Self> {
        let path = config_path()?;
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {:?}: {}", path, e);
                None
            }
        }
    }

    pub(crate) fn from_path(path: &Path) -> Result<Option<Self>, ReplayError> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path).map_err(|e| ReplayError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(file)
            .map_err(|e| ReplayError::ConfigSerializeError { source: e })?;
        Ok(Some(config))
    }

    pub(crate) fn save(&self) -> Result<(), ReplayError> {
        let path = config_path().ok_or(ReplayError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub(crate) fn save_to(&self, path: &Path) -> Result<(), ReplayError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ReplayError::ConfigIOError { source: e })?;
        }

        let file = File::create(path).map_err(|e| ReplayError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| ReplayError::ConfigSerializeError { source: e })
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let config = AppConfig::from_path(&dir.path().join("config.json")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_save_and_reload_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            server_url: "http://replay.local:9000".to_string(),
            last_year: Some(2024),
            last_round: Some(5),
            last_session_type: SessionType::Sprint,
            speed_index: 4,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        let reloaded = AppConfig::from_path(&path).unwrap().unwrap();

        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_year": 2023}"#).unwrap();

        let config = AppConfig::from_path(&path).unwrap().unwrap();

        assert_eq!(config.last_year, Some(2023));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.speed_index, DEFAULT_SPEED_INDEX);
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            AppConfig::from_path(&path),
            Err(ReplayError::ConfigSerializeError { .. })
        ));
    }
}
