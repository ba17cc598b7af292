use super::types::*;
use crate::error_handling::types::ConfigError;
use crate::session_management::capabilities::Capabilities;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Worker configuration loaded from a TOML file.
///
/// Holds everything a worker needs that is not decided per session: lifecycle
/// timings, the in-container recording commands, the container engine binary
/// and the capability sets the backing container is able to serve.
///
/// # Examples
///
/// ```
/// use solo_node::configuration::Config;
///
/// let config = Config::from_toml_str(r#"
///     [worker]
///     default_idle_timeout_secs = 120
///
///     [[capabilities]]
///     browserName = "chrome"
///     platform = "LINUX"
/// "#).unwrap();
/// assert_eq!(config.worker.default_idle_timeout_secs, 120);
/// assert_eq!(config.capabilities.len(), 1);
/// ```
///
/// # Fields Overview
///
/// - `worker`: idle timeout default, watchdog poll interval and container stop timeout
/// - `recording`: start/stop commands run inside the container, where the
///   recorder writes, and where retrieved recordings land on the host
/// - `engine`: how to reach the container engine
/// - `capabilities`: declared browser/platform combinations, matched exactly at admission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub worker: WorkerSettings,
    pub recording: RecordingConfig,
    pub engine: EngineConfig,
    pub capabilities: Vec<Capabilities>,
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates configuration held in memory.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        debug!("Parsed configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker.try_poll_interval().is_none() {
            return Err(ConfigError::NotInRange(format!(
                "worker.poll_interval_secs must be a positive duration, got {}",
                self.worker.poll_interval_secs
            )));
        }
        if self.recording.command_timeout_secs == 0 {
            return Err(ConfigError::NotInRange(
                "recording.command_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.recording.start_command.is_empty() {
            return Err(ConfigError::Invalid(
                "recording.start_command must not be empty".to_string(),
            ));
        }
        if self.recording.stop_command.is_empty() {
            return Err(ConfigError::Invalid(
                "recording.stop_command must not be empty".to_string(),
            ));
        }
        if let Err(e) = regex::Regex::new(&self.recording.artifact_pattern) {
            return Err(ConfigError::Invalid(format!(
                "recording.artifact_pattern is not a valid regex: {}",
                e
            )));
        }
        if self.engine.docker_binary.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "engine.docker_binary must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.worker.default_idle_timeout_secs,
            DEFAULT_MAX_TEST_IDLE_TIME_SECS
        );
        assert_eq!(config.worker.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.worker.stop_timeout(), Duration::from_secs(5));
        assert_eq!(config.recording.container_videos_dir, "/videos");
        assert_eq!(config.recording.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.engine.docker_binary, "docker");
        assert!(config.capabilities.is_empty());
    }

    #[test]
    fn from_file_reads_every_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [worker]
            default_idle_timeout_secs = 30
            poll_interval_secs = 0.5
            stop_timeout_secs = 2

            [recording]
            start_command = ["sh", "-c", "record start"]
            stop_command = ["sh", "-c", "record stop"]
            container_videos_dir = "/recordings"
            artifacts_dir = "/srv/videos"

            [engine]
            docker_binary = "podman"

            [[capabilities]]
            browserName = "chrome"
            platform = "LINUX"

            [[capabilities]]
            browserName = "firefox"
            platform = "LINUX"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.worker.default_idle_timeout_secs, 30);
        assert_eq!(config.worker.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.worker.stop_timeout_secs, 2);
        assert_eq!(config.recording.start_command[2], "record start");
        assert_eq!(config.recording.container_videos_dir, "/recordings");
        assert_eq!(config.recording.artifacts_dir, PathBuf::from("/srv/videos"));
        assert_eq!(config.engine.docker_binary, "podman");
        assert_eq!(config.capabilities.len(), 2);
        assert_eq!(config.capabilities[1].browser_name(), Some("firefox"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Config::from_toml_str("[worker]\npoll_interval_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::NotInRange(_)));
    }

    #[test]
    fn poll_interval_rounding_to_zero_is_rejected() {
        let err = Config::from_toml_str("[worker]\npoll_interval_secs = 1e-12").unwrap_err();
        assert!(matches!(err, ConfigError::NotInRange(_)));
    }

    #[test]
    fn poll_interval_beyond_duration_range_is_rejected() {
        let err = Config::from_toml_str("[worker]\npoll_interval_secs = 1e30").unwrap_err();
        assert!(matches!(err, ConfigError::NotInRange(_)));

        let settings = WorkerSettings {
            poll_interval_secs: 1e30,
            ..WorkerSettings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_command_timeout_is_rejected() {
        let err = Config::from_toml_str("[recording]\ncommand_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::NotInRange(_)));
    }

    #[test]
    fn empty_recording_command_is_rejected() {
        let err = Config::from_toml_str("[recording]\nstart_command = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn invalid_artifact_pattern_is_rejected() {
        let err = Config::from_toml_str("[recording]\nartifact_pattern = \"(unclosed\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = Config::from_toml_str("[worker\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/solo-node.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
