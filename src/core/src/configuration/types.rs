use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Idle timeout applied when a session does not carry a usable `idleTimeout`.
pub const DEFAULT_MAX_TEST_IDLE_TIME_SECS: u64 = 90;
/// Interval between two idle watchdog checks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Files copied out of the container that are kept as recordings.
pub const DEFAULT_ARTIFACT_PATTERN: &str = r"(?i)\.(mp4|mkv)$";
/// Grace period handed to the engine when stopping the backing container.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;
/// Upper bound on one in-container recording command or artifact copy.
pub const DEFAULT_RECORDING_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Timing knobs for the worker lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub default_idle_timeout_secs: u64,
    /// Fractional values are accepted so tests and demos can poll faster than once a second.
    pub poll_interval_secs: f64,
    pub stop_timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            default_idle_timeout_secs: DEFAULT_MAX_TEST_IDLE_TIME_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS as f64,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl WorkerSettings {
    /// The watchdog period, or `None` if `poll_interval_secs` does not map to
    /// a non-zero [`Duration`].
    pub fn try_poll_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.poll_interval_secs)
            .ok()
            .filter(|period| !period.is_zero())
    }

    /// Falls back to the default period for values validation would reject.
    pub fn poll_interval(&self) -> Duration {
        self.try_poll_interval()
            .unwrap_or(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

/// In-container commands and paths used by the recording side-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub start_command: Vec<String>,
    pub stop_command: Vec<String>,
    /// Directory inside the container where the recorder writes its files.
    pub container_videos_dir: String,
    /// Host directory receiving retrieved recordings.
    pub artifacts_dir: PathBuf,
    /// Regex selecting which copied files count as recordings.
    pub artifact_pattern: String,
    /// Applied separately to each start/stop command and to the artifact copy.
    pub command_timeout_secs: u64,
}

impl RecordingConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            start_command: vec!["bash".into(), "-c".into(), "start-video".into()],
            stop_command: vec!["bash".into(), "-c".into(), "stop-video".into()],
            container_videos_dir: "/videos".to_string(),
            artifacts_dir: PathBuf::from("/tmp/videos"),
            artifact_pattern: DEFAULT_ARTIFACT_PATTERN.to_string(),
            command_timeout_secs: DEFAULT_RECORDING_COMMAND_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub docker_binary: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            docker_binary: "docker".to_string(),
        }
    }
}
