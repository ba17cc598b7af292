//! Common data types used across the video_recording subsystem.

use crate::configuration::environment::Environment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide switch for recording.
pub const VIDEO_RECORDING_ENABLED_ENV: &str = "SOLO_NODE_VIDEO_RECORDING_ENABLED";
/// Applied when the switch is unset or not a boolean.
pub const DEFAULT_VIDEO_RECORDING_ENABLED: bool = true;

/// Recorder lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingState {
    NotStarted,
    Recording,
    Stopped,
}

/// Actions sent to the recorder on session boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerAction {
    StartRecording,
    StopRecording,
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerAction::StartRecording => write!(f, "START_RECORDING"),
            ContainerAction::StopRecording => write!(f, "STOP_RECORDING"),
        }
    }
}

/// Reads the global recording switch from `env`.
pub fn read_env_var_for_video_recording(env: &dyn Environment) -> bool {
    env.get_bool_env_variable(VIDEO_RECORDING_ENABLED_ENV, DEFAULT_VIDEO_RECORDING_ENABLED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::environment::StaticEnvironment;

    #[test]
    fn recording_switch_defaults_on() {
        assert!(read_env_var_for_video_recording(&StaticEnvironment::new()));
    }

    #[test]
    fn recording_switch_falls_back_on_nonsense() {
        let env = StaticEnvironment::new().with(VIDEO_RECORDING_ENABLED_ENV, "any_nonsense_value");
        assert_eq!(
            read_env_var_for_video_recording(&env),
            DEFAULT_VIDEO_RECORDING_ENABLED
        );
    }

    #[test]
    fn recording_switch_can_be_disabled() {
        let env = StaticEnvironment::new().with(VIDEO_RECORDING_ENABLED_ENV, "false");
        assert!(!read_env_var_for_video_recording(&env));
    }
}
