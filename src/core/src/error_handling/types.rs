use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlError(err.to_string())
    }
}

#[derive(Debug)]
pub enum ContainerError {
    RuntimeNotAvailable,
    UnknownExec(String),
    ExecFailed(String),
    StopFailed(String),
    CopyFailed(String),
    Timeout(String),
    IoError(std::io::Error),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::RuntimeNotAvailable => write!(f, "Container runtime not available"),
            ContainerError::UnknownExec(e) => write!(f, "Unknown exec instance: {}", e),
            ContainerError::ExecFailed(e) => write!(f, "Container exec failed: {}", e),
            ContainerError::StopFailed(e) => write!(f, "Container stop failed: {}", e),
            ContainerError::CopyFailed(e) => write!(f, "Container copy failed: {}", e),
            ContainerError::Timeout(e) => write!(f, "Container operation timed out: {}", e),
            ContainerError::IoError(e) => write!(f, "Container IO error: {}", e),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<std::io::Error> for ContainerError {
    fn from(err: std::io::Error) -> Self {
        ContainerError::IoError(err)
    }
}

#[derive(Debug)]
pub enum RecordingError {
    ContainerError(ContainerError),
    ArtifactError(std::io::Error),
    NoArtifact,
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::ContainerError(e) => write!(f, "Recording container error: {}", e),
            RecordingError::ArtifactError(e) => write!(f, "Recording artifact error: {}", e),
            RecordingError::NoArtifact => write!(f, "No recording artifact found in container"),
        }
    }
}

impl std::error::Error for RecordingError {}

impl From<ContainerError> for RecordingError {
    fn from(err: ContainerError) -> Self {
        RecordingError::ContainerError(err)
    }
}

#[derive(Debug)]
pub enum WorkerError {
    ConfigurationError(ConfigError),
    ContainerError(ContainerError),
    InitializationFailed(String),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            WorkerError::ContainerError(e) => write!(f, "Container error: {}", e),
            WorkerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for WorkerError {}

impl From<ConfigError> for WorkerError {
    fn from(err: ConfigError) -> Self {
        WorkerError::ConfigurationError(err)
    }
}

impl From<ContainerError> for WorkerError {
    fn from(err: ContainerError) -> Self {
        WorkerError::ContainerError(err)
    }
}
