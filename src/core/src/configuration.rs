//! Worker configuration: the TOML file layout and the process environment accessor.

pub mod config;
pub mod environment;
pub mod types;

pub use config::Config;
pub use environment::{Environment, StaticEnvironment, SystemEnvironment};
pub use types::{EngineConfig, RecordingConfig, WorkerSettings};
