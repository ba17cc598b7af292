pub mod configuration;
pub use configuration::{Config, Environment, SystemEnvironment};

pub mod container_management;
pub use container_management::{ContainerEngine, DockerCli};

pub mod error_handling;

pub mod session_management;
pub use session_management::{Capabilities, Session};

pub mod video_recording;
pub use video_recording::{ContainerAction, RecordingState, VideoRecorder};

pub mod worker;
pub use worker::{
    CommandInterceptor, CommandRequest, CommandResponse, Registration, TeardownReason, Worker,
    WorkerFactory,
};
