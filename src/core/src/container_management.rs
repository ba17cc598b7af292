//! Container engine access.
//!
//! The worker never creates containers; it only runs one-shot commands in,
//! copies files out of, and finally stops the container it was registered
//! with. Those three operations form the [`ContainerEngine`] trait so the
//! engine client can be injected per worker.
//!
//! Re-exports:
//! - [`ContainerEngine`]: the engine contract.
//! - [`DockerCli`]: implementation shelling out to the `docker` binary.
//! - [`ExecId`], [`ExecOutput`]: exec bookkeeping types.

pub mod docker_cli;
pub mod engine;
#[cfg(test)]
pub mod mock_engine;
#[cfg(test)]
pub mod tests;
pub mod types;

pub use docker_cli::DockerCli;
pub use engine::ContainerEngine;
pub use types::{ExecId, ExecOutput};
