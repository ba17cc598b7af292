use crate::container_management::types::{ExecId, ExecOutput};
use crate::error_handling::types::ContainerError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Operations a worker needs from the container engine.
///
/// All calls are potentially slow I/O. Callers must not hold worker state
/// locks across them.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Prepares `command` to run inside `container_id`.
    async fn exec_create(
        &self,
        container_id: &str,
        command: &[String],
    ) -> Result<ExecId, ContainerError>;

    /// Runs a previously created exec instance and collects its output.
    /// A non-zero exit is reported through [`ExecOutput::exit_code`], not as an error.
    async fn exec_start(&self, exec_id: &ExecId) -> Result<ExecOutput, ContainerError>;

    /// Gracefully stops the container, killing it once `timeout` elapses.
    async fn stop_container(
        &self,
        container_id: &str,
        timeout: Duration,
    ) -> Result<(), ContainerError>;

    /// Copies the contents of `source` inside the container into the host
    /// directory `destination`.
    async fn copy_from_container(
        &self,
        container_id: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), ContainerError>;

    /// Convenience: create then start an exec instance.
    async fn exec(
        &self,
        container_id: &str,
        command: &[String],
    ) -> Result<ExecOutput, ContainerError> {
        let exec_id = self.exec_create(container_id, command).await?;
        self.exec_start(&exec_id).await
    }
}
