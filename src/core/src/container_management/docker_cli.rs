use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

use crate::container_management::engine::ContainerEngine;
use crate::container_management::types::{ExecId, ExecOutput};
use crate::error_handling::types::ContainerError;

/// Extra time granted to the CLI on top of the engine-side stop timeout
/// before the call is abandoned.
const STOP_CALL_GRACE: Duration = Duration::from_secs(10);

/// [`ContainerEngine`] backed by the `docker` command line client.
///
/// The CLI has no separate "create exec" step, so [`exec_create`] only
/// registers the command under a fresh id and [`exec_start`] runs
/// `docker exec` for it. Each exec id can be started once.
///
/// [`exec_create`]: ContainerEngine::exec_create
/// [`exec_start`]: ContainerEngine::exec_start
pub struct DockerCli {
    binary: String,
    pending_execs: Mutex<HashMap<ExecId, PendingExec>>,
}

#[derive(Debug, Clone)]
struct PendingExec {
    container_id: String,
    command: Vec<String>,
}

impl DockerCli {
    /// Creates a client for `binary` (usually `docker`).
    ///
    /// Returns an error if the binary cannot be run on this host.
    pub fn new(binary: &str) -> Result<Self, ContainerError> {
        info!("Initializing docker CLI engine using '{}'", binary);
        if !Self::is_runtime_available(binary) {
            error!("Container runtime '{}' is not available on this system", binary);
            return Err(ContainerError::RuntimeNotAvailable);
        }
        Ok(Self::unchecked(binary))
    }

    /// Creates a client without probing the binary.
    pub fn unchecked(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            pending_execs: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether the engine binary answers `--version`.
    pub fn is_runtime_available(binary: &str) -> bool {
        let available = std::process::Command::new(binary)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);

        debug!("{} availability check: {}", binary, available);
        available
    }

    fn exec_args(container_id: &str, command: &[String]) -> Vec<String> {
        let mut args = vec!["exec".to_string(), container_id.to_string()];
        args.extend(command.iter().cloned());
        args
    }

    fn stop_args(container_id: &str, timeout: Duration) -> Vec<String> {
        vec![
            "stop".to_string(),
            "-t".to_string(),
            timeout.as_secs().to_string(),
            container_id.to_string(),
        ]
    }

    fn copy_args(container_id: &str, source: &str, destination: &Path) -> Vec<String> {
        // The trailing "/." copies the directory contents rather than the directory itself
        let source = format!("{}:{}/.", container_id, source.trim_end_matches('/'));
        vec![
            "cp".to_string(),
            source,
            destination.display().to_string(),
        ]
    }

    async fn run(&self, args: &[String]) -> Result<Output, ContainerError> {
        debug!("Running: {} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to spawn {}: {}", self.binary, e);
                ContainerError::IoError(e)
            })
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn exec_create(
        &self,
        container_id: &str,
        command: &[String],
    ) -> Result<ExecId, ContainerError> {
        let exec_id = ExecId(Uuid::new_v4().to_string());
        let mut pending = self
            .pending_execs
            .lock()
            .map_err(|_| ContainerError::ExecFailed("exec registry poisoned".to_string()))?;
        pending.insert(
            exec_id.clone(),
            PendingExec {
                container_id: container_id.to_string(),
                command: command.to_vec(),
            },
        );
        debug!("[{}] Created exec {} for {:?}", container_id, exec_id, command);
        Ok(exec_id)
    }

    async fn exec_start(&self, exec_id: &ExecId) -> Result<ExecOutput, ContainerError> {
        let exec = self
            .pending_execs
            .lock()
            .map_err(|_| ContainerError::ExecFailed("exec registry poisoned".to_string()))?
            .remove(exec_id)
            .ok_or_else(|| ContainerError::UnknownExec(exec_id.to_string()))?;

        let output = self
            .run(&Self::exec_args(&exec.container_id, &exec.command))
            .await?;
        let result = ExecOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.success() {
            debug!("[{}] Exec {} finished", exec.container_id, exec_id);
        } else {
            warn!(
                "[{}] Exec {} exited with {:?}: {}",
                exec.container_id,
                exec_id,
                result.exit_code,
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    async fn stop_container(
        &self,
        container_id: &str,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        info!("[{}] Stopping container (timeout {:?})", container_id, timeout);
        let args = Self::stop_args(container_id, timeout);
        let output = tokio::time::timeout(timeout + STOP_CALL_GRACE, self.run(&args))
            .await
            .map_err(|_| ContainerError::Timeout(format!("docker stop {}", container_id)))??;

        if !output.status.success() {
            return Err(ContainerError::StopFailed(format!(
                "{}: {}",
                container_id,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!("[{}] Container stopped", container_id);
        Ok(())
    }

    async fn copy_from_container(
        &self,
        container_id: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), ContainerError> {
        let output = self
            .run(&Self::copy_args(container_id, source, destination))
            .await?;
        if !output.status.success() {
            return Err(ContainerError::CopyFailed(format!(
                "{}:{} -> {}: {}",
                container_id,
                source,
                destination.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!(
            "[{}] Copied {} to {}",
            container_id,
            source,
            destination.display()
        );
        Ok(())
    }
}
