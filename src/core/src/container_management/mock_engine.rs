//! In-memory [`ContainerEngine`] recording every call, for tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::container_management::engine::ContainerEngine;
use crate::container_management::types::{ExecId, ExecOutput};
use crate::error_handling::types::ContainerError;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    ExecCreate {
        container_id: String,
        command: Vec<String>,
    },
    ExecStart {
        exec_id: ExecId,
    },
    Stop {
        container_id: String,
        timeout: Duration,
    },
    Copy {
        container_id: String,
        source: String,
        destination: PathBuf,
    },
}

#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    next_exec: AtomicU64,
    pub exec_exit_code: Mutex<Option<i32>>,
    pub fail_exec: Mutex<bool>,
    pub fail_stop: Mutex<bool>,
    pub fail_copy: Mutex<bool>,
    pub stop_delay: Mutex<Option<Duration>>,
    pub exec_delay: Mutex<Option<Duration>>,
    /// `exec_start` never returns.
    pub hang_exec: Mutex<bool>,
    /// `copy_from_container` never returns.
    pub hang_copy: Mutex<bool>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Files the fake container exposes to `copy_from_container`.
    pub container_files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            exec_exit_code: Mutex::new(Some(0)),
            container_files: Mutex::new(vec![(
                "container_video.mp4".to_string(),
                b"fake video".to_vec(),
            )]),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn exec_commands(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::ExecCreate { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, EngineCall::Stop { .. }))
            .count()
    }

    pub fn copy_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, EngineCall::Copy { .. }))
            .count()
    }

    /// Highest number of exec and copy calls seen running at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

/// Decrements the in-flight count even when the call future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn exec_create(
        &self,
        container_id: &str,
        command: &[String],
    ) -> Result<ExecId, ContainerError> {
        self.record(EngineCall::ExecCreate {
            container_id: container_id.to_string(),
            command: command.to_vec(),
        });
        if *self.fail_exec.lock().unwrap() {
            return Err(ContainerError::ExecFailed("mock exec failure".to_string()));
        }
        let n = self.next_exec.fetch_add(1, Ordering::SeqCst);
        Ok(ExecId(format!("exec-{}", n)))
    }

    async fn exec_start(&self, exec_id: &ExecId) -> Result<ExecOutput, ContainerError> {
        self.record(EngineCall::ExecStart {
            exec_id: exec_id.clone(),
        });
        let _in_flight = self.enter();
        let delay = *self.exec_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let hang = *self.hang_exec.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
        let exit_code = *self.exec_exit_code.lock().unwrap();
        Ok(ExecOutput {
            exit_code,
            stdout: "ANY_STRING".to_string(),
            stderr: String::new(),
        })
    }

    async fn stop_container(
        &self,
        container_id: &str,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        self.record(EngineCall::Stop {
            container_id: container_id.to_string(),
            timeout,
        });
        let delay = *self.stop_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_stop.lock().unwrap() {
            return Err(ContainerError::StopFailed("mock stop failure".to_string()));
        }
        Ok(())
    }

    async fn copy_from_container(
        &self,
        container_id: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), ContainerError> {
        self.record(EngineCall::Copy {
            container_id: container_id.to_string(),
            source: source.to_string(),
            destination: destination.to_path_buf(),
        });
        let _in_flight = self.enter();
        let hang = *self.hang_copy.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
        if *self.fail_copy.lock().unwrap() {
            return Err(ContainerError::CopyFailed("mock copy failure".to_string()));
        }
        let files = self.container_files.lock().unwrap().clone();
        for (name, content) in files {
            std::fs::write(destination.join(name), content)?;
        }
        Ok(())
    }
}
