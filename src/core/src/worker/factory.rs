use log::{info, warn};
use std::sync::Arc;

use crate::configuration::environment::Environment;
use crate::configuration::Config;
use crate::container_management::engine::ContainerEngine;
use crate::error_handling::types::WorkerError;
use crate::session_management::capabilities::Capabilities;
use crate::video_recording::artifacts::ArtifactCollector;
use crate::video_recording::recorder::VideoRecorder;
use crate::video_recording::types::read_env_var_for_video_recording;

use super::node::Worker;

/// What a container starter reports when its container comes up.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub container_id: String,
    /// Left empty to fall back to the configured capability sets.
    pub capabilities: Vec<Capabilities>,
}

impl Registration {
    pub fn new(container_id: &str) -> Self {
        Self {
            container_id: container_id.to_string(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<Capabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Builds workers sharing one configuration, engine and artifact collector.
pub struct WorkerFactory {
    config: Config,
    engine: Arc<dyn ContainerEngine>,
    environment: Arc<dyn Environment>,
    collector: Arc<ArtifactCollector>,
}

impl WorkerFactory {
    pub fn new(
        config: Config,
        engine: Arc<dyn ContainerEngine>,
        environment: Arc<dyn Environment>,
    ) -> Result<Self, WorkerError> {
        config.validate()?;
        let collector = Arc::new(ArtifactCollector::new(&config.recording)?);
        Ok(Self {
            config,
            engine,
            environment,
            collector,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the worker for a freshly registered container.
    ///
    /// The recording switch is read from the environment for every worker, so
    /// flipping it affects containers registered afterwards.
    pub fn create(&self, registration: Registration) -> Result<Worker, WorkerError> {
        let container_id = registration.container_id.trim();
        if container_id.is_empty() {
            return Err(WorkerError::InitializationFailed(
                "container id must not be empty".to_string(),
            ));
        }

        let capabilities = if registration.capabilities.is_empty() {
            self.config.capabilities.clone()
        } else {
            registration.capabilities
        };
        if capabilities.is_empty() {
            warn!(
                "[{}] No capability sets declared, every session request will be refused",
                container_id
            );
        }

        let recording_enabled = read_env_var_for_video_recording(self.environment.as_ref());
        let recorder = VideoRecorder::new(
            container_id,
            self.engine.clone(),
            self.collector.clone(),
            &self.config.recording,
            recording_enabled,
        );
        info!(
            "[{}] Creating worker (recording enabled: {})",
            container_id, recording_enabled
        );
        Ok(Worker::new(
            container_id,
            capabilities,
            self.config.worker.clone(),
            self.engine.clone(),
            recorder,
        ))
    }
}
