//! Retrieval of finished recordings from the container to the host.
//!
//! The recorder's output directory is copied into a staging directory created
//! next to the final destination, files matching the configured pattern are
//! renamed after the session they belong to, and the staging directory is
//! dropped together with anything else the copy brought along.

use log::{debug, info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::configuration::types::RecordingConfig;
use crate::container_management::engine::ContainerEngine;
use crate::error_handling::types::{ConfigError, RecordingError};

/// Labels used to name retrieved recordings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLabels {
    pub session_id: Uuid,
    pub test_name: Option<String>,
    pub browser: Option<String>,
}

impl ArtifactLabels {
    /// `<name>_<browser>_<session-id>`, with anything outside `[A-Za-z0-9_-]` replaced.
    pub fn file_stem(&self) -> String {
        let name = self.test_name.as_deref().unwrap_or("test");
        let browser = self.browser.as_deref().unwrap_or("unknown");
        format!(
            "{}_{}_{}",
            sanitize(name),
            sanitize(browser),
            self.session_id
        )
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub struct ArtifactCollector {
    container_videos_dir: String,
    artifacts_dir: PathBuf,
    pattern: Regex,
}

impl ArtifactCollector {
    pub fn new(config: &RecordingConfig) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&config.artifact_pattern).map_err(|e| {
            ConfigError::Invalid(format!(
                "recording.artifact_pattern is not a valid regex: {}",
                e
            ))
        })?;
        Ok(Self {
            container_videos_dir: config.container_videos_dir.clone(),
            artifacts_dir: config.artifacts_dir.clone(),
            pattern,
        })
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Copies recordings out of `container_id` and returns their host paths.
    ///
    /// Errors
    /// - [`RecordingError::ContainerError`] if the engine copy fails.
    /// - [`RecordingError::ArtifactError`] for host filesystem failures.
    /// - [`RecordingError::NoArtifact`] if nothing matching the pattern was copied.
    pub async fn retrieve(
        &self,
        engine: &dyn ContainerEngine,
        container_id: &str,
        labels: &ArtifactLabels,
    ) -> Result<Vec<PathBuf>, RecordingError> {
        tokio::fs::create_dir_all(&self.artifacts_dir)
            .await
            .map_err(RecordingError::ArtifactError)?;
        let staging = self.create_staging_dir().await?;
        debug!(
            "[{}] Staging recordings in {}",
            container_id,
            staging.path().display()
        );

        engine
            .copy_from_container(container_id, &self.container_videos_dir, staging.path())
            .await?;

        let mut copied = Vec::new();
        let mut entries = tokio::fs::read_dir(staging.path())
            .await
            .map_err(RecordingError::ArtifactError)?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(RecordingError::ArtifactError)?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|kind| kind.is_file())
                .unwrap_or(false);
            let matches = entry
                .file_name()
                .to_str()
                .map(|name| self.pattern.is_match(name))
                .unwrap_or(false);
            if is_file && matches {
                copied.push(entry.path());
            }
        }
        copied.sort();

        if copied.is_empty() {
            warn!(
                "[{}] No recording matching {} found in {}",
                container_id, self.pattern, self.container_videos_dir
            );
            return Err(RecordingError::NoArtifact);
        }

        let stem = labels.file_stem();
        let mut retrieved = Vec::with_capacity(copied.len());
        for (index, source) in copied.iter().enumerate() {
            let extension = source
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("mp4")
                .to_ascii_lowercase();
            let file_name = if index == 0 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, index, extension)
            };
            let target = self.artifacts_dir.join(file_name);
            tokio::fs::rename(source, &target)
                .await
                .map_err(RecordingError::ArtifactError)?;
            info!(
                "[{}] Recording retrieved to {}",
                container_id,
                target.display()
            );
            retrieved.push(target);
        }

        let removed = tokio::task::spawn_blocking(move || staging.close()).await;
        if !matches!(removed, Ok(Ok(()))) {
            debug!("[{}] Staging directory was not removed cleanly", container_id);
        }
        Ok(retrieved)
    }

    /// Creates the staging directory inside the artifacts directory, so the
    /// final renames stay on one filesystem.
    async fn create_staging_dir(&self) -> Result<tempfile::TempDir, RecordingError> {
        let parent = self.artifacts_dir.clone();
        tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".solo-node-")
                .tempdir_in(parent)
        })
        .await
        .map_err(|e| RecordingError::ArtifactError(std::io::Error::other(e)))?
        .map_err(RecordingError::ArtifactError)
    }
}
