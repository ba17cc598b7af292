//! In-container screen recording tied to session boundaries.
//!
//! Components:
//! - `types`: recording state machine and the container actions driving it.
//! - `recorder`: [`VideoRecorder`], one per worker, deciding transitions and
//!   running the start/stop commands inside the container.
//! - `artifacts`: retrieval of finished recordings onto the host.

pub mod artifacts;
pub mod recorder;
pub mod types;

pub use artifacts::{ArtifactCollector, ArtifactLabels};
pub use recorder::VideoRecorder;
pub use types::{ContainerAction, RecordingState};
