use crate::session_management::capabilities::{Capabilities, TEST_GROUP, TEST_NAME};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One browser-automation test bound to a worker, handed back to the router
/// on admission and passed along with every intercepted command.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub requested_capabilities: Capabilities,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(requested_capabilities: Capabilities) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_capabilities,
            started_at: Utc::now(),
        }
    }

    pub fn name(&self) -> Option<String> {
        self.requested_capabilities.label(TEST_NAME)
    }

    pub fn group(&self) -> Option<String> {
        self.requested_capabilities.label(TEST_GROUP)
    }
}
