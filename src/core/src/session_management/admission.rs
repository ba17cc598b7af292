//! Admission decision for a single-use worker.
//!
//! Pure logic: the worker feeds in its declared capabilities and whether the
//! session limit was already reached, and gets back either the terms the
//! session runs under or the reason it was refused.

use crate::session_management::capabilities::{Capabilities, TEST_GROUP, TEST_NAME};
use std::fmt;
use std::time::Duration;

/// Why a session request was not bound. Not an error: the router moves on
/// to another worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    WorkerDown,
    SessionLimitReached,
    CapabilitiesNotSupported,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::WorkerDown => write!(f, "worker is down"),
            Refusal::SessionLimitReached => write!(f, "session limit reached"),
            Refusal::CapabilitiesNotSupported => write!(f, "capabilities not supported"),
        }
    }
}

/// Per-session settings resolved once, at admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionTerms {
    pub max_idle: Duration,
    pub record_video: bool,
    pub test_name: Option<String>,
    pub test_group: Option<String>,
}

/// Decides whether `requested` may be bound to a worker declaring `declared`.
pub fn admit(
    declared: &[Capabilities],
    requested: &Capabilities,
    session_limit_reached: bool,
    worker_down: bool,
    default_idle_secs: u64,
) -> Result<AdmissionTerms, Refusal> {
    if worker_down {
        return Err(Refusal::WorkerDown);
    }
    if session_limit_reached {
        return Err(Refusal::SessionLimitReached);
    }
    if !declared.iter().any(|caps| caps.satisfies(requested)) {
        return Err(Refusal::CapabilitiesNotSupported);
    }

    Ok(AdmissionTerms {
        max_idle: Duration::from_secs(resolve_idle_timeout(requested, default_idle_secs)),
        record_video: requested.record_video(),
        test_name: requested.label(TEST_NAME),
        test_group: requested.label(TEST_GROUP),
    })
}

/// Absent, malformed and negative values all collapse to the default.
pub fn resolve_idle_timeout(requested: &Capabilities, default_idle_secs: u64) -> u64 {
    requested.idle_timeout_secs().unwrap_or(default_idle_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::capabilities::*;
    use serde_json::json;

    fn declared() -> Vec<Capabilities> {
        vec![
            Capabilities::new()
                .with(BROWSER_NAME, "chrome")
                .with(PLATFORM, "LINUX"),
            Capabilities::new()
                .with(BROWSER_NAME, "firefox")
                .with(PLATFORM, "LINUX"),
        ]
    }

    fn firefox() -> Capabilities {
        Capabilities::new()
            .with(BROWSER_NAME, "firefox")
            .with(PLATFORM, "LINUX")
    }

    #[test]
    fn any_declared_set_may_satisfy_the_request() {
        let terms = admit(&declared(), &firefox(), false, false, 90).unwrap();
        assert_eq!(terms.max_idle, Duration::from_secs(90));
        assert!(terms.record_video);
        assert_eq!(terms.test_name, None);
    }

    #[test]
    fn limit_reached_refuses_before_matching() {
        assert_eq!(
            admit(&declared(), &firefox(), true, false, 90),
            Err(Refusal::SessionLimitReached)
        );
    }

    #[test]
    fn down_worker_refuses_everything() {
        assert_eq!(
            admit(&declared(), &firefox(), false, true, 90),
            Err(Refusal::WorkerDown)
        );
    }

    #[test]
    fn unsupported_capabilities_are_refused() {
        let safari = Capabilities::new()
            .with(BROWSER_NAME, "safari")
            .with(PLATFORM, "MAC");
        assert_eq!(
            admit(&declared(), &safari, false, false, 90),
            Err(Refusal::CapabilitiesNotSupported)
        );
        assert_eq!(
            admit(&[], &firefox(), false, false, 90),
            Err(Refusal::CapabilitiesNotSupported)
        );
    }

    #[test]
    fn terms_carry_labels_and_overrides() {
        let requested = firefox()
            .with(TEST_NAME, "login")
            .with(TEST_GROUP, "smoke")
            .with(IDLE_TIMEOUT, 180)
            .with(RECORD_VIDEO, false);

        let terms = admit(&declared(), &requested, false, false, 90).unwrap();

        assert_eq!(terms.max_idle, Duration::from_secs(180));
        assert!(!terms.record_video);
        assert_eq!(terms.test_name.as_deref(), Some("login"));
        assert_eq!(terms.test_group.as_deref(), Some("smoke"));
    }

    #[test]
    fn idle_timeout_falls_back_to_default() {
        for bad in [json!(-20), json!("NaN"), json!(null), json!([1])] {
            let requested = firefox().with(IDLE_TIMEOUT, bad);
            assert_eq!(resolve_idle_timeout(&requested, 90), 90);
        }
        assert_eq!(resolve_idle_timeout(&firefox(), 90), 90);
    }
}
