//! Hooks the routing layer calls around every relayed command.
//!
//! The router classifies each request; the worker only looks at the HTTP
//! method and that classification to find session boundaries. Anything it
//! cannot make sense of is treated as a regular command.

use async_trait::async_trait;
use log::{debug, info};
use std::fmt;

use crate::session_management::session::Session;
use crate::video_recording::types::ContainerAction;

use super::node::Worker;
use super::state::TeardownReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other,
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other,
        }
    }
}

/// Request classification supplied by the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    StartSession,
    StopSession,
    Regular,
}

impl RequestType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "START_SESSION" => RequestType::StartSession,
            "STOP_SESSION" => RequestType::StopSession,
            _ => RequestType::Regular,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub method: HttpMethod,
    pub request_type: RequestType,
    pub path: String,
}

impl CommandRequest {
    pub fn new(method: HttpMethod, request_type: RequestType) -> Self {
        Self {
            method,
            request_type,
            path: String::new(),
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn is_session_start(&self) -> bool {
        self.method == HttpMethod::Post && self.request_type == RequestType::StartSession
    }

    pub fn is_session_stop(&self) -> bool {
        self.method == HttpMethod::Delete && self.request_type == RequestType::StopSession
    }
}

impl fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} ({:?})", self.method, self.path, self.request_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: u16,
}

/// The narrow capability the routing layer needs from a worker.
///
/// Hooks never fail: anything that goes wrong is logged by the implementor.
#[async_trait]
pub trait CommandInterceptor: Send + Sync {
    async fn before_command(&self, session: &Session, request: &CommandRequest);

    async fn after_command(
        &self,
        session: &Session,
        request: &CommandRequest,
        response: &CommandResponse,
    );
}

#[async_trait]
impl CommandInterceptor for Worker {
    async fn before_command(&self, session: &Session, request: &CommandRequest) {
        let start_recording = {
            let mut state = self.lock();
            state.touch();
            if !state.down && request.is_session_start() && !state.start_marker_seen {
                state.start_marker_seen = true;
                true
            } else {
                false
            }
        };
        debug!(
            "[{}] Before {} for session {}",
            self.inner.container_id, request, session.id
        );

        if start_recording {
            info!(
                "[{}] Session start detected for {}",
                self.inner.container_id, session.id
            );
            self.inner
                .recorder
                .video_recording(ContainerAction::StartRecording)
                .await;
        }
    }

    async fn after_command(
        &self,
        session: &Session,
        request: &CommandRequest,
        response: &CommandResponse,
    ) {
        self.lock().touch();
        debug!(
            "[{}] After {} for session {} -> {}",
            self.inner.container_id, request, session.id, response.status
        );

        if !request.is_session_stop() {
            return;
        }
        info!(
            "[{}] Session stop detected for {}",
            self.inner.container_id, session.id
        );
        if self.claim_teardown(TeardownReason::SessionStopped) {
            // The client gets its response while recording is finalized and the container stops.
            let worker = self.clone();
            tokio::spawn(async move { worker.finish_teardown().await });
        }
    }
}
