//! Lifecycle of a disposable, single-session worker.
//!
//! A [`Worker`] is created by [`WorkerFactory`] when a container registers.
//! It admits exactly one session, watches the commands relayed for it through
//! [`CommandInterceptor`], and tears the container down once the session ends
//! or goes idle. Teardown runs exactly once, whichever path triggers it.
//!
//! Components:
//! - `node`: the worker handle, admission and observability accessors.
//! - `interceptor`: command hooks detecting session start and stop.
//! - `watchdog`: the recurring idle check.
//! - `teardown`: single-execution shutdown of the container.
//! - `factory`: construction from configuration and a registration.

pub mod factory;
pub mod interceptor;
pub mod node;
pub mod state;
pub mod teardown;
pub mod watchdog;

pub use factory::{Registration, WorkerFactory};
pub use interceptor::{CommandInterceptor, CommandRequest, CommandResponse, HttpMethod, RequestType};
pub use node::{Worker, WorkerStatus};
pub use state::TeardownReason;
