//! Session admission and the data a session carries.
//!
//! A worker serves at most one session. This module holds the pieces that
//! decide whether a request may be bound ([`admission`]), the requested
//! capability map ([`capabilities`]) and the bound session itself ([`session`]).

pub mod admission;
pub mod capabilities;
pub mod session;

pub use admission::{AdmissionTerms, Refusal};
pub use capabilities::Capabilities;
pub use session::Session;
