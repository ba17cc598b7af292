//! Error types shared across the worker subsystems.

pub mod types;
