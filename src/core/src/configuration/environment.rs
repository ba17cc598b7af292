//! Process environment access.
//!
//! Lookups go through the [`Environment`] trait so a worker never reads
//! global state directly; tests inject a [`StaticEnvironment`].

use log::warn;
use std::collections::HashMap;

pub trait Environment: Send + Sync {
    fn get_env_variable(&self, name: &str) -> Option<String>;

    /// Reads a boolean variable, falling back to `default` when it is unset
    /// or holds anything other than `true`/`false` (case-insensitive).
    fn get_bool_env_variable(&self, name: &str, default: bool) -> bool {
        match self.get_env_variable(name) {
            None => default,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    warn!(
                        "Environment variable {} has non-boolean value {:?}, using default {}",
                        name, raw, default
                    );
                    default
                }
            },
        }
    }
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get_env_variable(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of variables, for embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl Environment for StaticEnvironment {
    fn get_env_variable(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
