//! Capability maps as exchanged with the routing layer.
//!
//! Values are kept as raw JSON so malformed entries (a string where a number
//! is expected, say) survive until the point where a default can be applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const BROWSER_NAME: &str = "browserName";
pub const PLATFORM: &str = "platform";
pub const IDLE_TIMEOUT: &str = "idleTimeout";
pub const RECORD_VIDEO: &str = "recordVideo";
pub const TEST_NAME: &str = "name";
pub const TEST_GROUP: &str = "group";

/// Platform wildcard understood by grid clients.
const ANY_PLATFORM: &str = "ANY";

/// Keys that must match exactly between requested and declared capabilities.
const MATCHED_KEYS: [&str; 2] = [BROWSER_NAME, PLATFORM];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(HashMap<String, Value>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn browser_name(&self) -> Option<&str> {
        self.get(BROWSER_NAME).and_then(Value::as_str)
    }

    pub fn platform(&self) -> Option<&str> {
        self.get(PLATFORM).and_then(Value::as_str)
    }

    /// Renders a value as a label; strings verbatim, other scalars via JSON.
    pub fn label(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether these declared capabilities can serve `requested`.
    ///
    /// Browser name and platform must match exactly when the request names
    /// them. An absent or null value, or the `ANY` platform, imposes nothing.
    pub fn satisfies(&self, requested: &Capabilities) -> bool {
        MATCHED_KEYS.iter().all(|key| {
            let wanted = match requested.get(key) {
                None | Some(Value::Null) => return true,
                Some(Value::String(s)) if *key == PLATFORM && s == ANY_PLATFORM => return true,
                Some(wanted) => wanted,
            };
            self.get(key) == Some(wanted)
        })
    }

    /// The requested idle timeout in seconds, if present and a valid
    /// non-negative integer. Numbers and numeric strings are accepted.
    pub fn idle_timeout_secs(&self) -> Option<u64> {
        match self.get(IDLE_TIMEOUT)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
    }

    /// `false` only when `recordVideo` is explicitly false (bool or string).
    pub fn record_video(&self) -> bool {
        match self.get(RECORD_VIDEO) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
            _ => true,
        }
    }
}

impl FromIterator<(String, Value)> for Capabilities {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
