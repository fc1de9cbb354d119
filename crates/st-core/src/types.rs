//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier an agent presents to the lease service
///
/// Used for logging and proxy naming only, never as a uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a new agent ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Use the configured id, falling back to the host name when it is blank
    pub fn resolve(configured: &str) -> Self {
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            Self(gethostname::gethostname().to_string_lossy().into_owned())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
