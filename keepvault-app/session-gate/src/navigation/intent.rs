//! Navigation intent types.
//!
//! An intent names a destination and how to get there. Intents are built
//! once, queued, and handed to the router exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GateError, GateResult};

/// How a destination is presented.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Push onto the history stack.
    Push,
    /// Replace the current history entry.
    #[default]
    Replace,
}

impl std::fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// A validated route path identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Destination(String);

impl Destination {
    pub const ONBOARDING: &'static str = "onboarding";
    pub const AUTHENTICATION: &'static str = "authentication";
    pub const VAULT: &'static str = "vault";

    /// Validate `path` as a route identifier.
    ///
    /// Accepts ASCII alphanumerics and `/ _ - . ( ) [ ]`, which covers plain
    /// names as well as grouped routes like `(tabs)/vault`.
    pub fn new(path: impl Into<String>) -> GateResult<Self> {
        let path = path.into();
        let valid = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "/_-.()[]".contains(c));
        if valid {
            Ok(Self(path))
        } else {
            Err(GateError::InvalidDestination(path))
        }
    }

    pub fn onboarding() -> Self {
        Self(Self::ONBOARDING.to_string())
    }

    pub fn authentication() -> Self {
        Self(Self::AUTHENTICATION.to_string())
    }

    pub fn vault() -> Self {
        Self(Self::VAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Destination {
    type Error = GateError;

    fn try_from(value: String) -> GateResult<Self> {
        Self::new(value)
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.0
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single queued navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub id: Uuid,
    pub destination: Destination,
    pub mode: TransitionMode,
    pub requested_at: DateTime<Utc>,
}

impl NavigationIntent {
    pub fn new(destination: Destination, mode: TransitionMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination,
            mode,
            requested_at: Utc::now(),
        }
    }
}
