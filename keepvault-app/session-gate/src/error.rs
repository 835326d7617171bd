//! Error types for the session gate.
//!
//! Nothing in the gate is fatal: these errors are logged, mapped to a
//! fallback route, or surfaced to the view as a structured `{code, message}`
//! object. They are never thrown across the PIN pad.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    /// Destination identifier is empty or contains characters a route path
    /// cannot carry.
    #[error("Invalid destination: {0:?}")]
    InvalidDestination(String),

    /// The view router failed to perform a transition.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// An external collaborator (authenticator, setup check) failed.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// A collaborator panicked while being awaited.
    #[error("Collaborator panicked: {0}")]
    Panicked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Stable code for programmatic handling on the view side.
    pub fn code(&self) -> &'static str {
        match self {
            GateError::InvalidDestination(_) => "INVALID_DESTINATION",
            GateError::Navigation(_) => "NAVIGATION_ERROR",
            GateError::Collaborator(_) => "COLLABORATOR_ERROR",
            GateError::Panicked(_) => "COLLABORATOR_PANICKED",
            GateError::Config(_) => "CONFIG_ERROR",
            GateError::Serialization(_) => "SERIALIZATION_ERROR",
            GateError::Io(_) => "IO_ERROR",
        }
    }

    /// Build a `Panicked` error from the payload returned by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        GateError::Panicked(message)
    }
}

impl From<anyhow::Error> for GateError {
    fn from(err: anyhow::Error) -> Self {
        GateError::Collaborator(format!("{:#}", err))
    }
}

impl serde::Serialize for GateError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("GateError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type GateResult<T> = std::result::Result<T, GateError>;
