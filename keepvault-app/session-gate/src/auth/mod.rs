//! PIN re-authentication.
//!
//! The controller owns the digit buffer and the failed-attempt counter for
//! one PIN screen, asks the external authenticator for a verdict once the
//! buffer is full, and routes to the vault on success.

pub mod controller;
pub mod feedback;
pub mod pin;

pub use controller::PinAuthController;
pub use feedback::ShakeCue;
pub use pin::{AuthAttemptState, PinBuffer, PinPhase, PinSnapshot};
