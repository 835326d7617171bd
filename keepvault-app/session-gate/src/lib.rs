//! Session gate for the KeepVault mobile app.
//!
//! Decides where a cold start lands (onboarding, PIN entry or the vault),
//! runs the PIN pad state machine, and serializes every screen transition
//! so overlapping requests can never corrupt the visible stack. Storage,
//! biometrics and the platform router stay outside, behind the traits in
//! [`collaborators`].

pub mod auth;
pub mod bootstrap;
pub mod collaborators;
pub mod error;
pub mod navigation;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use auth::{PinAuthController, PinPhase, PinSnapshot, ShakeCue};
pub use bootstrap::{BootRoute, BootstrapResolver};
pub use collaborators::{Authenticator, FeedbackCues, NoFeedback, SetupStatus, ViewRouter};
pub use error::{GateError, GateResult};
pub use navigation::{Destination, NavigationIntent, NavigationSerializer, TransitionMode};
pub use state::SessionGate;
pub use storage::{load_settings, save_settings, GateSettings};

/// Install the default tracing subscriber. `RUST_LOG` overrides the filter.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> GateResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepvault_gate_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| GateError::Config(format!("tracing already initialized: {}", e)))
}
