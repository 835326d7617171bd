//! Contracts the session gate consumes from the rest of the app.
//!
//! Credential storage, the setup flag, the platform router and the haptic
//! engine all live outside this crate. The gate only ever talks to them
//! through these traits, so each can be swapped for a fake in tests.

use async_trait::async_trait;

use crate::auth::ShakeCue;
use crate::navigation::{Destination, TransitionMode};

/// Verifies a PIN against the vault.
///
/// Must always settle. `Ok(true)` unlocks; `Ok(false)` and `Err` both count
/// as a rejection. The implementor owns the session flag and is expected to
/// flip it when it accepts.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, secret: &str) -> anyhow::Result<bool>;
}

/// Reports whether first-run setup has completed. Idempotent, no side effects.
#[async_trait]
pub trait SetupStatus: Send + Sync {
    async fn is_setup_complete(&self) -> anyhow::Result<bool>;
}

/// The platform view router. Only the navigation serializer calls this.
#[async_trait]
pub trait ViewRouter: Send + Sync {
    async fn navigate_to(&self, destination: &Destination, mode: TransitionMode)
        -> anyhow::Result<()>;
}

/// Fire-and-forget rejection cues.
pub trait FeedbackCues: Send + Sync {
    fn haptic_error(&self);
    fn shake(&self, cue: &ShakeCue);
}

/// Feedback sink for headless contexts where there is nothing to vibrate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackCues for NoFeedback {
    fn haptic_error(&self) {}

    fn shake(&self, _cue: &ShakeCue) {}
}
