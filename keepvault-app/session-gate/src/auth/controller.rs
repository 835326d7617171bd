//! PIN unlock controller.
//!
//! Turns digit taps into an authentication decision. Input is only accepted
//! in `Entering`; while a PIN is being validated or its rejection feedback is
//! on screen, taps are dropped, which keeps the buffer and the pending
//! authenticate call from racing each other.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::feedback::ShakeCue;
use super::pin::{AuthAttemptState, PinBuffer, PinPhase, PinSnapshot};
use crate::collaborators::{Authenticator, FeedbackCues};
use crate::error::GateError;
use crate::navigation::{Destination, NavigationIntent, NavigationSerializer, TransitionMode};
use crate::storage::GateSettings;

struct PinState {
    phase: PinPhase,
    buffer: PinBuffer,
    attempts: AuthAttemptState,
}

impl PinState {
    fn snapshot(&self) -> PinSnapshot {
        PinSnapshot {
            phase: self.phase,
            entered: self.buffer.len(),
            max_len: self.buffer.max_len(),
            failed_attempts: self.attempts.failed_attempts,
            last_failure_at: self.attempts.last_failure_at,
        }
    }
}

struct Inner {
    state: Mutex<PinState>,
    snapshot_tx: watch::Sender<PinSnapshot>,
    authenticator: Arc<dyn Authenticator>,
    feedback: Arc<dyn FeedbackCues>,
    navigation: NavigationSerializer,
    validation_delay: Duration,
    feedback_window: Duration,
    shake: ShakeCue,
}

/// Controller behind one PIN screen.
///
/// Create one per mount: the failed-attempt count lives exactly as long as
/// the controller.
pub struct PinAuthController {
    inner: Arc<Inner>,
}

impl PinAuthController {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        feedback: Arc<dyn FeedbackCues>,
        navigation: NavigationSerializer,
        settings: &GateSettings,
    ) -> Self {
        let state = PinState {
            phase: PinPhase::Entering,
            buffer: PinBuffer::new(settings.pin_length),
            attempts: AuthAttemptState::default(),
        };
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                snapshot_tx,
                authenticator,
                feedback,
                navigation,
                validation_delay: settings.validation_delay(),
                feedback_window: settings.feedback_window(),
                shake: ShakeCue::new(settings.shake_amplitude, settings.shake_steps),
            }),
        }
    }

    /// Handle a tap on a digit key.
    ///
    /// Non-digits, taps on a full buffer, and taps outside `Entering` are
    /// ignored. The tap that fills the buffer schedules validation.
    pub async fn on_digit(&self, digit: char) {
        if !digit.is_ascii_digit() {
            debug!("Ignoring non-digit key");
            return;
        }

        let full = {
            let mut state = self.inner.state.lock().await;
            if state.phase != PinPhase::Entering {
                debug!("Ignoring digit while {}", state.phase);
                return;
            }
            if !state.buffer.push(digit) {
                return;
            }
            let full = state.buffer.is_full();
            if full {
                state.phase = PinPhase::Validating;
            }
            self.inner.publish(&state);
            full
        };

        if full {
            let inner = self.inner.clone();
            tokio::spawn(async move { inner.validate().await });
        }
    }

    pub async fn on_backspace(&self) {
        let mut state = self.inner.state.lock().await;
        if state.phase != PinPhase::Entering {
            debug!("Ignoring backspace while {}", state.phase);
            return;
        }
        if state.buffer.pop() {
            self.inner.publish(&state);
        }
    }

    pub fn snapshot(&self) -> PinSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn phase(&self) -> PinPhase {
        self.inner.snapshot_tx.borrow().phase
    }

    pub fn failed_attempts(&self) -> u32 {
        self.inner.snapshot_tx.borrow().failed_attempts
    }

    /// Observe every state change, for rendering dots and the attempt count.
    pub fn subscribe(&self) -> watch::Receiver<PinSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }
}

impl Inner {
    fn publish(&self, state: &PinState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    async fn validate(&self) {
        // Let the final dot render before anything else happens.
        tokio::time::sleep(self.validation_delay).await;

        let secret = {
            let state = self.state.lock().await;
            Zeroizing::new(state.buffer.secret().to_owned())
        };

        let outcome = AssertUnwindSafe(self.authenticator.authenticate(secret.as_str()))
            .catch_unwind()
            .await;
        drop(secret);

        // Errors and panics fail closed.
        let accepted = match outcome {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(e)) => {
                warn!("Authenticator failed, treating as rejection: {}", GateError::from(e));
                false
            }
            Err(payload) => {
                warn!(
                    "Authenticator failed, treating as rejection: {}",
                    GateError::from_panic(payload)
                );
                false
            }
        };

        if accepted {
            self.accept().await;
        } else {
            self.reject().await;
        }
    }

    async fn accept(&self) {
        {
            let mut state = self.state.lock().await;
            state.attempts.reset();
            state.buffer.clear();
            state.phase = PinPhase::Accepted;
            self.publish(&state);
        }

        info!("PIN accepted, routing to vault");
        self.navigation
            .enqueue_intent(NavigationIntent::new(
                Destination::vault(),
                TransitionMode::Replace,
            ))
            .await;
    }

    async fn reject(&self) {
        let failed = {
            let mut state = self.state.lock().await;
            state.attempts.record_failure();
            state.phase = PinPhase::Rejected;
            self.publish(&state);
            state.attempts.failed_attempts
        };
        info!("PIN rejected ({} failed attempt(s))", failed);

        self.feedback.haptic_error();
        self.feedback.shake(&self.shake);

        tokio::time::sleep(self.feedback_window).await;

        let mut state = self.state.lock().await;
        state.buffer.clear();
        state.phase = PinPhase::Entering;
        self.publish(&state);
    }
}
