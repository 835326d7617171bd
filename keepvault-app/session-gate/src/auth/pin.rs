//! PIN pad state types.
//!
//! These are the pieces the controller mutates and the view renders:
//! - `PinBuffer`: the digits typed so far, wiped from memory when cleared
//! - `PinPhase`: where the pad is in the unlock flow
//! - `AuthAttemptState`: failed-attempt bookkeeping for the current screen
//! - `PinSnapshot`: what the view is allowed to see (never the digits)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Digits entered so far. Never longer than `max_len`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PinBuffer {
    digits: String,
    #[zeroize(skip)]
    max_len: usize,
}

impl PinBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            digits: String::with_capacity(max_len),
            max_len,
        }
    }

    /// Append `digit`. Returns `false` (and leaves the buffer untouched) for
    /// non-digits or when the buffer is already full.
    pub fn push(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.is_full() {
            return false;
        }
        self.digits.push(digit);
        true
    }

    /// Remove the last digit. Returns `false` on an empty buffer.
    pub fn pop(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    /// Empty the buffer, overwriting the digits.
    pub fn clear(&mut self) {
        self.digits.zeroize();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= self.max_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// The joined digits, for handing to the authenticator.
    pub fn secret(&self) -> &str {
        &self.digits
    }
}

impl std::fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinBuffer")
            .field("len", &self.digits.len())
            .field("max_len", &self.max_len)
            .finish()
    }
}

/// Where the PIN pad is in the unlock flow.
///
/// - `Entering` → `Validating` (final digit typed)
/// - `Validating` → `Accepted` | `Rejected`
/// - `Rejected` → `Entering` (after the feedback window, buffer cleared)
/// - `Accepted` is terminal
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PinPhase {
    #[default]
    Entering,
    Validating,
    Rejected,
    Accepted,
}

impl std::fmt::Display for PinPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entering => write!(f, "Entering"),
            Self::Validating => write!(f, "Validating"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Accepted => write!(f, "Accepted"),
        }
    }
}

/// Failed attempts on the current PIN screen. Lives in memory only.
///
/// Counting only; no lockout or cooldown is enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAttemptState {
    pub failed_attempts: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl AuthAttemptState {
    pub fn record_failure(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_failure_at = Some(Utc::now());
    }

    pub fn reset(&mut self) {
        self.failed_attempts = 0;
        self.last_failure_at = None;
    }
}

/// Render-safe view of the pad: how many dots to fill, never which digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSnapshot {
    pub phase: PinPhase,
    pub entered: usize,
    pub max_len: usize,
    pub failed_attempts: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_never_exceeds_max() {
        let mut buffer = PinBuffer::new(4);
        for digit in "123456".chars() {
            buffer.push(digit);
            assert!(buffer.len() <= 4);
        }
        assert!(buffer.is_full());
        assert_eq!(buffer.secret(), "1234");
        assert!(!buffer.push('9'));
    }

    #[test]
    fn test_buffer_rejects_non_digits() {
        let mut buffer = PinBuffer::new(4);
        for c in ['a', ' ', '-', '\u{0663}', '\u{ff11}'] {
            assert!(!buffer.push(c), "{c:?} should be rejected");
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_pop_on_empty_is_noop() {
        let mut buffer = PinBuffer::new(4);
        assert!(!buffer.pop());
        buffer.push('7');
        assert!(buffer.pop());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer = PinBuffer::new(4);
        "1234".chars().for_each(|d| {
            buffer.push(d);
        });
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.max_len(), 4);
        assert!(buffer.push('1'));
    }

    #[test]
    fn test_debug_does_not_leak_digits() {
        let mut buffer = PinBuffer::new(4);
        buffer.push('8');
        buffer.push('6');
        let rendered = format!("{:?}", buffer);
        assert!(!rendered.contains("86"));
        assert!(rendered.contains("len: 2"));
    }

    #[test]
    fn test_attempt_state_counts_and_resets() {
        let mut attempts = AuthAttemptState::default();
        attempts.record_failure();
        attempts.record_failure();
        assert_eq!(attempts.failed_attempts, 2);
        assert!(attempts.last_failure_at.is_some());

        attempts.reset();
        assert_eq!(attempts, AuthAttemptState::default());
    }

    #[test]
    fn test_phase_serialization() {
        assert_eq!(
            serde_json::to_string(&PinPhase::Validating).unwrap(),
            "\"Validating\""
        );
        assert_eq!(PinPhase::default(), PinPhase::Entering);
    }
}
