use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{GateError, GateResult};

/// Longest PIN the pad accepts. Anything larger is a misconfiguration.
const MAX_PIN_LENGTH: usize = 12;

/// Tunables for the session gate.
///
/// The delays are fixed stand-ins for "wait until the platform transition
/// finished"; they are not derived from animation durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Digits required before the PIN is validated.
    pub pin_length: usize,
    /// Wait before handing an intent to the router.
    pub settle_before_ms: u64,
    /// Wait after the router returned, before the next intent may start.
    pub settle_after_ms: u64,
    /// Delay between the final digit and the authenticate call, so the last
    /// dot is rendered before any feedback.
    pub validation_delay_ms: u64,
    /// How long rejection feedback stays on screen before the pad resets.
    pub feedback_window_ms: u64,
    /// Peak horizontal offset of the shake cue, in logical pixels.
    pub shake_amplitude: f32,
    /// Number of offsets in the shake sequence (the last one is always 0).
    pub shake_steps: usize,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            pin_length: 4,
            settle_before_ms: 100,
            settle_after_ms: 300,
            validation_delay_ms: 150,
            feedback_window_ms: 600,
            shake_amplitude: 10.0,
            shake_steps: 6,
        }
    }
}

impl GateSettings {
    pub fn settle_before(&self) -> Duration {
        Duration::from_millis(self.settle_before_ms)
    }

    pub fn settle_after(&self) -> Duration {
        Duration::from_millis(self.settle_after_ms)
    }

    pub fn validation_delay(&self) -> Duration {
        Duration::from_millis(self.validation_delay_ms)
    }

    pub fn feedback_window(&self) -> Duration {
        Duration::from_millis(self.feedback_window_ms)
    }

    /// Reject settings the gate cannot operate with.
    pub fn validate(&self) -> GateResult<()> {
        if self.pin_length == 0 || self.pin_length > MAX_PIN_LENGTH {
            return Err(GateError::Config(format!(
                "pin_length must be between 1 and {}, got {}",
                MAX_PIN_LENGTH, self.pin_length
            )));
        }
        if self.shake_steps == 0 {
            return Err(GateError::Config("shake_steps must be at least 1".into()));
        }
        if !self.shake_amplitude.is_finite() || self.shake_amplitude < 0.0 {
            return Err(GateError::Config(format!(
                "shake_amplitude must be a non-negative number, got {}",
                self.shake_amplitude
            )));
        }
        Ok(())
    }
}

/// Load settings from `path`, falling back to defaults when the file is absent.
pub fn load_settings(path: &Path) -> GateResult<GateSettings> {
    if !path.exists() {
        return Ok(GateSettings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: GateSettings = serde_json::from_str(&content)?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &GateSettings) -> GateResult<()> {
    settings.validate()?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}
