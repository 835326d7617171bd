use serde::{Deserialize, Serialize};

/// Horizontal jitter played on the PIN dots after a rejection.
///
/// Offsets alternate direction and decay linearly, so the magnitude never
/// exceeds the configured amplitude and the sequence always settles at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeCue {
    offsets: Vec<f32>,
}

impl ShakeCue {
    pub fn new(amplitude: f32, steps: usize) -> Self {
        let amplitude = if amplitude.is_finite() {
            amplitude.abs()
        } else {
            0.0
        };
        let steps = steps.max(1);
        let last = steps - 1;

        let offsets = (0..steps)
            .map(|i| {
                if i == last {
                    return 0.0;
                }
                let decay = 1.0 - i as f32 / last as f32;
                let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
                direction * amplitude * decay
            })
            .collect();

        Self { offsets }
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// Largest absolute offset in the sequence.
    pub fn peak(&self) -> f32 {
        self.offsets.iter().fold(0.0, |peak, o| peak.max(o.abs()))
    }
}
