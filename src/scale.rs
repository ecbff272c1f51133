use fixed::types::I48F16;

use crate::config::ScaleConfig;

/// Position in the configured note scale; valid values are `0..scale.len()`.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct ScaleIndex(pub usize);

impl ScaleIndex {
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Linear map from a clamped peak magnitude onto the note scale.
#[derive(Clone, Copy, Debug)]
pub struct ScaleMapper {
    min_accel: i32,
    max_accel: i32,
    steps: usize,
}

impl ScaleMapper {
    pub fn new(config: &ScaleConfig) -> Self {
        Self {
            min_accel: config.min_accel,
            max_accel: config.max_accel.max(config.min_accel),
            steps: config.len().max(1),
        }
    }

    /// Number of notes in the scale.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Halves round away from zero, so the midpoint of an even-length scale
    /// lands on the upper note.
    pub fn map_to_scale(&self, peak: i32) -> ScaleIndex {
        let last = self.steps - 1;
        let span = i64::from(self.max_accel) - i64::from(self.min_accel);
        if last == 0 || span == 0 {
            return ScaleIndex(0);
        }

        let offset =
            i64::from(peak.clamp(self.min_accel, self.max_accel)) - i64::from(self.min_accel);
        // offset * last stays below 2^47 for any i32 span and a u16-sized scale.
        let position = I48F16::from_num(offset) * I48F16::from_num(last) / I48F16::from_num(span);
        let index = position.round().to_num::<usize>();
        ScaleIndex(index.min(last))
    }
}
