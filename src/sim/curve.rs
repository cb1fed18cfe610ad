use serde::Deserialize;

/// A single keyframe of a [`FloatCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

/// Piecewise-linear float curve sampled over a closed time domain.
/// Used for the crouch height profile and the wall-run falloff window.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FloatCurve {
    keys: Vec<CurveKey>,
}

impl FloatCurve {
    /// Builds a curve from `(time, value)` pairs. Keys are sorted by time.
    pub fn from_keys(keys: &[(f32, f32)]) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .iter()
            .map(|&(time, value)| CurveKey { time, value })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// An empty curve disables the feature that references it.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Declared time domain `(min, max)`. Empty curves report `(0, 0)`.
    pub fn time_range(&self) -> (f32, f32) {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    /// Samples the curve at `time`, clamping outside the domain.
    pub fn value_at(&self, time: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        let last = self.keys[self.keys.len() - 1];
        if time >= last.time {
            return last.value;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let t = (time - a.time) / span;
                return a.value + (b.value - a.value) * t;
            }
        }
        last.value
    }

    /// Keys are already sorted on construction; deserialized curves may not be.
    pub fn normalize(&mut self) {
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}
