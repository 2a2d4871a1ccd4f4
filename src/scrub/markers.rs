//! Notable scrub positions with magnetic snap behaviour

use serde::{Deserialize, Serialize};

use crate::types::ReplayWindow;

/// Clamp a raw scrub value into `[0, 100]`; NaN reads as 0
pub fn clamp_position(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Sorted set of marker positions on the 0–100 scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Markers(Vec<f64>);

impl Markers {
    pub fn new(positions: impl IntoIterator<Item = f64>) -> Self {
        let mut positions: Vec<f64> = positions
            .into_iter()
            .filter(|p| p.is_finite())
            .map(clamp_position)
            .collect();
        positions.sort_by(f64::total_cmp);
        positions.dedup();
        Self(positions)
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Place markers at the scrub positions of the given timestamps
    ///
    /// A timestamp maps to the position whose replay count includes every
    /// event recorded at or before it.
    pub fn from_timestamps(window: &ReplayWindow, timestamps: &[i64]) -> Self {
        if window.is_empty() {
            return Self::none();
        }
        let total = window.len() as f64;
        Self::new(
            timestamps
                .iter()
                .map(|ts| window.count_at_or_before(*ts) as f64 / total * 100.0),
        )
    }

    pub fn positions(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marker closest to `value`, with its distance
    pub fn nearest(&self, value: f64) -> Option<(f64, f64)> {
        self.0
            .iter()
            .map(|m| (*m, (value - m).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Nearest marker if it lies within `threshold` of `value`
    pub fn within(&self, value: f64, threshold: f64) -> Option<f64> {
        self.nearest(value)
            .filter(|(_, distance)| *distance <= threshold)
            .map(|(marker, _)| marker)
    }
}
