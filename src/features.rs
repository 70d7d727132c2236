//! Aggregated motion features
//!
//! Scalar features derived from the rolling motion window. Every feature has
//! an explicit zero-value default so short or empty histories never fail.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Snapshot of the three scalar features the classifiers consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionFeatures {
    /// Mean instantaneous speed over the speed window (pixels/frame).
    pub speed: f64,
    /// Population standard deviation of the wrist-separation window.
    pub hand_activity: f64,
    /// Vertical displacement between the two most recent centers
    /// (positive = upward motion in image space).
    pub vertical_motion: f64,
}

/// Arithmetic mean of a rolling window, or 0 when empty.
pub(crate) fn mean(values: &VecDeque<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation of a rolling window.
///
/// Formula: `sqrt(sum((x - mean)^2) / n)`. Returns 0 with fewer than 2
/// samples, since a single observation carries no spread.
pub(crate) fn population_std_dev(values: &VecDeque<f64>) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
