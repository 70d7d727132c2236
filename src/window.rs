//! Rolling motion window
//!
//! This module maintains the fixed-capacity temporal buffers behind the
//! classifiers: recent bounding-box centers, instantaneous speeds, and wrist
//! separation samples. One window exists per tracked person.

use crate::features::{mean, population_std_dev, MotionFeatures};
use crate::types::{BodyLandmarks, BoundingBox};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capacity of the position history (bounding-box centers).
pub const POSITION_WINDOW: usize = 25;

/// Capacity of the instantaneous speed history.
pub const SPEED_WINDOW: usize = 10;

/// Capacity of the wrist-separation history.
pub const HAND_WINDOW: usize = 10;

/// Rolling window aggregator for one tracked person.
///
/// Buffers are FIFO with hard capacity bounds: the oldest sample is evicted
/// on overflow. Memory is O(1) per tracked person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionWindow {
    /// Recent bounding-box centers, pixel space.
    positions: VecDeque<(f64, f64)>,
    /// Euclidean distance between consecutive centers.
    speeds: VecDeque<f64>,
    /// `|leftWrist.y - rightWrist.y|` per frame.
    wrist_separation: VecDeque<f64>,
}

impl Default for MotionWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionWindow {
    pub fn new() -> Self {
        Self {
            positions: VecDeque::with_capacity(POSITION_WINDOW),
            speeds: VecDeque::with_capacity(SPEED_WINDOW),
            wrist_separation: VecDeque::with_capacity(HAND_WINDOW),
        }
    }

    /// Fold one frame's detection into the window.
    ///
    /// Computes the bounding-box center, derives the instantaneous speed from
    /// the previous center when one exists, and records the current wrist
    /// separation. Infallible: landmark completeness is the caller's contract.
    pub fn update(&mut self, bbox: &BoundingBox, body: &BodyLandmarks) {
        let (cx, cy) = bbox.center();

        if let Some(&(px, py)) = self.positions.back() {
            let speed = (cx - px).hypot(cy - py);
            push_bounded(&mut self.speeds, speed, SPEED_WINDOW);
        }

        push_bounded(&mut self.positions, (cx, cy), POSITION_WINDOW);
        push_bounded(
            &mut self.wrist_separation,
            body.wrist_separation(),
            HAND_WINDOW,
        );
    }

    /// Mean instantaneous speed, or 0 with no speed samples.
    pub fn body_speed(&self) -> f64 {
        mean(&self.speeds)
    }

    /// Population standard deviation of wrist separation, or 0 with fewer
    /// than 2 samples.
    pub fn hand_activity(&self) -> f64 {
        population_std_dev(&self.wrist_separation)
    }

    /// Vertical displacement between the second-most-recent and most recent
    /// centers. Positive means upward motion in image space (y decreases
    /// upward). 0 with fewer than 2 position samples.
    pub fn vertical_motion(&self) -> f64 {
        let n = self.positions.len();
        if n < 2 {
            return 0.0;
        }
        self.positions[n - 2].1 - self.positions[n - 1].1
    }

    /// Snapshot of all three features.
    pub fn features(&self) -> MotionFeatures {
        MotionFeatures {
            speed: self.body_speed(),
            hand_activity: self.hand_activity(),
            vertical_motion: self.vertical_motion(),
        }
    }

    /// Number of position samples currently held.
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Serialize window state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load window state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> &VecDeque<(f64, f64)> {
        &self.positions
    }
}

/// Append to a rolling buffer, evicting the oldest sample past capacity.
fn push_bounded<T>(buffer: &mut VecDeque<T>, value: T, capacity: usize) {
    buffer.push_back(value);
    while buffer.len() > capacity {
        buffer.pop_front();
    }
}
