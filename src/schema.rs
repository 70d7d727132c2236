//! Frame observation wire format
//!
//! Defines the input schema (`kinesic.frame.v1`) the engine accepts from
//! upstream detector/estimator collaborators, plus parsing and validation.
//! Validation lives here, at the boundary: a frame that passes `validate()`
//! satisfies every precondition the inference core assumes (complete 33/21
//! landmark sets, ordered bounding boxes, finite coordinates), so the core
//! itself performs no shape checks.

use crate::error::InferenceError;
use crate::types::{body_index, hand_index, BoundingBox, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input schema version accepted by this engine.
pub const FRAME_SCHEMA_VERSION: &str = "kinesic.frame.v1";

/// Output schema version produced by the encoder.
pub const ANNOTATION_SCHEMA_VERSION: &str = "kinesic.annotation.v1";

/// Landmark coordinates slightly outside the crop are tolerated (estimators
/// emit out-of-crop points for partially visible joints); beyond this margin
/// the detection is rejected.
const COORDINATE_MARGIN: f64 = 0.5;

/// One detected person in one frame, as supplied upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDetection {
    /// Detector bounding box, pixel space, clamped to frame bounds.
    pub bbox: BoundingBox,
    /// Complete 33-point body landmark set, normalized to the crop.
    pub body: Vec<Point>,
    /// Complete 21-point hand landmark set, when a hand was detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Point>>,
}

/// One frame of detections from the upstream pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Must equal [`FRAME_SCHEMA_VERSION`] when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub frame_index: u64,
    /// Capture timestamp, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
    /// Identifier of the capture source (camera, file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default)]
    pub detections: Vec<PersonDetection>,
}

/// Validation failures for frames and detections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid schema version: expected {expected}, got {got}")]
    InvalidSchemaVersion { expected: String, got: String },

    #[error("detection {index}: body landmark count must be {expected}, got {got}")]
    BodyLandmarkCount {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("detection {index}: hand landmark count must be {expected}, got {got}")]
    HandLandmarkCount {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("detection {index}: bounding box not ordered (x1 < x2, y1 < y2 required)")]
    UnorderedBoundingBox { index: usize },

    #[error("detection {index}: landmark coordinate is not finite")]
    NonFiniteCoordinate { index: usize },

    #[error("detection {index}: landmark coordinate far outside the crop")]
    CoordinateOutOfRange { index: usize },
}

impl PersonDetection {
    /// Validate this detection against the engine's preconditions.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.bbox.x1 >= self.bbox.x2 || self.bbox.y1 >= self.bbox.y2 {
            return Err(ValidationError::UnorderedBoundingBox { index });
        }

        if self.body.len() != body_index::POINT_COUNT {
            return Err(ValidationError::BodyLandmarkCount {
                index,
                expected: body_index::POINT_COUNT,
                got: self.body.len(),
            });
        }
        validate_points(&self.body, index)?;

        if let Some(hand) = &self.hand {
            if hand.len() != hand_index::POINT_COUNT {
                return Err(ValidationError::HandLandmarkCount {
                    index,
                    expected: hand_index::POINT_COUNT,
                    got: hand.len(),
                });
            }
            validate_points(hand, index)?;
        }

        Ok(())
    }
}

fn validate_points(points: &[Point], index: usize) -> Result<(), ValidationError> {
    for point in points {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate { index });
        }
        let range = -COORDINATE_MARGIN..=(1.0 + COORDINATE_MARGIN);
        if !range.contains(&point.x) || !range.contains(&point.y) {
            return Err(ValidationError::CoordinateOutOfRange { index });
        }
    }
    Ok(())
}

impl FrameObservation {
    /// Validate the frame and every detection in it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(version) = &self.schema_version {
            if version != FRAME_SCHEMA_VERSION {
                return Err(ValidationError::InvalidSchemaVersion {
                    expected: FRAME_SCHEMA_VERSION.to_string(),
                    got: version.clone(),
                });
            }
        }

        for (index, detection) in self.detections.iter().enumerate() {
            detection.validate(index)?;
        }

        Ok(())
    }
}

/// A validation failure located within a parsed frame sequence.
#[derive(Debug, Clone, Serialize)]
pub struct FrameValidationFailure {
    /// Position within the parsed sequence.
    pub index: usize,
    pub frame_index: u64,
    /// Rendered validation error.
    pub error: String,
}

/// Parser for frame observation streams.
pub struct FrameAdapter;

impl FrameAdapter {
    /// Parse newline-delimited JSON, one frame per line. Blank lines are
    /// skipped.
    pub fn parse_ndjson(input: &str) -> Result<Vec<FrameObservation>, InferenceError> {
        let mut frames = Vec::new();
        for (line_no, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame: FrameObservation = serde_json::from_str(trimmed).map_err(|e| {
                InferenceError::ParseError(format!("line {}: {}", line_no + 1, e))
            })?;
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Parse a JSON array of frames.
    pub fn parse_array(input: &str) -> Result<Vec<FrameObservation>, InferenceError> {
        serde_json::from_str(input)
            .map_err(|e| InferenceError::ParseError(format!("frame array: {}", e)))
    }

    /// Validate a parsed sequence, collecting every failure.
    pub fn validate_frames(frames: &[FrameObservation]) -> Vec<FrameValidationFailure> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(index, frame)| {
                frame.validate().err().map(|error| FrameValidationFailure {
                    index,
                    frame_index: frame.frame_index,
                    error: error.to_string(),
                })
            })
            .collect()
    }
}
