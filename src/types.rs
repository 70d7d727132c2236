//! Core types for the Kinesic inference engine
//!
//! This module defines the data structures that flow through the engine:
//! detector geometry, landmark sets, the fixed label vocabularies, and the
//! per-person readings and annotation payloads produced each frame.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
///
/// Produced once per person per frame by the upstream detector, already
/// clamped to frame bounds (x1 < x2, y1 < y2). Consumed, never retained
/// beyond the current update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Geometric center of the box in pixel space.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 + self.x2) as f64 / 2.0,
            (self.y1 + self.y2) as f64 / 2.0,
        )
    }
}

/// A normalized 2-D keypoint within a detection crop.
///
/// Coordinates are in [0, 1] relative to the person crop, origin top-left,
/// y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Anatomical index contract for the 33-point body landmark set.
pub mod body_index {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;

    /// Number of points in a complete body landmark set.
    pub const POINT_COUNT: usize = 33;
}

/// Fixed topology for the 21-point hand landmark set.
///
/// Each finger pairs a tip landmark with the lower joint used for the
/// extension test (tip.y < joint.y means extended).
pub mod hand_index {
    pub const THUMB_TIP: usize = 4;
    pub const THUMB_IP: usize = 2;
    pub const INDEX_TIP: usize = 8;
    pub const INDEX_PIP: usize = 6;
    pub const MIDDLE_TIP: usize = 12;
    pub const MIDDLE_PIP: usize = 10;
    pub const RING_TIP: usize = 16;
    pub const RING_PIP: usize = 14;
    pub const PINKY_TIP: usize = 20;
    pub const PINKY_PIP: usize = 18;

    /// Number of points in a complete hand landmark set.
    pub const POINT_COUNT: usize = 21;
}

/// A complete 33-point body landmark set.
///
/// The 33-point shape is a precondition enforced at the schema boundary
/// (`schema::PersonDetection::validate`); the engine does not re-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyLandmarks {
    points: Vec<Point>,
}

impl BodyLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn nose(&self) -> Point {
        self.points[body_index::NOSE]
    }

    pub fn left_shoulder(&self) -> Point {
        self.points[body_index::LEFT_SHOULDER]
    }

    pub fn right_shoulder(&self) -> Point {
        self.points[body_index::RIGHT_SHOULDER]
    }

    pub fn left_wrist(&self) -> Point {
        self.points[body_index::LEFT_WRIST]
    }

    pub fn right_wrist(&self) -> Point {
        self.points[body_index::RIGHT_WRIST]
    }

    /// Vertical separation of the wrists, `|leftWrist.y - rightWrist.y|`.
    pub fn wrist_separation(&self) -> f64 {
        (self.left_wrist().y - self.right_wrist().y).abs()
    }
}

/// A complete 21-point hand landmark set.
///
/// Like [`BodyLandmarks`], the 21-point shape is a schema-boundary
/// precondition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    points: Vec<Point>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }
}

/// Body action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLabel {
    Standing,
    Walking,
    Running,
    Waving,
    Clapping,
    RaisedHands,
    Leaning,
    Jumping,
    Hopping,
    ActiveMoving,
}

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLabel::Standing => "standing",
            ActionLabel::Walking => "walking",
            ActionLabel::Running => "running",
            ActionLabel::Waving => "waving",
            ActionLabel::Clapping => "clapping",
            ActionLabel::RaisedHands => "raised_hands",
            ActionLabel::Leaning => "leaning",
            ActionLabel::Jumping => "jumping",
            ActionLabel::Hopping => "hopping",
            ActionLabel::ActiveMoving => "active_moving",
        }
    }
}

/// Short-term intent vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    AboutToStop,
    AboutToJump,
    WillContinueMoving,
    Analyzing,
}

impl IntentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::AboutToStop => "about_to_stop",
            IntentLabel::AboutToJump => "about_to_jump",
            IntentLabel::WillContinueMoving => "will_continue_moving",
            IntentLabel::Analyzing => "analyzing",
        }
    }
}

/// Hand gesture vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    OpenPalm,
    Fist,
    VSign,
    ThumbsUp,
    CallGesture,
    GenericGesture,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::OpenPalm => "open_palm",
            GestureLabel::Fist => "fist",
            GestureLabel::VSign => "v_sign",
            GestureLabel::ThumbsUp => "thumbs_up",
            GestureLabel::CallGesture => "call_gesture",
            GestureLabel::GenericGesture => "generic_gesture",
        }
    }
}

/// Committed body action for one person in one frame.
///
/// Confidence lies in [0, 0.95], reported to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionReading {
    pub label: ActionLabel,
    pub confidence: f64,
}

/// Predicted short-term intent for one person in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentReading {
    pub label: IntentLabel,
    pub confidence: f64,
}

/// Recognized hand gesture for one person in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureReading {
    pub label: GestureLabel,
    pub confidence: f64,
}

/// Which reading the caller should foreground for display.
///
/// The gesture reading is primary only when its confidence strictly exceeds
/// the action confidence; otherwise the action reading is primary. The intent
/// reading is always secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySource {
    Action,
    Gesture,
}

/// Complete per-person annotation for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonAnnotation {
    /// Stable track identity across frames.
    pub track_id: u64,
    /// Detector bounding box for this frame.
    pub bbox: BoundingBox,
    pub action: ActionReading,
    pub intent: IntentReading,
    /// Absent when no hand landmark set was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture: Option<GestureReading>,
    pub primary: PrimarySource,
}

impl PersonAnnotation {
    /// Confidence of the reading selected as primary.
    pub fn primary_confidence(&self) -> f64 {
        match self.primary {
            PrimarySource::Action => self.action.confidence,
            PrimarySource::Gesture => self
                .gesture
                .map(|g| g.confidence)
                .unwrap_or(self.action.confidence),
        }
    }
}

/// Annotation payload producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Annotation payload provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationProvenance {
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at_utc: Option<String>,
    pub computed_at_utc: String,
}

/// Quality metrics for one annotated frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationQuality {
    /// Number of people annotated in this frame.
    pub people: usize,
    /// Mean primary-reading confidence across people (0 when empty).
    pub mean_confidence: f64,
    /// Number of people with a hand landmark set this frame.
    pub hands_detected: usize,
}

/// Complete annotation payload for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub schema_version: String,
    pub producer: AnnotationProducer,
    pub provenance: AnnotationProvenance,
    pub quality: AnnotationQuality,
    pub frame_index: u64,
    pub people: Vec<PersonAnnotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_center() {
        let bbox = BoundingBox::new(0, 0, 200, 100);
        assert_eq!(bbox.center(), (100.0, 50.0));

        // Odd extents land on half-pixel centers
        let bbox = BoundingBox::new(10, 10, 15, 21);
        assert_eq!(bbox.center(), (12.5, 15.5));
    }

    #[test]
    fn test_wrist_separation_is_symmetric() {
        let mut points = vec![Point::new(0.5, 0.5); body_index::POINT_COUNT];
        points[body_index::LEFT_WRIST] = Point::new(0.3, 0.2);
        points[body_index::RIGHT_WRIST] = Point::new(0.7, 0.8);
        let body = BodyLandmarks::new(points);

        assert!((body.wrist_separation() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_label_serialization_is_snake_case() {
        let json = serde_json::to_string(&ActionLabel::RaisedHands).unwrap();
        assert_eq!(json, r#""raised_hands""#);

        let json = serde_json::to_string(&IntentLabel::WillContinueMoving).unwrap();
        assert_eq!(json, r#""will_continue_moving""#);

        let json = serde_json::to_string(&GestureLabel::VSign).unwrap();
        assert_eq!(json, r#""v_sign""#);
    }

    #[test]
    fn test_as_str_matches_serde_rename() {
        for label in [
            ActionLabel::Standing,
            ActionLabel::RaisedHands,
            ActionLabel::ActiveMoving,
        ] {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!(r#""{}""#, label.as_str()));
        }
    }
}
