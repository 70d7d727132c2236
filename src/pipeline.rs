//! Pipeline orchestration
//!
//! This module provides the public API for Kinesic. Per frame, it associates
//! detections with tracks, folds each detection into its track's motion
//! window, runs the three classifiers, and selects the primary reading for
//! display.

use crate::encoder::AnnotationEncoder;
use crate::error::InferenceError;
use crate::gesture::GestureClassifier;
use crate::intent::IntentPredictor;
use crate::schema::{FrameAdapter, FrameObservation};
use crate::tracker::{PersonTracker, TrackerConfig};
use crate::types::{BodyLandmarks, HandLandmarks, PersonAnnotation, PrimarySource};

/// Analyze a batch of frames (NDJSON, one frame per line) in one shot.
///
/// Frames are validated, then processed strictly in order through a fresh
/// analyzer, so temporal state builds up across the batch exactly as it
/// would in a live loop. Returns one annotation payload JSON string per
/// frame.
///
/// # Example
/// ```ignore
/// let payloads = analyze_frames_ndjson(&frames_ndjson)?;
/// ```
pub fn analyze_frames_ndjson(input: &str) -> Result<Vec<String>, InferenceError> {
    let frames = FrameAdapter::parse_ndjson(input)?;
    let mut analyzer = FrameAnalyzer::new();
    analyzer.analyze_batch(&frames)
}

/// Stateful frame analyzer with persistent per-track temporal state.
///
/// Use this when driving the engine from a live capture loop and the tracker
/// state must survive across calls.
pub struct FrameAnalyzer {
    tracker: PersonTracker,
    encoder: AnnotationEncoder,
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAnalyzer {
    /// Create an analyzer with default tracker settings.
    pub fn new() -> Self {
        Self {
            tracker: PersonTracker::new(),
            encoder: AnnotationEncoder::new(),
        }
    }

    /// Create an analyzer with specific tracker settings.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            tracker: PersonTracker::with_config(config),
            encoder: AnnotationEncoder::new(),
        }
    }

    /// Annotate every person in one frame.
    ///
    /// The frame is assumed validated (`FrameObservation::validate`); landmark
    /// completeness is a precondition here, not a checked failure.
    pub fn analyze(&mut self, frame: &FrameObservation) -> Vec<PersonAnnotation> {
        let centers: Vec<(f64, f64)> = frame.detections.iter().map(|d| d.bbox.center()).collect();
        let (assigned, _) = self.tracker.assign(&centers);

        frame
            .detections
            .iter()
            .zip(assigned)
            .filter_map(|(detection, track_id)| {
                let body = BodyLandmarks::new(detection.body.clone());
                let hand = detection
                    .hand
                    .as_ref()
                    .map(|points| HandLandmarks::new(points.clone()));

                let track = self.tracker.track_mut(track_id)?;
                track.window.update(&detection.bbox, &body);

                let features = track.window.features();
                let action = track.action.classify(&features, &body);
                let intent = IntentPredictor::predict(&features);
                let gesture = GestureClassifier::classify(hand.as_ref());

                // Gesture is foregrounded only when strictly more confident
                // than the action reading.
                let primary = match &gesture {
                    Some(g) if g.confidence > action.confidence => PrimarySource::Gesture,
                    _ => PrimarySource::Action,
                };

                Some(PersonAnnotation {
                    track_id,
                    bbox: detection.bbox,
                    action,
                    intent,
                    gesture,
                    primary,
                })
            })
            .collect()
    }

    /// Annotate one frame and encode the result to a payload JSON string.
    pub fn analyze_to_json(&mut self, frame: &FrameObservation) -> Result<String, InferenceError> {
        let people = self.analyze(frame);
        self.encoder.encode_to_json(frame, people)
    }

    /// Validate and annotate a sequence of frames, returning one payload JSON
    /// string per frame.
    pub fn analyze_batch(
        &mut self,
        frames: &[FrameObservation],
    ) -> Result<Vec<String>, InferenceError> {
        let mut payloads = Vec::with_capacity(frames.len());
        for frame in frames {
            frame.validate()?;
            payloads.push(self.analyze_to_json(frame)?);
        }
        Ok(payloads)
    }

    /// Number of live tracks.
    pub fn track_count(&self) -> usize {
        self.tracker.len()
    }

    /// Save tracker state to JSON.
    pub fn save_state(&self) -> Result<String, InferenceError> {
        self.tracker
            .to_json()
            .map_err(|e| InferenceError::StateError(e.to_string()))
    }

    /// Load tracker state from JSON.
    pub fn load_state(&mut self, json: &str) -> Result<(), InferenceError> {
        self.tracker =
            PersonTracker::from_json(json).map_err(|e| InferenceError::StateError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PersonDetection;
    use crate::types::{body_index, hand_index, BoundingBox, Point};

    fn neutral_body_points() -> Vec<Point> {
        let mut points = vec![Point::new(0.5, 0.5); body_index::POINT_COUNT];
        points[body_index::NOSE] = Point::new(0.5, 0.1);
        points[body_index::LEFT_SHOULDER] = Point::new(0.4, 0.3);
        points[body_index::RIGHT_SHOULDER] = Point::new(0.6, 0.3);
        points[body_index::LEFT_WRIST] = Point::new(0.3, 0.6);
        points[body_index::RIGHT_WRIST] = Point::new(0.7, 0.8);
        points
    }

    fn open_palm_points() -> Vec<Point> {
        let mut points = vec![Point::new(0.5, 0.5); hand_index::POINT_COUNT];
        let pairs = [
            (hand_index::THUMB_TIP, hand_index::THUMB_IP),
            (hand_index::INDEX_TIP, hand_index::INDEX_PIP),
            (hand_index::MIDDLE_TIP, hand_index::MIDDLE_PIP),
            (hand_index::RING_TIP, hand_index::RING_PIP),
            (hand_index::PINKY_TIP, hand_index::PINKY_PIP),
        ];
        for (tip, joint) in pairs {
            points[joint] = Point::new(0.5, 0.5);
            points[tip] = Point::new(0.5, 0.3);
        }
        points
    }

    fn detection_at(cx: i32, cy: i32, hand: Option<Vec<Point>>) -> PersonDetection {
        PersonDetection {
            bbox: BoundingBox::new(cx - 50, cy - 100, cx + 50, cy + 100),
            body: neutral_body_points(),
            hand,
        }
    }

    fn frame(frame_index: u64, detections: Vec<PersonDetection>) -> FrameObservation {
        FrameObservation {
            schema_version: None,
            frame_index,
            observed_at: None,
            source_id: None,
            detections,
        }
    }

    #[test]
    fn test_still_person_is_standing() {
        let mut analyzer = FrameAnalyzer::new();

        let people = analyzer.analyze(&frame(0, vec![detection_at(100, 100, None)]));
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].action.label.as_str(), "standing");
        assert_eq!(people[0].action.confidence, 0.9);
        assert_eq!(people[0].intent.label.as_str(), "about_to_stop");
        assert!(people[0].gesture.is_none());
        assert_eq!(people[0].primary, PrimarySource::Action);
    }

    #[test]
    fn test_gesture_overrides_action_when_more_confident() {
        let mut analyzer = FrameAnalyzer::new();

        // Standing reads 0.9; open palm reads 0.9: not strictly greater
        let people = analyzer.analyze(&frame(
            0,
            vec![detection_at(100, 100, Some(open_palm_points()))],
        ));
        assert_eq!(people[0].primary, PrimarySource::Action);

        // A fast diagonal step drops the action reading below 0.9 (running
        // scores speed/8), so the open palm wins the primary slot
        let people = analyzer.analyze(&frame(
            1,
            vec![detection_at(104, 96, Some(open_palm_points()))],
        ));
        assert!(people[0].action.confidence < 0.9);
        assert_eq!(people[0].primary, PrimarySource::Gesture);
    }

    #[test]
    fn test_two_people_keep_separate_state() {
        let mut analyzer = FrameAnalyzer::new();

        // Person A stands still; person B walks steadily right
        for i in 0..10 {
            let people = analyzer.analyze(&frame(
                i,
                vec![
                    detection_at(100, 100, None),
                    detection_at(400 + 3 * i as i32, 100, None),
                ],
            ));
            assert_eq!(people.len(), 2);
        }
        assert_eq!(analyzer.track_count(), 2);

        let people = analyzer.analyze(&frame(
            10,
            vec![detection_at(100, 100, None), detection_at(430, 100, None)],
        ));

        assert_eq!(people[0].action.label.as_str(), "standing");
        assert_eq!(people[1].action.label.as_str(), "walking");
    }

    #[test]
    fn test_batch_builds_temporal_state() {
        let frames: Vec<FrameObservation> = (0..5)
            .map(|i| frame(i, vec![detection_at(100 + 2 * i as i32, 100, None)]))
            .collect();

        let mut analyzer = FrameAnalyzer::new();
        let payloads = analyzer.analyze_batch(&frames).unwrap();
        assert_eq!(payloads.len(), 5);

        let last: serde_json::Value = serde_json::from_str(&payloads[4]).unwrap();
        // Same person throughout: one track, id 1
        assert_eq!(last["people"][0]["track_id"], 1);
        assert_eq!(analyzer.track_count(), 1);
    }

    #[test]
    fn test_batch_rejects_invalid_frame() {
        let mut bad = frame(0, vec![detection_at(100, 100, None)]);
        bad.detections[0].body.truncate(10);

        let mut analyzer = FrameAnalyzer::new();
        assert!(analyzer.analyze_batch(&[bad]).is_err());
    }

    #[test]
    fn test_analyze_frames_ndjson_one_shot() {
        let lines: Vec<String> = (0..3)
            .map(|i| {
                serde_json::to_string(&frame(i, vec![detection_at(100, 100, None)])).unwrap()
            })
            .collect();
        let input = lines.join("\n");

        let payloads = analyze_frames_ndjson(&input).unwrap();
        assert_eq!(payloads.len(), 3);

        let value: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(value["schema_version"], "kinesic.annotation.v1");
        assert_eq!(value["quality"]["people"], 1);
    }

    #[test]
    fn test_state_round_trip() {
        let mut analyzer = FrameAnalyzer::new();
        analyzer.analyze(&frame(0, vec![detection_at(100, 100, None)]));

        let state = analyzer.save_state().unwrap();

        let mut restored = FrameAnalyzer::new();
        restored.load_state(&state).unwrap();
        assert_eq!(restored.track_count(), 1);

        // Nearby detection re-associates to the restored track
        let people = restored.analyze(&frame(1, vec![detection_at(105, 100, None)]));
        assert_eq!(people[0].track_id, 1);
    }

    #[test]
    fn test_empty_frame_produces_empty_annotations() {
        let mut analyzer = FrameAnalyzer::new();
        let people = analyzer.analyze(&frame(0, vec![]));
        assert!(people.is_empty());
    }
}
