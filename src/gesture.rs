//! Hand gesture classification
//!
//! Stateless, single-frame classification over the 21-point hand landmark
//! set. Five finger-extension booleans are derived by comparing each
//! fingertip against its lower joint (tip above joint in image space means
//! extended), then matched against an ordered rule list.

use crate::types::{hand_index, GestureLabel, GestureReading, HandLandmarks};

/// Extension state of the five fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    /// Derive extension states from hand landmarks.
    ///
    /// A finger is extended when its tip is higher in image space than the
    /// paired joint (tip.y < joint.y).
    pub fn from_landmarks(hand: &HandLandmarks) -> Self {
        let up = |tip: usize, joint: usize| hand.point(tip).y < hand.point(joint).y;

        Self {
            thumb: up(hand_index::THUMB_TIP, hand_index::THUMB_IP),
            index: up(hand_index::INDEX_TIP, hand_index::INDEX_PIP),
            middle: up(hand_index::MIDDLE_TIP, hand_index::MIDDLE_PIP),
            ring: up(hand_index::RING_TIP, hand_index::RING_PIP),
            pinky: up(hand_index::PINKY_TIP, hand_index::PINKY_PIP),
        }
    }

    fn all(&self) -> bool {
        self.thumb && self.index && self.middle && self.ring && self.pinky
    }

    fn none(&self) -> bool {
        !self.thumb && !self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Stateless hand gesture classifier.
pub struct GestureClassifier;

impl GestureClassifier {
    /// Classify a hand, or return `None` when no hand landmark set is
    /// available (the caller reports confidence 0.0 for that case).
    pub fn classify(hand: Option<&HandLandmarks>) -> Option<GestureReading> {
        hand.map(|h| Self::classify_fingers(&FingerStates::from_landmarks(h)))
    }

    /// Ordered rule list over finger states; first match wins.
    pub fn classify_fingers(fingers: &FingerStates) -> GestureReading {
        if fingers.all() {
            return GestureReading {
                label: GestureLabel::OpenPalm,
                confidence: 0.9,
            };
        }

        if fingers.none() {
            return GestureReading {
                label: GestureLabel::Fist,
                confidence: 0.9,
            };
        }

        if fingers.index && fingers.middle && !fingers.ring {
            return GestureReading {
                label: GestureLabel::VSign,
                confidence: 0.85,
            };
        }

        if fingers.thumb && !fingers.index {
            return GestureReading {
                label: GestureLabel::ThumbsUp,
                confidence: 0.85,
            };
        }

        if fingers.thumb && fingers.pinky && !fingers.index {
            return GestureReading {
                label: GestureLabel::CallGesture,
                confidence: 0.8,
            };
        }

        GestureReading {
            label: GestureLabel::GenericGesture,
            confidence: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    /// Build a hand where the listed fingers are extended.
    fn make_hand(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> HandLandmarks {
        let mut points = vec![Point::new(0.5, 0.5); hand_index::POINT_COUNT];
        let pairs = [
            (hand_index::THUMB_TIP, hand_index::THUMB_IP, thumb),
            (hand_index::INDEX_TIP, hand_index::INDEX_PIP, index),
            (hand_index::MIDDLE_TIP, hand_index::MIDDLE_PIP, middle),
            (hand_index::RING_TIP, hand_index::RING_PIP, ring),
            (hand_index::PINKY_TIP, hand_index::PINKY_PIP, pinky),
        ];
        for (tip, joint, extended) in pairs {
            points[joint] = Point::new(0.5, 0.5);
            points[tip] = Point::new(0.5, if extended { 0.3 } else { 0.7 });
        }
        HandLandmarks::new(points)
    }

    #[test]
    fn test_open_palm() {
        let hand = make_hand(true, true, true, true, true);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::OpenPalm);
        assert_eq!(reading.confidence, 0.9);
    }

    #[test]
    fn test_fist() {
        let hand = make_hand(false, false, false, false, false);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::Fist);
        assert_eq!(reading.confidence, 0.9);
    }

    #[test]
    fn test_v_sign() {
        let hand = make_hand(false, true, true, false, false);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::VSign);
        assert_eq!(reading.confidence, 0.85);
    }

    #[test]
    fn test_thumbs_up() {
        let hand = make_hand(true, false, false, false, false);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::ThumbsUp);
        assert_eq!(reading.confidence, 0.85);
    }

    #[test]
    fn test_thumbs_up_shadows_call_gesture() {
        // thumb + pinky without index also matches the thumbs-up rule,
        // which is listed first; rule order decides.
        let hand = make_hand(true, false, false, false, true);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::ThumbsUp);
    }

    #[test]
    fn test_generic_fallback() {
        // index only: no specific rule matches
        let hand = make_hand(false, true, false, false, false);
        let reading = GestureClassifier::classify(Some(&hand)).unwrap();
        assert_eq!(reading.label, GestureLabel::GenericGesture);
        assert_eq!(reading.confidence, 0.6);
    }

    #[test]
    fn test_no_hand_is_none() {
        assert_eq!(GestureClassifier::classify(None), None);
    }

    #[test]
    fn test_idempotent() {
        let hand = make_hand(true, true, false, false, true);
        let first = GestureClassifier::classify(Some(&hand));
        let second = GestureClassifier::classify(Some(&hand));
        assert_eq!(first, second);
    }
}
