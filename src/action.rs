//! Body action classification
//!
//! An ordered table of independent scoring rules is evaluated against the
//! current motion features and landmarks; the best-scoring candidate is then
//! passed through a hysteresis gate that suppresses low-confidence label
//! changes, keeping the committed label stable under frame-to-frame noise.

use crate::features::MotionFeatures;
use crate::types::{ActionLabel, ActionReading, BodyLandmarks};
use serde::{Deserialize, Serialize};

/// Minimum confidence a competing candidate needs to displace the committed
/// label.
pub const COMMIT_THRESHOLD: f64 = 0.65;

/// Confidence reported when no rule fires and the previous label is carried.
pub const CARRY_CONFIDENCE: f64 = 0.4;

/// Upper clamp on reported action confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Decay applied to the carried confidence when a contested change is
/// rejected by the gate.
const CONTESTED_DECAY: f64 = 0.9;

/// One scoring rule: fires with a score, or not at all.
///
/// Rules are independent and not mutually exclusive; several may fire in the
/// same frame. Table order is the tie-break for equal scores.
pub struct ActionRule {
    pub label: ActionLabel,
    pub eval: fn(&MotionFeatures, &BodyLandmarks) -> Option<f64>,
}

fn standing(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    (f.speed < 1.5).then_some(0.9)
}

fn walking(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    (f.speed >= 1.5 && f.speed < 4.0).then_some(0.7)
}

fn running(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    // High speed with quiet hands; score scales with speed.
    (f.speed >= 4.5 && f.hand_activity < 0.015).then(|| (f.speed / 8.0).min(0.9))
}

fn waving(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    (f.hand_activity > 0.03 && f.speed < 3.0).then_some(0.8)
}

fn clapping(f: &MotionFeatures, b: &BodyLandmarks) -> Option<f64> {
    (b.wrist_separation() < 0.03 && f.hand_activity > 0.04).then_some(0.9)
}

fn raised_hands(_f: &MotionFeatures, b: &BodyLandmarks) -> Option<f64> {
    (b.left_wrist().y < b.left_shoulder().y && b.right_wrist().y < b.right_shoulder().y)
        .then_some(0.85)
}

fn leaning(_f: &MotionFeatures, b: &BodyLandmarks) -> Option<f64> {
    (b.nose().y > (b.left_shoulder().y + b.right_shoulder().y) / 2.0).then_some(0.7)
}

fn jumping(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    (f.vertical_motion > 6.0 && f.speed > 3.0).then_some(0.9)
}

fn hopping(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    // Only fires when the jumping rule does not.
    (f.vertical_motion > 3.0 && !(f.vertical_motion > 6.0 && f.speed > 3.0)).then_some(0.6)
}

fn active_moving(f: &MotionFeatures, _b: &BodyLandmarks) -> Option<f64> {
    (f.speed > 2.0 || f.hand_activity > 0.02).then_some(0.6)
}

/// The full rule table, in tie-break order.
pub const ACTION_RULES: &[ActionRule] = &[
    ActionRule { label: ActionLabel::Standing, eval: standing },
    ActionRule { label: ActionLabel::Walking, eval: walking },
    ActionRule { label: ActionLabel::Running, eval: running },
    ActionRule { label: ActionLabel::Waving, eval: waving },
    ActionRule { label: ActionLabel::Clapping, eval: clapping },
    ActionRule { label: ActionLabel::RaisedHands, eval: raised_hands },
    ActionRule { label: ActionLabel::Leaning, eval: leaning },
    ActionRule { label: ActionLabel::Jumping, eval: jumping },
    ActionRule { label: ActionLabel::Hopping, eval: hopping },
    ActionRule { label: ActionLabel::ActiveMoving, eval: active_moving },
];

/// Evaluate every rule, collecting all fired candidates in table order.
pub fn score_candidates(
    features: &MotionFeatures,
    body: &BodyLandmarks,
) -> Vec<(ActionLabel, f64)> {
    ACTION_RULES
        .iter()
        .filter_map(|rule| (rule.eval)(features, body).map(|score| (rule.label, score)))
        .collect()
}

/// Best candidate by score; ties resolved by table order (first listed wins).
fn best_candidate(candidates: &[(ActionLabel, f64)]) -> Option<(ActionLabel, f64)> {
    let mut best: Option<(ActionLabel, f64)> = None;
    for &(label, score) in candidates {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((label, score)),
        }
    }
    best
}

/// Hysteresis-stabilized action classifier for one tracked person.
///
/// The committed label only changes when the competing candidate clears
/// [`COMMIT_THRESHOLD`]; a rejected change re-emits the committed label with
/// decayed confidence. Initial committed label: [`ActionLabel::Standing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionClassifier {
    last_action: ActionLabel,
}

impl Default for ActionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionClassifier {
    pub fn new() -> Self {
        Self {
            last_action: ActionLabel::Standing,
        }
    }

    /// The currently committed label.
    pub fn last_action(&self) -> ActionLabel {
        self.last_action
    }

    /// Classify one frame and commit the resulting label.
    pub fn classify(&mut self, features: &MotionFeatures, body: &BodyLandmarks) -> ActionReading {
        let candidates = score_candidates(features, body);
        self.commit(best_candidate(&candidates))
    }

    /// Guarded transition of the hysteresis state machine.
    ///
    /// With no candidate, the committed label is carried at
    /// [`CARRY_CONFIDENCE`]. A candidate that differs from the committed label
    /// must clear [`COMMIT_THRESHOLD`]; otherwise the change is rejected and
    /// the committed label is re-emitted with decayed confidence.
    pub fn commit(&mut self, candidate: Option<(ActionLabel, f64)>) -> ActionReading {
        let (mut label, mut confidence) = match candidate {
            Some(selected) => selected,
            None => (self.last_action, CARRY_CONFIDENCE),
        };

        if label != self.last_action && confidence < COMMIT_THRESHOLD {
            label = self.last_action;
            confidence *= CONTESTED_DECAY;
        }

        self.last_action = label;

        ActionReading {
            label,
            confidence: round2(confidence.clamp(0.0, MAX_CONFIDENCE)),
        }
    }
}

/// Report confidence to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{body_index, Point};
    use pretty_assertions::assert_eq;

    fn neutral_body() -> BodyLandmarks {
        // Nose above shoulders, wrists below shoulders and apart: no pose rule fires.
        let mut points = vec![Point::new(0.5, 0.5); body_index::POINT_COUNT];
        points[body_index::NOSE] = Point::new(0.5, 0.1);
        points[body_index::LEFT_SHOULDER] = Point::new(0.4, 0.3);
        points[body_index::RIGHT_SHOULDER] = Point::new(0.6, 0.3);
        points[body_index::LEFT_WRIST] = Point::new(0.3, 0.6);
        points[body_index::RIGHT_WRIST] = Point::new(0.7, 0.8);
        BodyLandmarks::new(points)
    }

    fn features(speed: f64, hand_activity: f64, vertical_motion: f64) -> MotionFeatures {
        MotionFeatures {
            speed,
            hand_activity,
            vertical_motion,
        }
    }

    #[test]
    fn test_standing_rule_fires_below_threshold() {
        for speed in [0.0, 0.5, 1.0, 1.49] {
            let candidates = score_candidates(&features(speed, 0.0, 0.0), &neutral_body());
            assert!(
                candidates.contains(&(ActionLabel::Standing, 0.9)),
                "speed {speed} must produce a standing candidate"
            );
        }

        let candidates = score_candidates(&features(1.5, 0.0, 0.0), &neutral_body());
        assert!(!candidates.iter().any(|(l, _)| *l == ActionLabel::Standing));
    }

    #[test]
    fn test_running_score_scales_with_speed() {
        let candidates = score_candidates(&features(5.0, 0.0, 0.0), &neutral_body());
        let running = candidates
            .iter()
            .find(|(l, _)| *l == ActionLabel::Running)
            .unwrap();
        assert!((running.1 - 5.0 / 8.0).abs() < 1e-9);

        // Score caps at 0.9 for very high speed
        let candidates = score_candidates(&features(10.0, 0.0, 0.0), &neutral_body());
        let running = candidates
            .iter()
            .find(|(l, _)| *l == ActionLabel::Running)
            .unwrap();
        assert_eq!(running.1, 0.9);
    }

    #[test]
    fn test_running_requires_quiet_hands() {
        let candidates = score_candidates(&features(6.0, 0.02, 0.0), &neutral_body());
        assert!(!candidates.iter().any(|(l, _)| *l == ActionLabel::Running));
    }

    #[test]
    fn test_clapping_candidate() {
        let mut points = vec![Point::new(0.5, 0.5); body_index::POINT_COUNT];
        points[body_index::NOSE] = Point::new(0.5, 0.1);
        points[body_index::LEFT_SHOULDER] = Point::new(0.4, 0.3);
        points[body_index::RIGHT_SHOULDER] = Point::new(0.6, 0.3);
        points[body_index::LEFT_WRIST] = Point::new(0.45, 0.52);
        points[body_index::RIGHT_WRIST] = Point::new(0.55, 0.50);
        let body = BodyLandmarks::new(points);

        let candidates = score_candidates(&features(0.5, 0.05, 0.0), &body);
        assert!(candidates.contains(&(ActionLabel::Clapping, 0.9)));
    }

    #[test]
    fn test_jumping_outranks_hopping() {
        let candidates = score_candidates(&features(4.0, 0.0, 7.0), &neutral_body());
        assert!(candidates.contains(&(ActionLabel::Jumping, 0.9)));
        assert!(!candidates.iter().any(|(l, _)| *l == ActionLabel::Hopping));
    }

    #[test]
    fn test_hopping_without_jumping() {
        // vert > 3 but speed too low for jumping
        let candidates = score_candidates(&features(1.0, 0.0, 4.0), &neutral_body());
        assert!(candidates.contains(&(ActionLabel::Hopping, 0.6)));
        assert!(!candidates.iter().any(|(l, _)| *l == ActionLabel::Jumping));
    }

    #[test]
    fn test_tie_break_is_table_order() {
        // standing (0.9) and clapping (0.9) both fire; standing is listed first.
        let mut points = vec![Point::new(0.5, 0.5); body_index::POINT_COUNT];
        points[body_index::NOSE] = Point::new(0.5, 0.1);
        points[body_index::LEFT_SHOULDER] = Point::new(0.4, 0.3);
        points[body_index::RIGHT_SHOULDER] = Point::new(0.6, 0.3);
        points[body_index::LEFT_WRIST] = Point::new(0.45, 0.51);
        points[body_index::RIGHT_WRIST] = Point::new(0.55, 0.50);
        let body = BodyLandmarks::new(points);

        let mut classifier = ActionClassifier::new();
        let reading = classifier.classify(&features(0.5, 0.05, 0.0), &body);
        assert_eq!(reading.label, ActionLabel::Standing);
        assert_eq!(reading.confidence, 0.9);
    }

    #[test]
    fn test_first_frame_standing() {
        // Empty history: speed 0, vert 0 -> standing at 0.9, and the initial
        // committed label is already standing so the gate never fires.
        let mut classifier = ActionClassifier::new();
        let reading = classifier.classify(&features(0.0, 0.0, 0.0), &neutral_body());

        assert_eq!(reading.label, ActionLabel::Standing);
        assert_eq!(reading.confidence, 0.9);
    }

    #[test]
    fn test_hysteresis_rejects_weak_change() {
        let mut classifier = ActionClassifier::new();
        classifier.classify(&features(0.0, 0.0, 0.0), &neutral_body());
        assert_eq!(classifier.last_action(), ActionLabel::Standing);

        // hopping (0.6) and active_moving (0.6) fire, but 0.6 < 0.65
        let reading = classifier.classify(&features(4.2, 0.0, 4.0), &neutral_body());
        assert_eq!(reading.label, ActionLabel::Standing);
        assert!((reading.confidence - 0.54).abs() < 1e-9); // 0.6 * 0.9
        assert_eq!(classifier.last_action(), ActionLabel::Standing);
    }

    #[test]
    fn test_hysteresis_commits_strong_change() {
        let mut classifier = ActionClassifier::new();
        classifier.classify(&features(0.0, 0.0, 0.0), &neutral_body());

        // walking at 0.7 clears the 0.65 gate
        let reading = classifier.classify(&features(2.0, 0.0, 0.0), &neutral_body());
        assert_eq!(reading.label, ActionLabel::Walking);
        assert_eq!(reading.confidence, 0.7);
        assert_eq!(classifier.last_action(), ActionLabel::Walking);
    }

    #[test]
    fn test_carry_over_when_no_candidate() {
        let mut classifier = ActionClassifier::new();
        // walking commits first
        classifier.classify(&features(2.0, 0.0, 0.0), &neutral_body());

        let reading = classifier.commit(None);
        assert_eq!(reading.label, ActionLabel::Walking);
        assert_eq!(reading.confidence, CARRY_CONFIDENCE);
    }

    #[test]
    fn test_commit_gate_thresholds() {
        // Exactly at the threshold the change commits
        let mut classifier = ActionClassifier::new();
        let reading = classifier.commit(Some((ActionLabel::Leaning, COMMIT_THRESHOLD)));
        assert_eq!(reading.label, ActionLabel::Leaning);
        assert_eq!(reading.confidence, COMMIT_THRESHOLD);

        // Just below, it is rejected and decayed
        let mut classifier = ActionClassifier::new();
        let reading = classifier.commit(Some((ActionLabel::Leaning, 0.64)));
        assert_eq!(reading.label, ActionLabel::Standing);
        assert!((reading.confidence - 0.58).abs() < 1e-9); // round2(0.64 * 0.9)
    }

    #[test]
    fn test_confidence_clamp() {
        let mut classifier = ActionClassifier::new();
        for _ in 0..50 {
            let reading = classifier.classify(&features(0.0, 0.0, 0.0), &neutral_body());
            assert!(reading.confidence >= 0.0);
            assert!(reading.confidence <= MAX_CONFIDENCE);
        }
    }

    #[test]
    fn test_scoring_depends_only_on_inputs() {
        let f = features(2.0, 0.01, 1.0);
        let body = neutral_body();
        let first = score_candidates(&f, &body);
        let second = score_candidates(&f, &body);
        assert_eq!(first, second);
    }
}
