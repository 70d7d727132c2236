//! Short-term intent prediction
//!
//! A stateless, ordered decision list over the aggregated motion features.
//! First matching rule wins; the fallback is an "analyzing" reading at low
//! confidence.

use crate::features::MotionFeatures;
use crate::types::{IntentLabel, IntentReading};

/// Intent predictor over aggregated motion features.
pub struct IntentPredictor;

impl IntentPredictor {
    /// Predict short-term intent. Pure function of the features.
    pub fn predict(features: &MotionFeatures) -> IntentReading {
        if features.speed < 1.5 {
            return IntentReading {
                label: IntentLabel::AboutToStop,
                confidence: 0.8,
            };
        }

        if features.vertical_motion > 3.0 {
            return IntentReading {
                label: IntentLabel::AboutToJump,
                confidence: 0.75,
            };
        }

        if features.speed > 3.0 {
            return IntentReading {
                label: IntentLabel::WillContinueMoving,
                confidence: 0.85,
            };
        }

        IntentReading {
            label: IntentLabel::Analyzing,
            confidence: 0.4,
        }
    }
}
