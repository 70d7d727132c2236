//! Annotation payload encoding
//!
//! Wraps per-person annotations in a versioned payload carrying producer,
//! provenance, and quality metadata, ready for downstream renderers or
//! transports.

use crate::error::InferenceError;
use crate::schema::{FrameObservation, ANNOTATION_SCHEMA_VERSION};
use crate::types::{
    AnnotationPayload, AnnotationProducer, AnnotationProvenance, AnnotationQuality,
    PersonAnnotation,
};
use crate::{KINESIC_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Encoder for annotation payloads.
pub struct AnnotationEncoder {
    instance_id: String,
}

impl Default for AnnotationEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationEncoder {
    /// Create a new encoder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID.
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the payload for one annotated frame.
    pub fn encode(
        &self,
        frame: &FrameObservation,
        people: Vec<PersonAnnotation>,
    ) -> AnnotationPayload {
        let producer = AnnotationProducer {
            name: PRODUCER_NAME.to_string(),
            version: KINESIC_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = AnnotationProvenance {
            source_id: frame
                .source_id
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            observed_at_utc: frame.observed_at.map(|t| t.to_rfc3339()),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let quality = build_quality(&people);

        AnnotationPayload {
            schema_version: ANNOTATION_SCHEMA_VERSION.to_string(),
            producer,
            provenance,
            quality,
            frame_index: frame.frame_index,
            people,
        }
    }

    /// Encode one annotated frame to a JSON string.
    pub fn encode_to_json(
        &self,
        frame: &FrameObservation,
        people: Vec<PersonAnnotation>,
    ) -> Result<String, InferenceError> {
        let payload = self.encode(frame, people);
        serde_json::to_string(&payload)
            .map_err(|e| InferenceError::EncodingError(e.to_string()))
    }
}

fn build_quality(people: &[PersonAnnotation]) -> AnnotationQuality {
    let mean_confidence = if people.is_empty() {
        0.0
    } else {
        people.iter().map(|p| p.primary_confidence()).sum::<f64>() / people.len() as f64
    };

    AnnotationQuality {
        people: people.len(),
        mean_confidence,
        hands_detected: people.iter().filter(|p| p.gesture.is_some()).count(),
    }
}
