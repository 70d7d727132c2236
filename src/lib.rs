//! Kinesic - On-device inference engine for human action, intent, and gesture signals
//!
//! Kinesic turns per-frame person detections (bounding boxes plus body/hand
//! landmark sets from an external pose estimator) into stable human-readable
//! labels through a deterministic pipeline: track association → rolling
//! feature aggregation → rule-based classification → hysteresis
//! stabilization → annotation encoding.
//!
//! ## Modules
//!
//! - **Window**: rolling temporal buffers and derived motion features
//! - **Classifiers**: body action (stateful, hysteresis-gated), short-term
//!   intent and hand gesture (stateless)
//! - **Tracker**: per-person identity so temporal state never bleeds between
//!   people in a frame

pub mod action;
pub mod encoder;
pub mod error;
pub mod features;
pub mod gesture;
pub mod intent;
pub mod pipeline;
pub mod schema;
pub mod tracker;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use action::ActionClassifier;
pub use error::InferenceError;
pub use features::MotionFeatures;
pub use gesture::GestureClassifier;
pub use intent::IntentPredictor;
pub use pipeline::{analyze_frames_ndjson, FrameAnalyzer};
pub use tracker::{PersonTracker, TrackerConfig};
pub use window::MotionWindow;

// Schema exports
pub use schema::{FrameObservation, PersonDetection, ANNOTATION_SCHEMA_VERSION, FRAME_SCHEMA_VERSION};

/// Kinesic version embedded in all annotation payloads
pub const KINESIC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for annotation payloads
pub const PRODUCER_NAME: &str = "kinesic";
