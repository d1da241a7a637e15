//! lensfit-capture — Landmark arrival and auto-capture gating.
//!
//! Defines the detector seam, derives a face bounding box from each
//! landmark frame, and decides when a live stream has held a usable face
//! long enough to trigger an analysis.

pub mod detector;
pub mod face_box;
pub mod frame;
pub mod gate;

pub use detector::{DetectorError, LandmarkDetector, ReplayDetector};
pub use face_box::{FaceBox, PositioningRules};
pub use frame::Frame;
pub use gate::{CaptureGate, GateConfig, GateEvent};
