//! lensfit-core — Face-shape classification and eyewear recommendation.
//!
//! Takes face-mesh landmark frames from an external detector, classifies
//! the face shape with a geometric heuristic, and ranks a fixed frame
//! catalog against the result.

pub mod catalog;
pub mod classifier;
pub mod landmarks;
pub mod recommend;
pub mod session;
pub mod types;

pub use catalog::{Catalog, CatalogError, FrameEntry};
pub use classifier::{classify, ClassifyError};
pub use landmarks::{LandmarkCapture, LandmarkError, LandmarkFrame, FACE_MESH_POINTS};
pub use recommend::{
    rank, FaceRecommendation, GeometryScorer, MembershipScorer, Priority, Scorer, ScoringStrategy,
};
pub use session::{AnalysisError, TryOnSession};
pub use types::{FaceAnalysis, FaceGeometry, FaceRatios, FaceShape, Point};
