//! Face-mesh landmark frames and the fixed indices the classifier reads.
//!
//! A frame is validated once at construction, so downstream code can index
//! the named landmarks directly.

use crate::types::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points in a face-mesh frame.
pub const FACE_MESH_POINTS: usize = 468;

/// Face-mesh indices of the landmarks used for shape measurement.
pub mod indices {
    /// Left eye, outer corner.
    pub const LEFT_EYE: usize = 33;
    /// Right eye, inner corner.
    pub const RIGHT_EYE: usize = 362;
    /// Chin, lower midline.
    pub const CHIN: usize = 175;
    /// Forehead center, between the brows.
    pub const FOREHEAD: usize = 9;
    /// Left cheekbone (widest point).
    pub const LEFT_CHEEK: usize = 234;
    /// Right cheekbone (widest point).
    pub const RIGHT_CHEEK: usize = 454;
    /// Left jaw angle.
    pub const LEFT_JAW: usize = 172;
    /// Right jaw angle.
    pub const RIGHT_JAW: usize = 397;
    /// Left forehead edge.
    pub const LEFT_FOREHEAD: usize = 103;
    /// Right forehead edge.
    pub const RIGHT_FOREHEAD: usize = 332;
}

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("insufficient landmarks: expected {expected}, got {actual}")]
    InsufficientLandmarks { expected: usize, actual: usize },
    #[error("source image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("malformed landmark capture: {0}")]
    Json(#[from] serde_json::Error),
}

/// One detector frame: 468 normalized points plus the source image size.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: Vec<Point>,
    width: u32,
    height: u32,
}

impl LandmarkFrame {
    /// Build a frame, rejecting wrong point counts and zero-area images.
    pub fn new(points: Vec<Point>, width: u32, height: u32) -> Result<Self, LandmarkError> {
        if points.len() != FACE_MESH_POINTS {
            return Err(LandmarkError::InsufficientLandmarks {
                expected: FACE_MESH_POINTS,
                actual: points.len(),
            });
        }
        if width == 0 || height == 0 {
            return Err(LandmarkError::EmptyImage { width, height });
        }
        Ok(Self {
            points,
            width,
            height,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Landmark `index` scaled to pixel coordinates.
    ///
    /// Callers only pass indices from [`indices`], all below [`FACE_MESH_POINTS`].
    pub fn pixel(&self, index: usize) -> (f32, f32) {
        let p = self.points[index];
        (p.x * self.width as f32, p.y * self.height as f32)
    }
}

/// Serialized detector output as recorded by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkCapture {
    pub width: u32,
    pub height: u32,
    pub landmarks: Vec<Point>,
}

impl LandmarkCapture {
    pub fn from_json(json: &str) -> Result<Self, LandmarkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_frame(self) -> Result<LandmarkFrame, LandmarkError> {
        LandmarkFrame::new(self.landmarks, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_points() -> Vec<Point> {
        vec![Point::new(0.5, 0.5); FACE_MESH_POINTS]
    }

    #[test]
    fn test_frame_rejects_short_sequence() {
        let err = LandmarkFrame::new(vec![Point::new(0.5, 0.5); 10], 640, 480).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::InsufficientLandmarks {
                expected: 468,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_frame_rejects_zero_area() {
        let err = LandmarkFrame::new(centered_points(), 0, 480).unwrap_err();
        assert!(matches!(
            err,
            LandmarkError::EmptyImage {
                width: 0,
                height: 480
            }
        ));
    }

    #[test]
    fn test_pixel_denormalizes() {
        let mut points = centered_points();
        points[indices::CHIN] = Point::new(0.25, 0.75);
        let frame = LandmarkFrame::new(points, 640, 480).unwrap();
        let (x, y) = frame.pixel(indices::CHIN);
        assert!((x - 160.0).abs() < 1e-4);
        assert!((y - 360.0).abs() < 1e-4);
    }

    #[test]
    fn test_capture_from_json() {
        let points: Vec<String> = (0..FACE_MESH_POINTS)
            .map(|_| r#"{"x":0.5,"y":0.5,"z":0.01}"#.to_string())
            .collect();
        let json = format!(
            r#"{{"width":640,"height":480,"landmarks":[{}]}}"#,
            points.join(",")
        );
        let frame = LandmarkCapture::from_json(&json).unwrap().into_frame().unwrap();
        assert_eq!(frame.points().len(), FACE_MESH_POINTS);
        assert_eq!((frame.width(), frame.height()), (640, 480));
    }

    #[test]
    fn test_capture_malformed_json() {
        assert!(matches!(
            LandmarkCapture::from_json("{\"width\": 1}"),
            Err(LandmarkError::Json(_))
        ));
    }
}
