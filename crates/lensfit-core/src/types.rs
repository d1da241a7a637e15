use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized 2-D landmark point, both coordinates relative to the source image.
///
/// Face-mesh detectors also emit a relative depth `z`; it is not used and is
/// dropped on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Categorical face shape produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceShape {
    Oval,
    Round,
    Square,
    Heart,
    Diamond,
    Oblong,
}

impl FaceShape {
    pub const ALL: [FaceShape; 6] = [
        FaceShape::Oval,
        FaceShape::Round,
        FaceShape::Square,
        FaceShape::Heart,
        FaceShape::Diamond,
        FaceShape::Oblong,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaceShape::Oval => "oval",
            FaceShape::Round => "round",
            FaceShape::Square => "square",
            FaceShape::Heart => "heart",
            FaceShape::Diamond => "diamond",
            FaceShape::Oblong => "oblong",
        }
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaceShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaceShape::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown face shape: {s}"))
    }
}

/// Pixel-space measurements derived from a landmark frame.
///
/// Every field is an absolute difference, so all values are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceGeometry {
    pub face_width: f32,
    pub face_height: f32,
    pub jaw_width: f32,
    pub forehead_width: f32,
    pub cheek_width: f32,
    pub eye_distance: f32,
}

/// Shape-discriminating ratios over a [`FaceGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceRatios {
    /// Width over height.
    pub face_ratio: f32,
    pub jaw_to_face: f32,
    pub forehead_to_face: f32,
    pub cheek_to_jaw: f32,
    /// Eye distance over face width.
    pub eye_spacing: f32,
}

/// Classifier output for one captured frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    pub shape: FaceShape,
    /// In (0, 1].
    pub confidence: f32,
    pub geometry: FaceGeometry,
    pub ratios: FaceRatios,
    pub characteristics: Vec<String>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_shape_parse_roundtrip() {
        for shape in FaceShape::ALL {
            assert_eq!(shape.as_str().parse::<FaceShape>().unwrap(), shape);
        }
        assert_eq!(" Oblong ".parse::<FaceShape>().unwrap(), FaceShape::Oblong);
        assert!("triangle".parse::<FaceShape>().is_err());
    }

    #[test]
    fn test_point_ignores_depth() {
        let p: Point = serde_json::from_str(r#"{"x": 0.25, "y": 0.5, "z": -0.03}"#).unwrap();
        assert_eq!(p, Point::new(0.25, 0.5));
    }

    #[test]
    fn test_face_shape_serializes_lowercase() {
        let json = serde_json::to_string(&FaceShape::Diamond).unwrap();
        assert_eq!(json, "\"diamond\"");
    }
}
