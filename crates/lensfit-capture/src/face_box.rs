//! Face bounding box and the "well positioned" predicate that arms auto-capture.

use lensfit_core::Point;
use serde::Serialize;

/// Axis-aligned face box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    /// Bounding box of all landmarks, scaled to a `width`×`height` image.
    ///
    /// Returns `None` for an empty landmark slice.
    pub fn from_landmarks(points: &[Point], width: u32, height: u32) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let (w, h) = (width as f32, height as f32);
        Some(Self {
            x: min_x * w,
            y: min_y * h,
            width: (max_x - min_x) * w,
            height: (max_y - min_y) * h,
        })
    }
}

/// Size and placement requirements for a capture-ready face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositioningRules {
    pub min_width: f32,
    pub min_height: f32,
    /// Fraction of the image width kept clear on each side.
    pub margin_x: f32,
    /// Fraction of the image height kept clear at top and bottom.
    pub margin_y: f32,
}

impl Default for PositioningRules {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 250.0,
            margin_x: 0.15,
            margin_y: 0.10,
        }
    }
}

impl PositioningRules {
    /// Large enough and strictly inside the safe zone.
    pub fn is_well_positioned(&self, face: &FaceBox, width: u32, height: u32) -> bool {
        let (w, h) = (width as f32, height as f32);
        face.width > self.min_width
            && face.height > self.min_height
            && face.x > w * self.margin_x
            && face.x + face.width < w * (1.0 - self.margin_x)
            && face.y > h * self.margin_y
            && face.y + face.height < h * (1.0 - self.margin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32, y: f32, width: f32, height: f32) -> FaceBox {
        FaceBox {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_box_from_landmarks() {
        let points = [Point::new(0.25, 0.5), Point::new(0.75, 0.25), Point::new(0.5, 0.75)];
        let b = FaceBox::from_landmarks(&points, 640, 480).unwrap();
        assert_eq!(b, face(160.0, 120.0, 320.0, 240.0));
    }

    #[test]
    fn test_box_from_no_landmarks() {
        assert!(FaceBox::from_landmarks(&[], 640, 480).is_none());
    }

    #[test]
    fn test_centered_face_is_well_positioned() {
        let rules = PositioningRules::default();
        assert!(rules.is_well_positioned(&face(400.0, 150.0, 480.0, 420.0), 1280, 720));
    }

    #[test]
    fn test_small_face_rejected() {
        let rules = PositioningRules::default();
        assert!(!rules.is_well_positioned(&face(500.0, 200.0, 200.0, 300.0), 1280, 720));
        assert!(!rules.is_well_positioned(&face(500.0, 200.0, 300.0, 250.0), 1280, 720));
    }

    #[test]
    fn test_safe_zone_bounds() {
        let rules = PositioningRules::default();
        // Left clear line is 192 px of 1280.
        assert!(!rules.is_well_positioned(&face(191.0, 150.0, 400.0, 400.0), 1280, 720));
        assert!(rules.is_well_positioned(&face(193.0, 150.0, 400.0, 400.0), 1280, 720));
        // Bottom clear line is 648 px of 720.
        assert!(!rules.is_well_positioned(&face(400.0, 250.0, 400.0, 400.0), 1280, 720));
        // Right clear line is 1088 px.
        assert!(!rules.is_well_positioned(&face(700.0, 150.0, 400.0, 400.0), 1280, 720));
    }
}
