//! Geometric face-shape classifier.
//!
//! Measures widths and height between fixed face-mesh landmarks, derives
//! four proportion ratios, and walks an ordered rule list. Rules are not
//! mutually exclusive: each assumes every earlier rule already failed.

use crate::landmarks::{indices, LandmarkFrame};
use crate::types::{FaceAnalysis, FaceGeometry, FaceRatios, FaceShape};
use thiserror::Error;

// --- Calibrated thresholds ---
const WIDE_FACE_RATIO: f32 = 0.95;
const LONG_FACE_RATIO: f32 = 0.75;
const SQUARE_EDGE_RATIO: f32 = 0.85;
const HEART_FOREHEAD_MARGIN: f32 = 0.08;
const DIAMOND_CHEEK_TO_JAW: f32 = 1.1;

const FALLBACK_SHAPE: FaceShape = FaceShape::Oval;
const FALLBACK_CONFIDENCE: f32 = 0.87;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("degenerate geometry: {0} is zero")]
    DegenerateGeometry(&'static str),
    #[error("degenerate geometry: {0} is not finite")]
    NonFiniteMeasurement(&'static str),
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },
}

/// One entry of the ordered decision list.
struct ShapeRule {
    shape: FaceShape,
    confidence: f32,
    matches: fn(&FaceRatios) -> bool,
}

fn is_square(r: &FaceRatios) -> bool {
    r.face_ratio >= WIDE_FACE_RATIO
        && r.jaw_to_face >= SQUARE_EDGE_RATIO
        && r.forehead_to_face >= SQUARE_EDGE_RATIO
}

fn is_round(r: &FaceRatios) -> bool {
    r.face_ratio >= WIDE_FACE_RATIO
}

fn is_oblong(r: &FaceRatios) -> bool {
    r.face_ratio <= LONG_FACE_RATIO
}

fn is_heart(r: &FaceRatios) -> bool {
    r.forehead_to_face > r.jaw_to_face + HEART_FOREHEAD_MARGIN
}

fn is_diamond(r: &FaceRatios) -> bool {
    r.cheek_to_jaw > DIAMOND_CHEEK_TO_JAW && r.forehead_to_face < r.jaw_to_face
}

/// Evaluated in order; the first match wins.
const SHAPE_RULES: [ShapeRule; 5] = [
    ShapeRule {
        shape: FaceShape::Square,
        confidence: 0.92,
        matches: is_square,
    },
    ShapeRule {
        shape: FaceShape::Round,
        confidence: 0.90,
        matches: is_round,
    },
    ShapeRule {
        shape: FaceShape::Oblong,
        confidence: 0.88,
        matches: is_oblong,
    },
    ShapeRule {
        shape: FaceShape::Heart,
        confidence: 0.85,
        matches: is_heart,
    },
    ShapeRule {
        shape: FaceShape::Diamond,
        confidence: 0.82,
        matches: is_diamond,
    },
];

/// Measure the six pixel-space distances used for classification.
pub fn measure(frame: &LandmarkFrame) -> Result<FaceGeometry, ClassifyError> {
    for index in [
        indices::LEFT_EYE,
        indices::RIGHT_EYE,
        indices::CHIN,
        indices::FOREHEAD,
        indices::LEFT_CHEEK,
        indices::RIGHT_CHEEK,
        indices::LEFT_JAW,
        indices::RIGHT_JAW,
        indices::LEFT_FOREHEAD,
        indices::RIGHT_FOREHEAD,
    ] {
        let p = frame.points()[index];
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(ClassifyError::NonFiniteLandmark { index });
        }
    }

    let (left_eye_x, _) = frame.pixel(indices::LEFT_EYE);
    let (right_eye_x, _) = frame.pixel(indices::RIGHT_EYE);
    let (_, chin_y) = frame.pixel(indices::CHIN);
    let (_, forehead_y) = frame.pixel(indices::FOREHEAD);
    let (left_cheek_x, _) = frame.pixel(indices::LEFT_CHEEK);
    let (right_cheek_x, _) = frame.pixel(indices::RIGHT_CHEEK);
    let (left_jaw_x, _) = frame.pixel(indices::LEFT_JAW);
    let (right_jaw_x, _) = frame.pixel(indices::RIGHT_JAW);
    let (left_forehead_x, _) = frame.pixel(indices::LEFT_FOREHEAD);
    let (right_forehead_x, _) = frame.pixel(indices::RIGHT_FOREHEAD);

    // Face width and cheek width span the same cheekbone pair.
    let cheekbones = (right_cheek_x - left_cheek_x).abs();

    Ok(FaceGeometry {
        face_width: cheekbones,
        face_height: (chin_y - forehead_y).abs(),
        jaw_width: (right_jaw_x - left_jaw_x).abs(),
        forehead_width: (right_forehead_x - left_forehead_x).abs(),
        cheek_width: cheekbones,
        eye_distance: (right_eye_x - left_eye_x).abs(),
    })
}

/// Fail on the first named value that is NaN or infinite.
fn ensure_finite(values: &[(&'static str, f32)]) -> Result<(), ClassifyError> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(ClassifyError::NonFiniteMeasurement(name)),
        None => Ok(()),
    }
}

/// Derive classification ratios, refusing zero denominators and any
/// measurement or ratio that overflowed.
pub fn ratios(geometry: &FaceGeometry) -> Result<FaceRatios, ClassifyError> {
    ensure_finite(&[
        ("face width", geometry.face_width),
        ("face height", geometry.face_height),
        ("jaw width", geometry.jaw_width),
        ("forehead width", geometry.forehead_width),
        ("cheek width", geometry.cheek_width),
        ("eye distance", geometry.eye_distance),
    ])?;
    if geometry.face_height == 0.0 {
        return Err(ClassifyError::DegenerateGeometry("face height"));
    }
    if geometry.face_width == 0.0 {
        return Err(ClassifyError::DegenerateGeometry("face width"));
    }
    if geometry.jaw_width == 0.0 {
        return Err(ClassifyError::DegenerateGeometry("jaw width"));
    }

    let ratios = FaceRatios {
        face_ratio: geometry.face_width / geometry.face_height,
        jaw_to_face: geometry.jaw_width / geometry.face_width,
        forehead_to_face: geometry.forehead_width / geometry.face_width,
        cheek_to_jaw: geometry.cheek_width / geometry.jaw_width,
        eye_spacing: geometry.eye_distance / geometry.face_width,
    };
    ensure_finite(&[
        ("face ratio", ratios.face_ratio),
        ("jaw/face ratio", ratios.jaw_to_face),
        ("forehead/face ratio", ratios.forehead_to_face),
        ("cheek/jaw ratio", ratios.cheek_to_jaw),
        ("eye spacing", ratios.eye_spacing),
    ])?;
    Ok(ratios)
}

/// Pick a shape and confidence for the given ratios.
pub fn decide(ratios: &FaceRatios) -> (FaceShape, f32) {
    SHAPE_RULES
        .iter()
        .find(|rule| (rule.matches)(ratios))
        .map(|rule| (rule.shape, rule.confidence))
        .unwrap_or((FALLBACK_SHAPE, FALLBACK_CONFIDENCE))
}

/// Classify the face in a landmark frame.
///
/// Pure function of its input: the same frame always yields the same analysis.
pub fn classify(frame: &LandmarkFrame) -> Result<FaceAnalysis, ClassifyError> {
    let geometry = measure(frame)?;
    let ratios = ratios(&geometry)?;
    let (shape, confidence) = decide(&ratios);

    tracing::debug!(
        %shape,
        confidence,
        face_ratio = ratios.face_ratio,
        jaw_to_face = ratios.jaw_to_face,
        forehead_to_face = ratios.forehead_to_face,
        cheek_to_jaw = ratios.cheek_to_jaw,
        "classified face"
    );

    Ok(FaceAnalysis {
        shape,
        confidence,
        geometry,
        ratios,
        characteristics: characteristics(shape, &ratios),
        recommendations: style_guidance(shape).iter().map(|s| s.to_string()).collect(),
    })
}

fn characteristics(shape: FaceShape, ratios: &FaceRatios) -> Vec<String> {
    vec![
        format!("{} face", capitalize(shape.as_str())),
        format!("Width/height ratio: {:.2}", ratios.face_ratio),
        format!("Jaw/face ratio: {:.2}", ratios.jaw_to_face),
        format!("Forehead/face ratio: {:.2}", ratios.forehead_to_face),
        "Measured from 468 facial landmarks".to_string(),
    ]
}

fn style_guidance(shape: FaceShape) -> &'static [&'static str] {
    match shape {
        FaceShape::Oval => &[
            "Balanced proportions suit almost any frame",
            "Oversized or geometric frames make a confident statement",
        ],
        FaceShape::Round => &[
            "Angular rectangle or square frames add definition",
            "Avoid small round frames that echo the face outline",
        ],
        FaceShape::Square => &[
            "Round or oval frames soften a strong jawline",
            "Thin metal rims keep the look light",
        ],
        FaceShape::Heart => &[
            "Cat-eye or bottom-heavy frames balance a wider forehead",
            "Light rimless styles reduce width at the brow",
        ],
        FaceShape::Diamond => &[
            "Cat-eye and oval frames highlight the cheekbones",
            "A strong browline adds width at the forehead",
        ],
        FaceShape::Oblong => &[
            "Deep frames with decorative temples shorten the face",
            "Round or aviator shapes break up the length",
        ],
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
