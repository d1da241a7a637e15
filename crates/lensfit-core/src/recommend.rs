//! Frame recommendation ranking.
//!
//! A [`Scorer`] rates one catalog frame against a face analysis; [`rank`]
//! scores the whole catalog, sorts it and buckets each frame into a
//! priority tier.

use crate::catalog::{FrameEntry, FrameStyle};
use crate::types::{FaceAnalysis, FaceShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of static style points echoed into a recommendation's reasons.
const MAX_STYLE_POINTS: usize = 2;

/// Presentation bucket for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Perfect,
    Good,
    Okay,
}

/// Lower bounds (inclusive) of the perfect and good tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityTiers {
    pub perfect: f32,
    pub good: f32,
}

impl PriorityTiers {
    pub fn classify(&self, score: f32) -> Priority {
        if score >= self.perfect {
            Priority::Perfect
        } else if score >= self.good {
            Priority::Good
        } else {
            Priority::Okay
        }
    }
}

/// A ranked catalog frame.
#[derive(Debug, Clone, Serialize)]
pub struct FaceRecommendation<'a> {
    pub frame: &'a FrameEntry,
    pub match_score: f32,
    pub reasons: Vec<String>,
    pub priority: Priority,
}

/// Strategy for rating a frame against a face analysis.
pub trait Scorer {
    fn name(&self) -> &'static str;
    fn score(&self, analysis: &FaceAnalysis, frame: &FrameEntry) -> f32;
    fn tiers(&self) -> PriorityTiers;
}

/// Scores by whether the frame lists the detected shape as suitable.
pub struct MembershipScorer;

impl MembershipScorer {
    const BASE: f32 = 0.6;
    const SUITED_BONUS: f32 = 0.3;
    const UNSUITED_BONUS: f32 = 0.1;
    const CEILING: f32 = 0.98;
}

impl Scorer for MembershipScorer {
    fn name(&self) -> &'static str {
        "membership"
    }

    fn score(&self, analysis: &FaceAnalysis, frame: &FrameEntry) -> f32 {
        let shape_bonus = if frame.suits(analysis.shape) {
            Self::SUITED_BONUS
        } else {
            Self::UNSUITED_BONUS
        };
        let score = Self::BASE + shape_bonus + confidence_bonus(analysis.confidence);
        score.clamp(0.0, Self::CEILING)
    }

    fn tiers(&self) -> PriorityTiers {
        PriorityTiers {
            perfect: 0.85,
            good: 0.7,
        }
    }
}

/// Scores from frame silhouette, measured proportions and physical fit.
pub struct GeometryScorer;

impl GeometryScorer {
    const BASE: f32 = 0.5;
    const FLOOR: f32 = 0.3;
    const CEILING: f32 = 0.98;
    const AFFINITY_BONUS: f32 = 0.2;
    const LISTED_BONUS: f32 = 0.05;
    const STRONG_JAW_BONUS: f32 = 0.05;
    const EYE_SPACING_OPTIMUM: f32 = 0.3;
    const EYE_SPACING_WEIGHT: f32 = 0.1;
    const WIDTH_FIT_WEIGHT: f32 = 0.05;
    /// Typical adult eye distance, used to convert pixels to millimetres.
    const REFERENCE_EYE_DISTANCE_MM: f32 = 63.0;

    fn affinity(analysis: &FaceAnalysis, frame: &FrameEntry) -> f32 {
        use FaceShape::*;
        let shape = analysis.shape;
        let r = &analysis.ratios;

        let mut bonus = match frame.shape {
            FrameStyle::Aviator if r.face_ratio > 0.85 || matches!(shape, Square | Oblong) => {
                Self::AFFINITY_BONUS
            }
            FrameStyle::Rectangle | FrameStyle::Square if matches!(shape, Round | Oval) => {
                Self::AFFINITY_BONUS
            }
            FrameStyle::Round if matches!(shape, Square | Oblong) => {
                let jaw = if r.jaw_to_face >= 0.85 {
                    Self::STRONG_JAW_BONUS
                } else {
                    0.0
                };
                Self::AFFINITY_BONUS + jaw
            }
            FrameStyle::CatEye if matches!(shape, Heart | Diamond) => Self::AFFINITY_BONUS,
            _ => 0.0,
        };
        if frame.suits(shape) {
            bonus += Self::LISTED_BONUS;
        }
        bonus
    }

    fn eye_spacing_bonus(analysis: &FaceAnalysis) -> f32 {
        let off = (analysis.ratios.eye_spacing - Self::EYE_SPACING_OPTIMUM).abs()
            / Self::EYE_SPACING_OPTIMUM;
        Self::EYE_SPACING_WEIGHT * (1.0 - off.min(1.0))
    }

    fn width_fit_bonus(analysis: &FaceAnalysis, frame: &FrameEntry) -> f32 {
        let g = &analysis.geometry;
        if g.eye_distance <= 0.0 || g.face_width <= 0.0 {
            return 0.0;
        }
        let face_mm = g.face_width * Self::REFERENCE_EYE_DISTANCE_MM / g.eye_distance;
        let off = (frame.width - face_mm).abs() / face_mm;
        Self::WIDTH_FIT_WEIGHT * (1.0 - off.min(1.0))
    }
}

impl Scorer for GeometryScorer {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn score(&self, analysis: &FaceAnalysis, frame: &FrameEntry) -> f32 {
        let score = Self::BASE
            + Self::affinity(analysis, frame)
            + confidence_bonus(analysis.confidence)
            + Self::eye_spacing_bonus(analysis)
            + Self::width_fit_bonus(analysis, frame);
        if score.is_nan() {
            return Self::FLOOR;
        }
        score.clamp(Self::FLOOR, Self::CEILING)
    }

    fn tiers(&self) -> PriorityTiers {
        PriorityTiers {
            perfect: 0.9,
            good: 0.8,
        }
    }
}

fn confidence_bonus(confidence: f32) -> f32 {
    (confidence - 0.5) * 0.2
}

/// Selectable scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    #[default]
    Membership,
    Geometry,
}

impl ScoringStrategy {
    pub fn scorer(self) -> Box<dyn Scorer + Send + Sync> {
        match self {
            ScoringStrategy::Membership => Box::new(MembershipScorer),
            ScoringStrategy::Geometry => Box::new(GeometryScorer),
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::Membership => f.write_str("membership"),
            ScoringStrategy::Geometry => f.write_str("geometry"),
        }
    }
}

impl FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "membership" => Ok(ScoringStrategy::Membership),
            "geometry" => Ok(ScoringStrategy::Geometry),
            other => Err(format!("unknown scoring strategy: {other}")),
        }
    }
}

fn reasons(analysis: &FaceAnalysis, frame: &FrameEntry) -> Vec<String> {
    let shape_match = if frame.suits(analysis.shape) {
        format!("Made for {} faces", analysis.shape)
    } else {
        format!("Wearable with {} faces", analysis.shape)
    };
    let confidence = format!(
        "Face shape detected with {:.0}% confidence",
        analysis.confidence * 100.0
    );

    let mut out = Vec::with_capacity(2 + MAX_STYLE_POINTS);
    out.push(shape_match);
    out.push(confidence);
    out.extend(frame.style_points.iter().take(MAX_STYLE_POINTS).cloned());
    out
}

/// Score every frame and return them best first.
///
/// Ties keep catalog order. An empty catalog yields an empty ranking.
pub fn rank<'a, S: Scorer + ?Sized>(
    scorer: &S,
    analysis: &FaceAnalysis,
    catalog: &'a [FrameEntry],
) -> Vec<FaceRecommendation<'a>> {
    let tiers = scorer.tiers();

    let mut ranked: Vec<FaceRecommendation<'a>> = catalog
        .iter()
        .map(|frame| {
            let match_score = scorer.score(analysis, frame);
            FaceRecommendation {
                frame,
                match_score,
                reasons: reasons(analysis, frame),
                priority: tiers.classify(match_score),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::debug!(
        scorer = scorer.name(),
        shape = %analysis.shape,
        frames = ranked.len(),
        best = ranked.first().map(|r| r.frame.id.as_str()),
        "ranked catalog"
    );

    ranked
}
