//! Try-on session: holds the latest analysis and ranks the catalog for it.

use crate::catalog::Catalog;
use crate::classifier::{classify, ClassifyError};
use crate::landmarks::{LandmarkCapture, LandmarkError, LandmarkFrame};
use crate::recommend::{rank, FaceRecommendation, Scorer, ScoringStrategy};
use crate::types::FaceAnalysis;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Per-user try-on state. Only the most recent successful analysis is kept.
pub struct TryOnSession<'c> {
    catalog: &'c Catalog,
    scorer: Box<dyn Scorer + Send + Sync>,
    current: Option<FaceAnalysis>,
}

impl<'c> TryOnSession<'c> {
    pub fn new(catalog: &'c Catalog, strategy: ScoringStrategy) -> Self {
        Self {
            catalog,
            scorer: strategy.scorer(),
            current: None,
        }
    }

    /// Classify a frame and replace the stored analysis.
    ///
    /// On failure the previous analysis is left untouched so the caller can
    /// retry with the next frame.
    pub fn analyze(&mut self, frame: &LandmarkFrame) -> Result<&FaceAnalysis, AnalysisError> {
        match classify(frame) {
            Ok(analysis) => {
                tracing::info!(
                    shape = %analysis.shape,
                    confidence = analysis.confidence,
                    "analysis complete"
                );
                Ok(&*self.current.insert(analysis))
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed, keeping previous result");
                Err(e.into())
            }
        }
    }

    /// Validate a recorded capture, then [`analyze`](Self::analyze) it.
    pub fn analyze_capture(
        &mut self,
        capture: LandmarkCapture,
    ) -> Result<&FaceAnalysis, AnalysisError> {
        let frame = match capture.into_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "rejected landmark capture");
                return Err(e.into());
            }
        };
        self.analyze(&frame)
    }

    pub fn current(&self) -> Option<&FaceAnalysis> {
        self.current.as_ref()
    }

    /// Rank the catalog for the current analysis; empty when there is none.
    pub fn recommendations(&self) -> Vec<FaceRecommendation<'c>> {
        match &self.current {
            Some(analysis) => rank(self.scorer.as_ref(), analysis, self.catalog.frames()),
            None => Vec::new(),
        }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
