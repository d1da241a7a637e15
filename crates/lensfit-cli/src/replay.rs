//! Replay of a recorded detector stream through the capture gate.

use anyhow::{Context, Result};
use lensfit_capture::{CaptureGate, Frame, GateConfig, GateEvent, LandmarkDetector, ReplayDetector};
use lensfit_core::{AnalysisError, LandmarkFrame, Point, TryOnSession};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// One recorded detector callback.
#[derive(Debug, Deserialize)]
pub struct ReplayRecord {
    /// Milliseconds since the start of the recording.
    pub t_ms: u64,
    pub width: u32,
    pub height: u32,
    pub landmarks: Option<Vec<Point>>,
}

/// What a single record did to the replay.
#[derive(Debug)]
pub enum Step {
    /// Nothing to report.
    Idle,
    CountdownStarted { remaining: Duration },
    /// Capture fired and the session holds a fresh analysis.
    Analyzed,
    /// Capture fired but analysis failed; the gate has been reopened.
    Failed(AnalysisError),
}

pub struct Replay<'c> {
    session: TryOnSession<'c>,
    gate: CaptureGate,
    detector: ReplayDetector,
    start: Instant,
    sequence: u32,
    analyses: usize,
}

impl<'c> Replay<'c> {
    pub fn new(session: TryOnSession<'c>, gate: GateConfig, start: Instant) -> Self {
        Self {
            session,
            gate: CaptureGate::new(gate),
            detector: ReplayDetector::default(),
            start,
            sequence: 0,
            analyses: 0,
        }
    }

    /// Push one record through detector, gate and session.
    ///
    /// `line` is the 1-based source line, used in error messages.
    pub fn feed(&mut self, line: usize, record: ReplayRecord) -> Result<Step> {
        let timestamp = self
            .start
            .checked_add(Duration::from_millis(record.t_ms))
            .with_context(|| format!("line {line}: t_ms {} is out of range", record.t_ms))?;

        self.detector.push(record.landmarks);
        let frame = Frame::empty(record.width, record.height, timestamp, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);

        let landmarks = self.detector.detect(&frame)?;
        let event = self.gate.observe(
            frame.timestamp,
            landmarks.as_deref(),
            frame.width,
            frame.height,
        );

        match event {
            GateEvent::CountdownStarted { remaining, .. } => {
                Ok(Step::CountdownStarted { remaining })
            }
            GateEvent::Capture { landmarks, .. } => {
                let analyzed = LandmarkFrame::new(landmarks, frame.width, frame.height)
                    .map_err(AnalysisError::from)
                    .and_then(|f| self.session.analyze(&f).map(|_| ()));
                match analyzed {
                    Ok(()) => {
                        self.analyses += 1;
                        Ok(Step::Analyzed)
                    }
                    Err(e) => {
                        tracing::debug!(line, "capture rejected, waiting for the next one");
                        self.gate.reset();
                        Ok(Step::Failed(e))
                    }
                }
            }
            GateEvent::NoFace => {
                tracing::debug!(t_ms = record.t_ms, "no face");
                Ok(Step::Idle)
            }
            _ => Ok(Step::Idle),
        }
    }

    /// Reopen the gate after a successful analysis.
    pub fn reopen(&mut self) {
        self.gate.reset();
    }

    pub fn session(&self) -> &TryOnSession<'c> {
        &self.session
    }

    /// Number of captures that produced an analysis.
    pub fn analyses(&self) -> usize {
        self.analyses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lensfit_core::landmarks::indices;
    use lensfit_core::{Catalog, LandmarkError, ScoringStrategy, FACE_MESH_POINTS};

    const W: u32 = 1280;
    const H: u32 = 720;

    /// Two corners of a well-positioned face box: enough for the gate,
    /// too few for the classifier.
    fn partial_face() -> Vec<Point> {
        vec![Point::new(0.3125, 0.2083), Point::new(0.6875, 0.7917)]
    }

    fn full_face() -> Vec<Point> {
        let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_POINTS];
        points[indices::FOREHEAD] = Point::new(0.5, 0.22);
        points[indices::CHIN] = Point::new(0.5, 0.80);
        points[indices::LEFT_CHEEK] = Point::new(0.32, 0.45);
        points[indices::RIGHT_CHEEK] = Point::new(0.68, 0.45);
        points[indices::LEFT_JAW] = Point::new(0.355, 0.66);
        points[indices::RIGHT_JAW] = Point::new(0.645, 0.66);
        points[indices::LEFT_FOREHEAD] = Point::new(0.355, 0.28);
        points[indices::RIGHT_FOREHEAD] = Point::new(0.645, 0.28);
        points[indices::LEFT_EYE] = Point::new(0.38, 0.40);
        points[indices::RIGHT_EYE] = Point::new(0.46, 0.40);
        points
    }

    fn record(t_ms: u64, landmarks: Option<Vec<Point>>) -> ReplayRecord {
        ReplayRecord {
            t_ms,
            width: W,
            height: H,
            landmarks,
        }
    }

    fn replay(catalog: &Catalog) -> Replay<'_> {
        let session = TryOnSession::new(catalog, ScoringStrategy::Membership);
        Replay::new(session, GateConfig::default(), Instant::now())
    }

    /// Latest instant reachable from now in coarse steps.
    fn far_future() -> Instant {
        let step = Duration::from_secs(1 << 50);
        let mut at = Instant::now();
        while let Some(later) = at.checked_add(step) {
            at = later;
        }
        at
    }

    #[test]
    fn test_failed_analysis_reopens_gate() {
        let catalog = Catalog::builtin();
        let mut replay = replay(catalog);
        let mut line = 0;
        let mut steps = Vec::new();

        for t in (0..=3000).step_by(500) {
            line += 1;
            steps.push(replay.feed(line, record(t, Some(partial_face()))).unwrap());
        }
        assert!(matches!(steps[0], Step::CountdownStarted { .. }));
        assert!(matches!(
            steps.last(),
            Some(Step::Failed(AnalysisError::Landmarks(
                LandmarkError::InsufficientLandmarks { .. }
            )))
        ));
        assert_eq!(replay.analyses(), 0);
        assert!(replay.session().current().is_none());

        steps.clear();
        for t in (3500..=7500).step_by(500) {
            line += 1;
            steps.push(replay.feed(line, record(t, Some(full_face()))).unwrap());
        }
        assert!(matches!(steps[0], Step::CountdownStarted { .. }));
        let analyzed = steps
            .iter()
            .filter(|s| matches!(s, Step::Analyzed))
            .count();
        assert_eq!(analyzed, 1);
        assert!(matches!(steps[6], Step::Analyzed));
        assert_eq!(replay.analyses(), 1);
        assert!(replay.session().current().is_some());
    }

    #[test]
    fn test_reopen_allows_second_analysis() {
        let catalog = Catalog::builtin();
        let mut replay = replay(catalog);

        replay.feed(1, record(0, Some(full_face()))).unwrap();
        let step = replay.feed(2, record(3000, Some(full_face()))).unwrap();
        assert!(matches!(step, Step::Analyzed));

        replay.reopen();
        replay.feed(3, record(3200, Some(full_face()))).unwrap();
        let step = replay.feed(4, record(6200, Some(full_face()))).unwrap();
        assert!(matches!(step, Step::Analyzed));
        assert_eq!(replay.analyses(), 2);
    }

    #[test]
    fn test_out_of_range_timestamp_names_line() {
        let catalog = Catalog::builtin();
        let session = TryOnSession::new(catalog, ScoringStrategy::Membership);
        let mut replay = Replay::new(session, GateConfig::default(), far_future());

        let err = replay.feed(1, record(u64::MAX, None)).unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }
}
