//! Landmark detector seam.
//!
//! The face-mesh model lives outside this workspace. Anything that turns an
//! image frame into zero or one ordered landmark sequences can drive the
//! pipeline by implementing [`LandmarkDetector`].

use crate::frame::Frame;
use lensfit_core::Point;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detector has no more frames")]
    Exhausted,
    #[error("detection failed: {0}")]
    Failed(String),
}

/// Produces face-mesh landmarks for an image frame.
pub trait LandmarkDetector {
    /// `Ok(None)` means the frame was processed and no face was found.
    fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Point>>, DetectorError>;
}

/// Replays previously recorded detector output, one entry per call.
#[derive(Debug, Default)]
pub struct ReplayDetector {
    queue: VecDeque<Option<Vec<Point>>>,
}

impl ReplayDetector {
    pub fn new(recorded: impl IntoIterator<Item = Option<Vec<Point>>>) -> Self {
        Self {
            queue: recorded.into_iter().collect(),
        }
    }

    pub fn push(&mut self, landmarks: Option<Vec<Point>>) {
        self.queue.push_back(landmarks);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl LandmarkDetector for ReplayDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Point>>, DetectorError> {
        let landmarks = self.queue.pop_front().ok_or(DetectorError::Exhausted)?;
        tracing::trace!(
            sequence = frame.sequence,
            face = landmarks.is_some(),
            "replayed detection"
        );
        Ok(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_replay_in_order_then_exhausted() {
        let mut detector = ReplayDetector::new([None, Some(vec![Point::new(0.1, 0.2)])]);
        let frame = Frame::empty(640, 480, Instant::now(), 0);

        assert!(detector.detect(&frame).unwrap().is_none());
        assert_eq!(detector.detect(&frame).unwrap().unwrap(), vec![Point::new(0.1, 0.2)]);
        assert!(matches!(detector.detect(&frame), Err(DetectorError::Exhausted)));
    }

    #[test]
    fn test_replay_push() {
        let mut detector = ReplayDetector::default();
        detector.push(None);
        assert_eq!(detector.remaining(), 1);
    }
}
