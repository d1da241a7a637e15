//! Captured image frame handed to a landmark detector.

use std::time::Instant;

/// One image from the camera stream.
///
/// `data` is empty when the frame only carries metadata for a detector
/// that never reads pixels, such as [`ReplayDetector`](crate::ReplayDetector).
#[derive(Clone)]
pub struct Frame {
    /// Packed pixel data as delivered by the camera.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
    pub sequence: u32,
}

impl Frame {
    /// Metadata-only frame for detectors that do not read pixels.
    pub fn empty(width: u32, height: u32, timestamp: Instant, sequence: u32) -> Self {
        Self {
            data: Vec::new(),
            width,
            height,
            timestamp,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame_has_no_pixels() {
        let frame = Frame::empty(640, 480, Instant::now(), 3);
        assert!(frame.data.is_empty());
        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(frame.sequence, 3);
    }
}
