//! Auto-capture gate.
//!
//! Sits between the continuous detector callback stream and the classifier.
//! Frames are throttled, a well-positioned face arms a countdown, and when the
//! countdown runs out the gate emits exactly one capture. It then stays shut
//! until [`CaptureGate::reset`].
//!
//! Time is supplied by the caller so the gate never reads a clock itself.

use crate::face_box::{FaceBox, PositioningRules};
use lensfit_core::Point;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Minimum spacing between processed frames.
    pub throttle: Duration,
    /// How long a positioned face must persist before capture.
    pub countdown: Duration,
    pub rules: PositioningRules,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(100),
            countdown: Duration::from_secs(3),
            rules: PositioningRules::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GateState {
    Idle,
    /// `None` when the countdown overflows the clock and never fires.
    Countdown { deadline: Option<Instant> },
    Captured,
}

/// Outcome of feeding one detector callback to the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// Arrived within the throttle window; ignored.
    Throttled,
    /// No face in this frame. Any running countdown was cancelled.
    NoFace,
    /// Face tracked, no countdown running.
    Tracking {
        face: FaceBox,
        well_positioned: bool,
    },
    /// Countdown started by this frame.
    CountdownStarted {
        face: FaceBox,
        remaining: Duration,
    },
    /// Countdown running.
    CountingDown {
        face: FaceBox,
        remaining: Duration,
    },
    /// Countdown elapsed; analyze these landmarks.
    Capture {
        face: FaceBox,
        landmarks: Vec<Point>,
    },
}

pub struct CaptureGate {
    config: GateConfig,
    state: GateState,
    last_processed: Option<Instant>,
}

impl CaptureGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            state: GateState::Idle,
            last_processed: None,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// True once a capture has fired and until [`reset`](Self::reset).
    pub fn is_captured(&self) -> bool {
        self.state == GateState::Captured
    }

    /// Time left on the countdown, if one is running.
    ///
    /// A countdown too long to represent reports [`Duration::MAX`].
    pub fn countdown_remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            GateState::Countdown { deadline } => Some(remaining(deadline, now)),
            _ => None,
        }
    }

    /// Reopen the gate after the caller is done with a capture.
    pub fn reset(&mut self) {
        tracing::debug!("capture gate reset");
        self.state = GateState::Idle;
    }

    /// Feed one detector callback.
    ///
    /// `landmarks` is `None` when the detector found no face. `width` and
    /// `height` are the source image size in pixels.
    pub fn observe(
        &mut self,
        now: Instant,
        landmarks: Option<&[Point]>,
        width: u32,
        height: u32,
    ) -> GateEvent {
        if let Some(last) = self.last_processed {
            if now.saturating_duration_since(last) < self.config.throttle {
                return GateEvent::Throttled;
            }
        }
        self.last_processed = Some(now);

        let Some((points, face)) =
            landmarks.and_then(|p| FaceBox::from_landmarks(p, width, height).map(|b| (p, b)))
        else {
            if let GateState::Countdown { .. } = self.state {
                tracing::debug!("face lost, countdown cancelled");
                self.state = GateState::Idle;
            }
            return GateEvent::NoFace;
        };

        let well_positioned = self.config.rules.is_well_positioned(&face, width, height);

        match self.state {
            GateState::Captured => GateEvent::Tracking {
                face,
                well_positioned,
            },
            GateState::Idle if well_positioned => {
                let deadline = now.checked_add(self.config.countdown);
                if deadline.is_none() {
                    tracing::warn!(
                        countdown_ms = self.config.countdown.as_millis() as u64,
                        "countdown exceeds the clock range and will not fire"
                    );
                }
                self.state = GateState::Countdown { deadline };
                tracing::debug!(
                    width = face.width,
                    height = face.height,
                    "face positioned, countdown started"
                );
                GateEvent::CountdownStarted {
                    face,
                    remaining: self.config.countdown,
                }
            }
            GateState::Idle => GateEvent::Tracking {
                face,
                well_positioned,
            },
            GateState::Countdown {
                deadline: Some(deadline),
            } if now >= deadline => {
                self.state = GateState::Captured;
                tracing::info!(width = face.width, height = face.height, "auto-capture fired");
                GateEvent::Capture {
                    face,
                    landmarks: points.to_vec(),
                }
            }
            GateState::Countdown { deadline } => GateEvent::CountingDown {
                face,
                remaining: remaining(deadline, now),
            },
        }
    }
}

fn remaining(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(now))
}

impl Default for CaptureGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
