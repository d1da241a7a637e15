use lensfit_capture::{GateConfig, PositioningRules};
use lensfit_core::ScoringStrategy;
use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog TOML to use instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Recommendation scoring strategy.
    pub strategy: ScoringStrategy,
    /// Minimum milliseconds between processed detector frames.
    pub throttle_ms: u64,
    /// Seconds a positioned face must hold before auto-capture.
    pub countdown_secs: u64,
    /// Minimum face box width in pixels for auto-capture.
    pub min_face_width: f32,
    /// Minimum face box height in pixels for auto-capture.
    pub min_face_height: f32,
}

impl Config {
    /// Load configuration from `LENSFIT_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let strategy = match std::env::var("LENSFIT_STRATEGY") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring LENSFIT_STRATEGY");
                ScoringStrategy::default()
            }),
            Err(_) => ScoringStrategy::default(),
        };

        Self {
            catalog_path: std::env::var("LENSFIT_CATALOG_PATH").ok().map(PathBuf::from),
            strategy,
            throttle_ms: env_u64("LENSFIT_THROTTLE_MS", 100),
            countdown_secs: env_u64("LENSFIT_COUNTDOWN_SECS", 3),
            min_face_width: env_f32("LENSFIT_MIN_FACE_WIDTH", 200.0),
            min_face_height: env_f32("LENSFIT_MIN_FACE_HEIGHT", 250.0),
        }
    }

    /// Auto-capture gate settings.
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            throttle: Duration::from_millis(self.throttle_ms),
            countdown: Duration::from_secs(self.countdown_secs),
            rules: PositioningRules {
                min_width: self.min_face_width,
                min_height: self.min_face_height,
                ..PositioningRules::default()
            },
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
