use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Render transforms include outstanding error when true.
    pub smoothing: bool,
    /// Fraction of error left after one reference frame.
    pub error_decay_per_frame: f32,
    /// Length of the reference frame in milliseconds.
    pub reference_frame_ms: f32,
    /// Errors below this magnitude snap to exact zero/identity.
    pub error_epsilon: f32,
    /// Ticks between a fire-cannon event and the shot.
    pub cannon_fire_delay_ticks: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            smoothing: true,
            error_decay_per_frame: 0.9,
            reference_frame_ms: 1000.0 / 60.0,
            error_epsilon: 1e-4,
            cannon_fire_delay_ticks: 180,
        }
    }
}

impl SimConfig {
    /// Decay factor applied per elapsed millisecond.
    pub fn decay_per_ms(&self) -> f32 {
        self.error_decay_per_frame.powf(1.0 / self.reference_frame_ms)
    }

    /// Factor to scale errors by after `dt_ms` milliseconds.
    pub fn decay_factor(&self, dt_ms: f32) -> f32 {
        self.decay_per_ms().powf(dt_ms.max(0.0))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.error_decay_per_frame > 0.0 && self.error_decay_per_frame <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "error_decay_per_frame",
                reason: "must be in (0, 1]",
            });
        }
        if !(self.reference_frame_ms > 0.0) {
            return Err(ConfigError::Invalid {
                field: "reference_frame_ms",
                reason: "must be positive",
            });
        }
        if !(self.error_epsilon > 0.0) {
            return Err(ConfigError::Invalid {
                field: "error_epsilon",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&data)?;
        tracing::info!(path = %path.as_ref().display(), "loaded simulation config");
        Ok(config)
    }
}
