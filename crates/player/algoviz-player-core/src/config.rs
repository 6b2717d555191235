//! Player configuration.

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// Configuration for a single player instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial delay between automatic advances, in milliseconds.
    pub speed_ms: u64,
    /// Lower bound applied by `set_speed`. Keeps the ticker from spinning.
    pub min_speed_ms: u64,
    /// Upper bound applied by `set_speed`.
    pub max_speed_ms: u64,
    /// Hand frame 0 to the listener as soon as frames are loaded.
    pub emit_on_load: bool,
    /// Events retained before the oldest are dropped.
    pub max_queued_events: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed_ms: 500,
            min_speed_ms: 1,
            max_speed_ms: 60_000,
            emit_on_load: true,
            max_queued_events: 1024,
        }
    }
}

impl PlayerConfig {
    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    pub fn with_emit_on_load(mut self, emit: bool) -> Self {
        self.emit_on_load = emit;
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, PlayerError> {
        let cfg: PlayerConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.min_speed_ms == 0 {
            return Err(PlayerError::invalid_config(
                "min_speed_ms",
                "must be at least 1",
            ));
        }
        if self.max_speed_ms < self.min_speed_ms {
            return Err(PlayerError::invalid_config(
                "max_speed_ms",
                format!("must be >= min_speed_ms ({})", self.min_speed_ms),
            ));
        }
        if !(self.min_speed_ms..=self.max_speed_ms).contains(&self.speed_ms) {
            return Err(PlayerError::invalid_config(
                "speed_ms",
                format!(
                    "{} outside [{}, {}]",
                    self.speed_ms, self.min_speed_ms, self.max_speed_ms
                ),
            ));
        }
        Ok(())
    }

    /// Clamp a requested speed into the configured range.
    #[inline]
    pub fn clamp_speed(&self, ms: u64) -> u64 {
        ms.clamp(self.min_speed_ms, self.max_speed_ms.max(self.min_speed_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = PlayerConfig::from_json_str(r#"{ "speed_ms": 100 }"#).unwrap();
        assert_eq!(cfg.speed_ms, 100);
        assert_eq!(cfg.min_speed_ms, 1);
        assert!(cfg.emit_on_load);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = PlayerConfig::from_json_str(r#"{ "min_speed_ms": 50, "max_speed_ms": 10 }"#)
            .unwrap_err();
        assert!(matches!(err, PlayerError::InvalidConfig { ref field, .. } if field == "max_speed_ms"));
    }

    #[test]
    fn rejects_speed_outside_bounds() {
        let cfg = PlayerConfig {
            speed_ms: 0,
            ..PlayerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn clamp_speed_respects_bounds() {
        let cfg = PlayerConfig::default();
        assert_eq!(cfg.clamp_speed(0), 1);
        assert_eq!(cfg.clamp_speed(250), 250);
        assert_eq!(cfg.clamp_speed(u64::MAX), 60_000);
    }
}
