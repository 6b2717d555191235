//! Error types for the player core.
//!
//! Transport operations never fail; they clamp or ignore out-of-range requests.
//! Errors only surface while building a [`crate::PlayerConfig`].

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerError {
    /// A configuration field is outside its allowed domain
    #[error("Invalid player config: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Config text could not be parsed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl PlayerError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(PlayerError::invalid_config("speed_ms", "zero").category(), "config");
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(PlayerError::from(parse).category(), "serialization");
    }

    #[test]
    fn display_names_the_field() {
        let err = PlayerError::invalid_config("max_speed_ms", "must be >= min_speed_ms");
        assert_eq!(
            err.to_string(),
            "Invalid player config: max_speed_ms: must be >= min_speed_ms"
        );
    }
}
