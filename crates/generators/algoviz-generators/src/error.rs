//! Error types for frame generators

use serde::{Deserialize, Serialize};

/// Why a generator refused its input. Raised before any frame is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum GenerateError {
    /// Nothing to run the algorithm on
    #[error("Empty input: {what}")]
    EmptyInput { what: String },

    /// Input exceeds what a visualization can sensibly show
    #[error("Input too large: {what} has {len} items (limit: {max})")]
    InputTooLarge { what: String, len: usize, max: usize },

    /// A scalar parameter is outside its allowed range
    #[error("{what} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        what: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Structurally invalid input (unsorted search input, bad expression, ...)
    #[error("Malformed input: {reason}")]
    Malformed { reason: String },
}

impl GenerateError {
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyInput { what: what.into() }
    }

    pub fn too_large(what: impl Into<String>, len: usize, max: usize) -> Self {
        Self::InputTooLarge {
            what: what.into(),
            len,
            max,
        }
    }

    pub fn out_of_range(what: impl Into<String>, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            what: what.into(),
            value,
            min,
            max,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyInput { .. } | Self::InputTooLarge { .. } => "size",
            Self::OutOfRange { .. } => "range",
            Self::Malformed { .. } => "structure",
        }
    }

    /// True when the caller can fix this by changing the input alone.
    /// Size errors may instead call for different limits.
    #[inline]
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::InputTooLarge { .. })
    }
}

/// Check `index < len`, reporting it as `what` otherwise.
pub(crate) fn check_index(what: &str, index: usize, len: usize) -> Result<(), GenerateError> {
    if index >= len {
        return Err(GenerateError::out_of_range(
            what,
            index as i64,
            0,
            len as i64 - 1,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            GenerateError::too_large("array", 80, 64).to_string(),
            "Input too large: array has 80 items (limit: 64)"
        );
        assert_eq!(
            GenerateError::out_of_range("order", 9, 2, 5).to_string(),
            "order = 9 is out of range [2, 5]"
        );
    }

    #[test]
    fn categories() {
        assert_eq!(GenerateError::empty("array").category(), "size");
        assert_eq!(GenerateError::malformed("x").category(), "structure");
        assert!(GenerateError::malformed("x").is_input_error());
        assert!(!GenerateError::too_large("array", 2, 1).is_input_error());
    }

    #[test]
    fn index_checks() {
        assert!(check_index("start", 2, 3).is_ok());
        assert!(matches!(
            check_index("start", 3, 3),
            Err(GenerateError::OutOfRange { max: 2, .. })
        ));
    }
}
