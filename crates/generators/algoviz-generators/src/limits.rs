//! Size limits applied to generator input.

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

/// Bounds that keep a run small enough to follow frame by frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorLimits {
    /// Longest array accepted by sorting and searching.
    pub max_array_len: usize,
    /// Largest absolute element value.
    pub max_abs_value: i64,
    /// Most nodes in a list, tree, heap or graph.
    pub max_nodes: usize,
    /// Most cells in a pathfinding grid.
    pub max_grid_cells: usize,
    /// Most cells in a dynamic-programming table.
    pub max_table_cells: usize,
    /// Largest hash table capacity.
    pub max_hash_capacity: usize,
    /// Longest expression, in characters.
    pub max_expression_len: usize,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            max_array_len: 64,
            max_abs_value: 9_999,
            max_nodes: 64,
            max_grid_cells: 4_096,
            max_table_cells: 4_096,
            max_hash_capacity: 64,
            max_expression_len: 128,
        }
    }
}

impl GeneratorLimits {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, GenerateError> {
        serde_json::from_str(s).map_err(|e| GenerateError::malformed(format!("limits: {e}")))
    }

    /// Non-empty, not too long, every value within `max_abs_value`.
    pub fn check_array(&self, what: &str, values: &[i64]) -> Result<(), GenerateError> {
        if values.is_empty() {
            return Err(GenerateError::empty(what));
        }
        if values.len() > self.max_array_len {
            return Err(GenerateError::too_large(
                what,
                values.len(),
                self.max_array_len,
            ));
        }
        self.check_values(what, values)
    }

    pub fn check_values(&self, what: &str, values: &[i64]) -> Result<(), GenerateError> {
        for &v in values {
            self.check_value(what, v)?;
        }
        Ok(())
    }

    pub fn check_value(&self, what: &str, value: i64) -> Result<(), GenerateError> {
        if value.unsigned_abs() > self.max_abs_value.unsigned_abs() {
            return Err(GenerateError::out_of_range(
                what,
                value,
                -self.max_abs_value,
                self.max_abs_value,
            ));
        }
        Ok(())
    }

    pub fn check_nodes(&self, what: &str, count: usize) -> Result<(), GenerateError> {
        if count > self.max_nodes {
            return Err(GenerateError::too_large(what, count, self.max_nodes));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_checks() {
        let limits = GeneratorLimits::default();
        assert!(limits.check_array("array", &[1, 2, 3]).is_ok());
        assert!(matches!(
            limits.check_array("array", &[]),
            Err(GenerateError::EmptyInput { .. })
        ));
        assert!(matches!(
            limits.check_array("array", &vec![1; 65]),
            Err(GenerateError::InputTooLarge { len: 65, .. })
        ));
        assert!(matches!(
            limits.check_array("array", &[1, 10_000]),
            Err(GenerateError::OutOfRange { value: 10_000, .. })
        ));
    }

    #[test]
    fn json_overrides() {
        let limits = GeneratorLimits::from_json_str(r#"{ "max_array_len": 8 }"#).unwrap();
        assert_eq!(limits.max_array_len, 8);
        assert_eq!(limits.max_nodes, 64);
        assert!(GeneratorLimits::from_json_str("[").is_err());
    }
}
