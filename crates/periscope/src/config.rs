//! Tunables and input validation limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;

/// Largest coordinate the input backends accept (16-bit screen space).
pub const MAX_COORDINATE: i32 = 65_535;
pub const MIN_COORDINATE: i32 = 0;

/// Process-lifetime configuration for the automation core.
///
/// Everything here has a conservative default; construct with
/// `AutomationConfig::default()` and override fields as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Idle time after which a reference is swept. Sweeps run opportunistically
    /// before each snapshot, never from a timer thread.
    pub reference_ttl_secs: u64,
    /// Traversal depth used when the caller does not pass one.
    pub default_max_depth: usize,
    /// Hard ceiling on caller-requested depth.
    pub max_depth_limit: usize,
    /// Delete a group when its last window is released. Off by default: an
    /// emptied group stays present and listable until explicitly deleted.
    pub auto_delete_empty_groups: bool,
    /// Longest accepted search query, in characters.
    pub max_query_length: usize,
    /// Longest text payload accepted for input actions, in characters.
    pub max_text_length: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            reference_ttl_secs: 300,
            default_max_depth: 15,
            max_depth_limit: 50,
            auto_delete_empty_groups: false,
            max_query_length: 1_000,
            max_text_length: 10_000,
        }
    }
}

impl AutomationConfig {
    pub fn reference_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_ttl_secs)
    }

    /// Clamp a caller-requested depth to the configured ceiling.
    pub fn effective_depth(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_max_depth)
            .min(self.max_depth_limit)
    }

    /// Reject empty or oversized queries before any provider call is made.
    pub fn validate_query(&self, query: &str) -> Result<(), AutomationError> {
        if query.trim().is_empty() {
            return Err(AutomationError::InvalidArgument(
                "query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() > self.max_query_length {
            return Err(AutomationError::InvalidArgument(format!(
                "query too long ({} > {})",
                query.chars().count(),
                self.max_query_length
            )));
        }
        Ok(())
    }

    /// Reject oversized text payloads before they reach an input backend.
    pub fn validate_text(&self, text: &str) -> Result<(), AutomationError> {
        if text.chars().count() > self.max_text_length {
            return Err(AutomationError::InvalidArgument(format!(
                "text too long ({} > {})",
                text.chars().count(),
                self.max_text_length
            )));
        }
        Ok(())
    }
}

/// Validate a screen coordinate pair. Fails fast, before any provider call.
pub fn validate_coordinates(x: i32, y: i32) -> Result<(), AutomationError> {
    for (axis, value) in [("x", x), ("y", y)] {
        if !(MIN_COORDINATE..=MAX_COORDINATE).contains(&value) {
            return Err(AutomationError::InvalidArgument(format!(
                "{axis} coordinate {value} out of range ({MIN_COORDINATE}-{MAX_COORDINATE})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_validation() {
        let config = AutomationConfig::default();
        assert!(config.validate_query("save button").is_ok());
        assert!(matches!(
            config.validate_query("   "),
            Err(AutomationError::InvalidArgument(_))
        ));
        let long = "q".repeat(1_001);
        assert!(matches!(
            config.validate_query(&long),
            Err(AutomationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn text_validation() {
        let config = AutomationConfig::default();
        assert!(config.validate_text("").is_ok());
        let long = "t".repeat(10_001);
        assert!(matches!(
            config.validate_text(&long),
            Err(AutomationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn coordinate_validation() {
        assert!(validate_coordinates(0, 0).is_ok());
        assert!(validate_coordinates(65_535, 65_535).is_ok());
        assert!(validate_coordinates(-1, 0).is_err());
        assert!(validate_coordinates(0, 65_536).is_err());
    }

    #[test]
    fn depth_clamping() {
        let config = AutomationConfig::default();
        assert_eq!(config.effective_depth(None), 15);
        assert_eq!(config.effective_depth(Some(3)), 3);
        assert_eq!(config.effective_depth(Some(500)), 50);
    }
}
