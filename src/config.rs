//! Per-invocation engine configuration

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Thresholds for classifying PRs by changed-line count
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizeThresholds {
    /// PRs strictly below this are "small"
    pub small_max_lines: u64,

    /// PRs strictly below this (and >= small_max_lines) are "medium";
    /// everything at or above is "large"
    pub medium_max_lines: u64,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            small_max_lines: 100,
            medium_max_lines: 500,
        }
    }
}

impl SizeThresholds {
    /// Bucket label for a changed-line count
    pub fn bucket(&self, lines: u64) -> &'static str {
        if lines < self.small_max_lines {
            "small"
        } else if lines < self.medium_max_lines {
            "medium"
        } else {
            "large"
        }
    }
}

/// Configuration for a single metrics computation
///
/// Supplied once per invocation; the engine holds no configuration state
/// across invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reference timezone for reconciling timezone-naive timestamps
    pub reference_timezone: chrono_tz::Tz,

    /// Percentiles (in [0, 100]) requested on every duration aggregate
    pub percentiles: Vec<f64>,

    /// Labels marking an issue as a bug/incident (matched case-insensitively)
    pub bug_labels: Vec<String>,

    /// PR size bucket thresholds
    pub size_thresholds: SizeThresholds,

    /// Optional team membership: team name -> member identities
    /// (emails or display names, normalized the same way as record identities)
    #[serde(default)]
    pub teams: HashMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_timezone: chrono_tz::UTC,
            percentiles: vec![50.0, 75.0, 95.0],
            bug_labels: vec!["bug".to_string(), "incident".to_string()],
            size_thresholds: SizeThresholds::default(),
            teams: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a raw timestamp string in this configuration's reference timezone
    ///
    /// Convenience for collectors normalizing records at the boundary; see
    /// [`crate::window::parse_timestamp`].
    pub fn parse_timestamp(&self, raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
        crate::window::parse_timestamp(raw, self.reference_timezone)
    }

    /// Validate the configuration, failing fast on caller errors
    pub fn validate(&self) -> Result<()> {
        for p in &self.percentiles {
            if !p.is_finite() || *p < 0.0 || *p > 100.0 {
                return Err(EngineError::InvalidConfiguration(format!(
                    "percentile {} is outside [0, 100]",
                    p
                )));
            }
        }
        if self.size_thresholds.small_max_lines >= self.size_thresholds.medium_max_lines {
            return Err(EngineError::InvalidConfiguration(format!(
                "size thresholds must be ordered: small_max_lines ({}) >= medium_max_lines ({})",
                self.size_thresholds.small_max_lines, self.size_thresholds.medium_max_lines
            )));
        }
        if self.bug_labels.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "bug label list must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        let config = EngineConfig {
            percentiles: vec![50.0, 120.0],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let config = EngineConfig {
            size_thresholds: SizeThresholds {
                small_max_lines: 500,
                medium_max_lines: 100,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_timestamps_in_reference_zone() {
        let config = EngineConfig {
            reference_timezone: "America/New_York".parse().unwrap(),
            ..Default::default()
        };
        let parsed = config.parse_timestamp("2024-06-01T12:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-06-01T16:00:00+00:00");
    }

    #[test]
    fn size_buckets() {
        let thresholds = SizeThresholds::default();
        assert_eq!(thresholds.bucket(0), "small");
        assert_eq!(thresholds.bucket(99), "small");
        assert_eq!(thresholds.bucket(100), "medium");
        assert_eq!(thresholds.bucket(499), "medium");
        assert_eq!(thresholds.bucket(500), "large");
    }
}
