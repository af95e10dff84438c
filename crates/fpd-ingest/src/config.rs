//! Ingestion configuration
//!
//! Explicit configuration passed into the pipeline, replacing ambient
//! process-wide settings.

use serde::{Deserialize, Serialize};

// ============================================================================
// Ingestion Configuration Constants
// ============================================================================

/// Default number of staged price observations per commit.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default number of rejected rows logged with full detail before the
/// pipeline falls back to silent counting.
pub const DEFAULT_ERROR_LOG_CAP: usize = 10;

/// Default unit of measure when the input column is absent or empty.
pub const DEFAULT_UNIT: &str = "R$/litro";

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Staged observation count at which the open batch is committed
    pub batch_size: usize,

    /// Rejected rows logged in full before silent counting takes over
    pub error_log_cap: usize,

    /// Unit of measure used when a row carries none
    pub default_unit: String,

    /// Stop reading the input after this many rows (test runs)
    pub row_limit: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            error_log_cap: DEFAULT_ERROR_LOG_CAP,
            default_unit: DEFAULT_UNIT.to_string(),
            row_limit: None,
        }
    }
}

impl IngestConfig {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("Batch size must be greater than 0");
        }

        if self.default_unit.is_empty() {
            anyhow::bail!("Default unit of measure cannot be empty");
        }

        if let Some(limit) = self.row_limit {
            if limit == 0 {
                anyhow::bail!("Row limit must be greater than 0 when set");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = IngestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.error_log_cap, 10);
        assert_eq!(config.default_unit, "R$/litro");
        assert!(config.row_limit.is_none());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = IngestConfig {
            batch_size: 0,
            ..IngestConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_row_limit_rejected() {
        let config = IngestConfig {
            row_limit: Some(0),
            ..IngestConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
