//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.height == 0 {
            return Err(ConfigError::ValidationError(
                "resize.height must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.resize.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "resize.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.processing.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "processing.concurrency must be > 0".into(),
            ));
        }
        if self.processing.queue_depth == 0 {
            return Err(ConfigError::ValidationError(
                "processing.queue_depth must be > 0".into(),
            ));
        }
        if matches!(self.naming.basename.as_deref(), Some(b) if b.is_empty()) {
            return Err(ConfigError::ValidationError(
                "naming.basename must not be empty".into(),
            ));
        }
        Ok(())
    }
}
