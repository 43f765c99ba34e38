//! Input validation before enumeration.

use std::path::Path;

use crate::error::PipelineError;

/// Validates the run's source and destination before any other I/O.
pub struct Validator;

impl Validator {
    /// Check that both `source` and `destination` exist.
    ///
    /// The error names whichever path is missing, or both. A path whose
    /// existence cannot be determined counts as missing.
    pub fn check_paths(source: &Path, destination: &Path) -> Result<(), PipelineError> {
        let source_exists = source.try_exists().unwrap_or(false);
        let destination_exists = destination.try_exists().unwrap_or(false);

        match PipelineError::missing_paths(source, destination, source_exists, destination_exists)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
