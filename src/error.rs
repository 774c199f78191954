//! Error types for the capture workflow.
//!
//! Errors are classified by recoverability: extraction-side network
//! failures are retryable, persistence failures generally are not.

use thiserror::Error;

use crate::db::DbError;
use crate::extraction::ExtractionError;

/// Error surfaced by the capture workflow.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Entity extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl CaptureError {
    /// Returns true if retrying the same step may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CaptureError::Extraction(e) => e.is_retryable(),
            CaptureError::Db(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_follows_source() {
        let network: CaptureError = ExtractionError::Network("timeout".to_string()).into();
        assert!(network.is_retryable());

        let parse: CaptureError = ExtractionError::Parse("bad json".to_string()).into();
        assert!(!parse.is_retryable());

        let db: CaptureError = DbError::Migration("failed".to_string()).into();
        assert!(!db.is_retryable());
    }
}
