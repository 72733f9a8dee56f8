//! Error types for zdd
//!
//! Uses `thiserror` for library errors. Every variant carries enough context
//! (deployment ID, phase, file path) to be actionable from a CLI message.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Phase;

/// Result type alias for zdd operations
pub type ZddResult<T> = Result<T, ZddError>;

/// Main error type for zdd operations
#[derive(Error, Debug)]
pub enum ZddError {
    /// Deployments root (or a deployment subdirectory) exists but cannot be listed
    #[error("failed to read deployments directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A deployment directory matched the naming pattern but its contents
    /// could not be loaded
    #[error("failed to load deployment {id}: {message}")]
    InvalidDeployment { id: String, message: String },

    /// Config file could not be parsed
    #[error("invalid config in {}: {message}", .file.display())]
    InvalidConfig { file: PathBuf, message: String },

    /// The ledger contains an ID that does not follow the fixed-width scheme
    #[error("ledger contains malformed deployment id '{id}'")]
    MalformedLedgerId { id: String },

    /// A phase script exited non-zero or was killed by a signal (code -1)
    #[error("script {} failed with exit code {code}: {output}", .path.display())]
    ScriptFailed {
        path: PathBuf,
        code: i32,
        output: String,
    },

    /// A phase script exceeded its wall-clock timeout and was killed
    #[error("script {} timed out after {seconds}s", .path.display())]
    ScriptTimeout { path: PathBuf, seconds: u64 },

    /// A task of the named phase failed, aborting the rest of the plan
    #[error("{phase} phase of deployment {id} failed: {source}")]
    PhaseFailed {
        phase: Phase,
        id: String,
        source: Box<ZddError>,
    },

    /// Ledger write failed after the deployment's tasks all succeeded.
    ///
    /// The target schema is mutated but unrecorded; re-running the tool
    /// resolves the window as long as phase SQL and scripts are idempotent.
    #[error("failed to record deployment {id} in the ledger: {source}")]
    RecordFailed { id: String, source: Box<ZddError> },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_script_failed() {
        let err = ZddError::ScriptFailed {
            path: PathBuf::from("deployments/000001_init/expand.sh"),
            code: 2,
            output: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "script deployments/000001_init/expand.sh failed with exit code 2: boom"
        );
    }

    #[test]
    fn test_error_display_script_timeout() {
        let err = ZddError::ScriptTimeout {
            path: PathBuf::from("post.sh"),
            seconds: 300,
        };
        assert_eq!(err.to_string(), "script post.sh timed out after 300s");
    }

    #[test]
    fn test_error_display_phase_failed_wraps_source() {
        let err = ZddError::PhaseFailed {
            phase: Phase::Expand,
            id: "000003".to_string(),
            source: Box::new(ZddError::ScriptTimeout {
                path: PathBuf::from("expand.sh"),
                seconds: 5,
            }),
        };
        assert_eq!(
            err.to_string(),
            "expand phase of deployment 000003 failed: script expand.sh timed out after 5s"
        );
    }

    #[test]
    fn test_error_display_malformed_ledger_id() {
        let err = ZddError::MalformedLedgerId {
            id: "20240101".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ledger contains malformed deployment id '20240101'"
        );
    }
}
