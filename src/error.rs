//! Error types for spawn
//!
//! Centralized error handling using thiserror.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// All error types that can occur while spawning or supervising a child
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The child process could not be created
    #[error("Failed to launch child: {0}")]
    Launch(#[source] std::io::Error),

    /// Waiting on the child failed at the OS level
    #[error("Failed to wait for child: {0}")]
    Wait(#[source] std::io::Error),

    /// Child exited non-zero or was killed by a signal
    #[error("Child exited abnormally: {0}")]
    AbnormalExit(ExitStatus),

    /// The interrupt could not be delivered to the child
    #[error("Signal delivery failed: {0}")]
    Signal(String),

    /// `wait` was called without a child to wait on
    #[error("Child was not started")]
    NotStarted,

    /// `start` was called again after launching a child
    #[error("Child already started")]
    AlreadyStarted,

    /// Child did not exit within the configured wait timeout
    #[error("Child did not exit within {0:?}")]
    Timeout(Duration),
}

/// Result type alias for spawn operations
pub type Result<T> = std::result::Result<T, SpawnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_launch_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SpawnError::Launch(io_err);
        assert_eq!(err.to_string(), "Failed to launch child: no such file");
    }

    #[test]
    fn test_abnormal_exit_error() {
        let err = SpawnError::AbnormalExit(ExitStatus::from_raw(3 << 8));
        assert!(err.to_string().starts_with("Child exited abnormally"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_signal_error() {
        let err = SpawnError::Signal("ESRCH: No such process".to_string());
        assert_eq!(err.to_string(), "Signal delivery failed: ESRCH: No such process");
    }

    #[test]
    fn test_not_started_error() {
        assert_eq!(SpawnError::NotStarted.to_string(), "Child was not started");
    }

    #[test]
    fn test_timeout_error() {
        let err = SpawnError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Child did not exit within 250ms");
    }

    #[test]
    fn test_io_errors_keep_their_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SpawnError::Launch(io_err);
        assert_eq!(err.source().map(|e| e.to_string()), Some("denied".to_string()));

        let err = SpawnError::Wait(std::io::Error::other("gone"));
        assert_eq!(err.source().map(|e| e.to_string()), Some("gone".to_string()));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(SpawnError::NotStarted)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
