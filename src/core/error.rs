/// Error types for host calls and monitor operations

use std::time::Duration;
use thiserror::Error;

/// Failure of a single call against the container host
#[derive(Debug, Error)]
pub enum HostError {
    #[error("docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Monitor-level failures, one variant per handling policy
///
/// A truncated log frame is not represented here: decoding stops silently
/// and returns whatever was decoded before the bad frame.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Container listing failed; the whole cycle is skipped
    #[error("cannot list containers: {0}")]
    HostConnection(#[source] HostError),

    /// Inspect or stats failed for one container; only that node degrades
    #[error("{name}: {source}")]
    PerContainer {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("error fetching logs for {name}: {source}")]
    LogFetch {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("error restarting {name}: {source}")]
    Restart {
        name: String,
        #[source]
        source: HostError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MonitorError::PerContainer {
            name: "db".to_string(),
            source: HostError::Timeout(Duration::from_millis(500)),
        };
        assert_eq!(err.to_string(), "db: timed out after 500ms");

        let err = MonitorError::HostConnection(HostError::Other("connection refused".into()));
        assert_eq!(err.to_string(), "cannot list containers: connection refused");
    }
}
