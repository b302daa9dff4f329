//! Errors surfaced by scenario loading and running.

use std::io;
use std::path::PathBuf;

use clockctl_core::ConfigError;
use thiserror::Error;

/// Failure while loading or running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    /// Scenario file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Scenario text is not valid JSON for the scenario schema.
    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),
    /// Core configuration was rejected.
    #[error("rejected configuration (code {code:#04x}): {error}", code = .0.as_u8(), error = .0)]
    Config(#[from] ConfigError),
    /// A step is scheduled after the end of the run.
    #[error("step at t={at} lies after the end of the run at t={until}")]
    StepAfterEnd {
        /// Step time.
        at: u64,
        /// End of the run.
        until: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::SimError;
    use clockctl_core::ConfigError;

    #[test]
    fn config_errors_report_their_stable_code() {
        let error = SimError::from(ConfigError::CapacityNotPowerOfTwo);
        assert_eq!(
            error.to_string(),
            "rejected configuration (code 0x08): queue capacity must be a power of two"
        );
    }

    #[test]
    fn step_after_end_names_both_times() {
        let error = SimError::StepAfterEnd { at: 90, until: 50 };
        assert!(error.to_string().contains("t=90"));
        assert!(error.to_string().contains("t=50"));
    }
}
