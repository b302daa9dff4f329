//! Scenario runner and host tooling for the clock control core.

use env_logger as _;
#[cfg(test)]
use tempfile as _;

/// Scenario and probe error types.
pub mod error;
/// Host-side TAP and divider probes.
pub mod probe;
/// JSON scenario loading and execution.
pub mod scenario;

pub use error::SimError;
pub use probe::{divider_half_periods, probe_idcode, CountingPort, IdcodeProbe};
pub use scenario::{
    run_scenario, PeriodChange, Scenario, ScenarioReport, ScenarioStep, DEFAULT_UNTIL,
};
