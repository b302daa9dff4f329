//! JSON scenarios: a core configuration plus timed input changes.
//!
//! ```json
//! {
//!   "config": { "divider": { "Fractional": 56 } },
//!   "items": [1, 2, 3],
//!   "steps": [
//!     { "at": 0, "inputs": { "drain": true } },
//!     { "at": 400, "period": { "role": "FunctionalA", "period": 12 } },
//!     { "at": 900, "trst": true }
//!   ],
//!   "until": 5000
//! }
//! ```
//!
//! A step applies before any edge at its time is delivered.

use std::fs;
use std::path::Path;

use clockctl_core::{ControlCore, ControlInputs, CoreConfig, DomainRole, SystemStatus, TraceEvent};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::SimError;

/// Simulated end time used when a scenario names none.
pub const DEFAULT_UNTIL: u64 = 10_000;

/// Period change for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeriodChange {
    /// Domain to retune.
    pub role: DomainRole,
    /// New period, applied at the domain's next rising edge.
    pub period: u64,
}

/// One timed change of the core's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioStep {
    /// Time at which the step applies.
    pub at: u64,
    /// Replacement control inputs.
    pub inputs: Option<ControlInputs>,
    /// Asserts TRST.
    pub trst: bool,
    /// Synchronous reset of the whole core.
    pub reset: bool,
    /// Items handed to the producer.
    pub items: Vec<u32>,
    /// Domain period change.
    pub period: Option<PeriodChange>,
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Scenario {
    /// Core configuration.
    pub config: CoreConfig,
    /// Items handed to the producer before the first edge.
    pub items: Vec<u32>,
    /// Timed changes, applied in time order.
    pub steps: Vec<ScenarioStep>,
    /// End time; [`DEFAULT_UNTIL`] when absent.
    pub until: Option<u64>,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be read and
    /// [`SimError::Json`] for malformed content.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded scenario {} ({} bytes)", path.display(), text.len());
        Self::from_json(&text)
    }

    /// End time of the run.
    #[must_use]
    pub fn end_time(&self) -> u64 {
        self.until.unwrap_or(DEFAULT_UNTIL)
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Status at the end of the run.
    pub status: SystemStatus,
    /// Items the consumer delivered, oldest first.
    pub received: Vec<u32>,
    /// Number of edges delivered.
    pub edges: u64,
    /// Every trace event, in delivery order, when requested.
    pub trace: Vec<TraceEvent>,
}

/// Runs a scenario to its end time, or to `until` when given.
///
/// # Errors
///
/// Returns [`SimError::Config`] when the core rejects the configuration and
/// [`SimError::StepAfterEnd`] when a step lies beyond the end of the run.
pub fn run_scenario(
    scenario: &Scenario,
    until: Option<u64>,
    record_trace: bool,
) -> Result<ScenarioReport, SimError> {
    let until = until.unwrap_or_else(|| scenario.end_time());
    let mut steps = scenario.steps.clone();
    steps.sort_by_key(|step| step.at);
    if let Some(last) = steps.last().filter(|step| step.at > until) {
        return Err(SimError::StepAfterEnd { at: last.at, until });
    }

    let mut core = ControlCore::new(scenario.config.clone())?;
    for item in &scenario.items {
        core.push_item(*item);
    }

    let mut trace = Vec::new();
    let mut advance = |core: &mut ControlCore, time: u64| {
        if record_trace {
            core.run_until_with_trace(time, &mut trace)
        } else {
            core.run_until(time)
        }
    };
    let mut edges = 0;
    for step in &steps {
        if step.at > 0 {
            edges += advance(&mut core, step.at - 1);
        }
        apply_step(&mut core, step)?;
    }
    edges += advance(&mut core, until);

    let status = core.status();
    info!(
        "scenario finished at t={} after {edges} edges, {} items delivered",
        status.time,
        core.received().len()
    );
    Ok(ScenarioReport {
        status,
        received: core.take_received(),
        edges,
        trace,
    })
}

fn apply_step(core: &mut ControlCore, step: &ScenarioStep) -> Result<(), SimError> {
    debug!("t={}: applying step", step.at);
    if step.reset {
        core.reset();
    }
    if step.trst {
        core.trst();
    }
    if let Some(inputs) = step.inputs {
        core.set_inputs(inputs);
    }
    if let Some(change) = step.period {
        core.set_period(change.role, change.period)?;
    }
    for item in &step.items {
        core.push_item(*item);
    }
    Ok(())
}
