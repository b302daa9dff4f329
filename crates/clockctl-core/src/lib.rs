//! Behavioral model of a multi-domain clock control core.

/// Configuration error taxonomy.
pub mod fault;
pub use fault::{ConfigArea, ConfigError};

/// Timing domains, the edge scheduler, and cross-domain sampling primitives.
pub mod domain;
pub use domain::{
    DomainConfig, DomainId, DomainScheduler, DomainSource, Edge, EdgeDetector, EdgeEvent,
    Synchronizer,
};

/// Integer and fractional divider engines.
pub mod divider;
pub use divider::{
    Divider, DividerConfig, FractionalDivider, FractionalRatio, IntegerDivider, IntegerRatio,
};

/// Glitch-free and plain source selectors.
pub mod select;
pub use select::{select_while_idle, GlitchFreeSelector, GlitchFreeSelector4};

/// Functional/test domain arbiter.
pub mod arbiter;
pub use arbiter::{ArbiterCandidates, ArbiterMode, ArbiterStatus, DomainArbiter};

/// 1149.1-style test-access controller and host scan driver.
pub mod tap;
pub use tap::{
    next_state, tms_path, DataRegister, ScanDriver, TapController, TapPort, TapState,
    BYPASS_INSTRUCTION, DEFAULT_IDCODE, IDCODE_INSTRUCTION, IDCODE_WIDTH, IR_CAPTURE_PATTERN,
    IR_WIDTH, TAP_TRANSITION_TABLE,
};

/// Built-in self-test sequencer.
pub mod bist;
pub use bist::{BistConfig, BistInputs, BistSequencer, BistState};

/// Gray-coded cross-domain transfer queue.
pub mod cdc;
pub use cdc::{gray_decode, gray_encode, hamming_distance, CdcQueue, QueueConfig};

/// Saturating status counters.
pub mod diag;
pub use diag::StatusCounters;

/// Host-facing configuration, control and trace types.
pub mod api;
pub use api::{ControlInputs, CoreConfig, DomainRole, SystemStatus, TraceEvent, TraceSink};

/// Composed control core.
pub mod system;
pub use system::ControlCore;

#[cfg(test)]
use env_logger as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
