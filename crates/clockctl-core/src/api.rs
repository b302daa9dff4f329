//! Host-facing configuration, control and observation types for the
//! composed core.

use crate::{
    ArbiterMode, ArbiterStatus, BistConfig, BistInputs, BistState, DividerConfig, DomainConfig,
    DomainId, Edge, QueueConfig, StatusCounters, TapState, DEFAULT_IDCODE,
};

/// Role of each timing domain the composed core registers.
///
/// Domains are registered in [`DomainRole::ALL`] order, so a role's index
/// is also its [`DomainId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DomainRole {
    /// First functional source candidate.
    FunctionalA,
    /// Second functional source candidate.
    FunctionalB,
    /// External scan/test stream.
    ExternalTest,
    /// Test-access controller TCK.
    Tck,
    /// Self-test sequencer source.
    SelfTest,
    /// Queue producer side.
    Producer,
}

impl DomainRole {
    /// Every role in registration order.
    pub const ALL: [Self; 6] = [
        Self::FunctionalA,
        Self::FunctionalB,
        Self::ExternalTest,
        Self::Tck,
        Self::SelfTest,
        Self::Producer,
    ];

    /// Scheduler identity of this role.
    #[must_use]
    pub const fn id(self) -> DomainId {
        DomainId(self as u8)
    }

    /// Role registered under `id`, if any.
    #[must_use]
    pub fn from_id(id: DomainId) -> Option<Self> {
        Self::ALL.get(id.index()).copied()
    }
}

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// First functional source.
    pub functional_a: DomainConfig,
    /// Second functional source.
    pub functional_b: DomainConfig,
    /// External scan/test source.
    pub external_test: DomainConfig,
    /// TCK source.
    pub tck: DomainConfig,
    /// Self-test sequencer source.
    pub self_test: DomainConfig,
    /// Queue producer source.
    pub producer: DomainConfig,
    /// Divider between the source selector and the arbiter; `None` passes
    /// the selector output through.
    pub divider: Option<DividerConfig>,
    /// Device identification constant reported through IDCODE.
    pub idcode: u32,
    /// Self-test sequencer settings.
    pub bist: BistConfig,
    /// Queue geometry.
    pub queue: QueueConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            functional_a: DomainConfig::with_period(10),
            functional_b: DomainConfig::with_period(14),
            external_test: DomainConfig::with_period(40),
            tck: DomainConfig::with_period(50),
            self_test: DomainConfig::with_period(8),
            producer: DomainConfig::with_period(12),
            divider: None,
            idcode: DEFAULT_IDCODE,
            bist: BistConfig::default(),
            queue: QueueConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Source configuration of a domain role.
    #[must_use]
    pub const fn domain(&self, role: DomainRole) -> DomainConfig {
        match role {
            DomainRole::FunctionalA => self.functional_a,
            DomainRole::FunctionalB => self.functional_b,
            DomainRole::ExternalTest => self.external_test,
            DomainRole::Tck => self.tck,
            DomainRole::SelfTest => self.self_test,
            DomainRole::Producer => self.producer,
        }
    }
}

/// Asynchronous control inputs, sampled by whichever domain consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlInputs {
    /// Functional source request: `false` picks A, `true` picks B.
    pub clock_source_select: bool,
    /// Arbiter mode register.
    pub mode: ArbiterMode,
    /// Forces the functional source regardless of mode.
    pub bypass: bool,
    /// Scan enable, double-latched into the functional domain.
    pub scan_enable: bool,
    /// Self-test enable, start and hold.
    pub bist: BistInputs,
    /// Test mode select pin.
    pub tms: bool,
    /// Test data in pin.
    pub tdi: bool,
    /// Consumer read enable on arbiter output edges.
    pub drain: bool,
}

/// Snapshot of every status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SystemStatus {
    /// Simulated time of the last delivered edge.
    pub time: u64,
    /// Functional source candidate driving the selector output.
    pub functional_source: Option<usize>,
    /// Arbiter decode.
    pub arbiter: ArbiterStatus,
    /// Self-test sequencer state.
    pub bist_state: BistState,
    /// Self-test active output.
    pub bist_active: bool,
    /// Self-test done output.
    pub bist_done: bool,
    /// Patterns counted in the current self-test run.
    pub bist_count: u32,
    /// Test-access controller state.
    pub tap_state: TapState,
    /// Latched instruction.
    pub instruction: u8,
    /// TDO pin, `None` while released.
    pub tdo: Option<bool>,
    /// Queue full flag (producer view).
    pub queue_full: bool,
    /// Queue empty flag (consumer view).
    pub queue_empty: bool,
    /// True queue occupancy.
    pub queue_occupancy: u32,
    /// Items waiting for the producer side.
    pub pending_items: usize,
    /// Saturating status counters.
    pub counters: StatusCounters,
}

/// Deterministic trace events, emitted in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// A domain source transitioned.
    DomainEdge {
        /// Simulated time.
        time: u64,
        /// Domain that transitioned.
        role: DomainRole,
        /// Direction.
        edge: Edge,
    },
    /// The functional source selector changed owner.
    SelectorHandover {
        /// Simulated time.
        time: u64,
        /// New owner, `None` while between owners.
        owner: Option<usize>,
    },
    /// The test-access controller changed state.
    TapTransition {
        /// Simulated time.
        time: u64,
        /// State before the TCK edge.
        from: TapState,
        /// State after the TCK edge.
        to: TapState,
    },
    /// The self-test sequencer changed state.
    BistTransition {
        /// Simulated time.
        time: u64,
        /// State before the tick.
        from: BistState,
        /// State after the tick.
        to: BistState,
        /// Pattern count after the tick.
        count: u32,
    },
    /// The producer stored an item.
    ItemWritten {
        /// Simulated time.
        time: u64,
        /// Stored value, masked to the data width.
        value: u32,
    },
    /// The producer was refused because the queue looked full.
    WriteRefused {
        /// Simulated time.
        time: u64,
    },
    /// The consumer delivered an item.
    ItemRead {
        /// Simulated time.
        time: u64,
        /// Delivered value.
        value: u32,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in delivery order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
