//! Composed control core: every component wired onto one edge scheduler.
//!
//! ```text
//!  A ─┐
//!     ├─ selector ─ [divider] ─ functional ─┐
//!  B ─┘                                     │
//!  external test ───────────────────────────┤
//!  TCK ─ TAP ───────────────────────────────┼─ arbiter ─ consumer side of queue
//!  BIST source ─ sequencer ─ gated stream ──┘
//!  producer ─ producer side of queue
//! ```
//!
//! Each call to [`ControlCore::step`] delivers one source edge. The owning
//! domain's registers react first; then the derived streams (selector,
//! divider, arbiter) are re-evaluated from the new levels, and a rising
//! edge at the arbiter output clocks the consumer side of the queue.

use std::collections::VecDeque;

use log::debug;

use crate::{
    ArbiterCandidates, BistSequencer, CdcQueue, ConfigError, ControlInputs, CoreConfig,
    Divider, DomainArbiter, DomainRole, DomainScheduler, Edge, EdgeDetector, EdgeEvent,
    GlitchFreeSelector, StatusCounters, SystemStatus, TapController, TraceEvent, TraceSink,
};

/// Sink that drops every event.
struct Discard;

impl TraceSink for Discard {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Multi-domain clock control core.
#[derive(Debug, Clone)]
pub struct ControlCore {
    config: CoreConfig,
    scheduler: DomainScheduler,
    inputs: ControlInputs,
    selector: GlitchFreeSelector,
    selector_edges: EdgeDetector,
    divider: Option<Divider>,
    arbiter: DomainArbiter,
    arbiter_edges: EdgeDetector,
    tap: TapController,
    bist: BistSequencer,
    queue: CdcQueue,
    pending: VecDeque<u32>,
    received: Vec<u32>,
    counters: StatusCounters,
}

impl ControlCore {
    /// Builds a core from a configuration, validating every part.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in the domain, self-test or
    /// queue settings.
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        let mut scheduler = DomainScheduler::new();
        for role in DomainRole::ALL {
            scheduler.add(config.domain(role))?;
        }
        let bist = BistSequencer::new(config.bist)?;
        let queue = CdcQueue::new(config.queue)?;
        debug!(
            "core: divider {:?}, idcode {:#010x}, queue capacity {}",
            config.divider, config.idcode, config.queue.capacity
        );
        Ok(Self {
            scheduler,
            inputs: ControlInputs::default(),
            selector: GlitchFreeSelector::new(),
            selector_edges: EdgeDetector::default(),
            divider: config.divider.map(Divider::new),
            arbiter: DomainArbiter::new(),
            arbiter_edges: EdgeDetector::default(),
            tap: TapController::new(config.idcode),
            bist,
            queue,
            pending: VecDeque::new(),
            received: Vec::new(),
            counters: StatusCounters::new(),
            config,
        })
    }

    /// Synchronous reset of every component; time and inputs are kept.
    pub fn reset(&mut self) {
        self.selector = GlitchFreeSelector::new();
        self.selector_edges = EdgeDetector::default();
        self.divider = self.config.divider.map(Divider::new);
        self.arbiter = DomainArbiter::new();
        self.arbiter_edges = EdgeDetector::default();
        self.tap = TapController::new(self.config.idcode);
        self.bist.reset();
        self.queue.reset();
        self.pending.clear();
        self.received.clear();
        self.counters.reset();
        self.apply_arbiter_inputs();
        debug!("core: reset at t={}", self.scheduler.now());
    }

    /// Replaces the control inputs; each domain samples them on its next edge.
    pub fn set_inputs(&mut self, inputs: ControlInputs) {
        self.inputs = inputs;
        self.apply_arbiter_inputs();
    }

    const fn apply_arbiter_inputs(&mut self) {
        self.arbiter.set_mode(self.inputs.mode);
        self.arbiter.set_bypass(self.inputs.bypass);
    }

    /// Current control inputs.
    #[must_use]
    pub const fn inputs(&self) -> &ControlInputs {
        &self.inputs
    }

    /// Asserts the asynchronous TRST input.
    pub fn trst(&mut self) {
        self.tap.trst();
        self.counters.tap_resets = self.counters.tap_resets.saturating_add(1);
    }

    /// Requests a new period for a domain, effective at its next rising edge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeriodTooShort`] for periods below 2.
    pub fn set_period(&mut self, role: DomainRole, period: u64) -> Result<(), ConfigError> {
        self.scheduler.set_period(role.id(), period)
    }

    /// Queues an item for the producer side.
    ///
    /// The producer presents the oldest pending item on each of its rising
    /// edges and keeps presenting it until the queue accepts it.
    pub fn push_item(&mut self, value: u32) {
        self.pending.push_back(value);
    }

    /// Items delivered by the consumer side so far, oldest first.
    #[must_use]
    pub fn received(&self) -> &[u32] {
        &self.received
    }

    /// Takes the delivered items, leaving the list empty.
    pub fn take_received(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.received)
    }

    /// Delivers one edge.
    pub fn step(&mut self) -> Option<EdgeEvent> {
        self.step_with_trace(&mut Discard)
    }

    /// Delivers one edge, reporting what happened to `sink`.
    pub fn step_with_trace(&mut self, sink: &mut dyn TraceSink) -> Option<EdgeEvent> {
        let event = self.scheduler.next_event()?;
        if let Some(role) = DomainRole::from_id(event.domain) {
            sink.on_event(TraceEvent::DomainEdge {
                time: event.time,
                role,
                edge: event.edge,
            });
            self.react(role, event, sink);
        }
        self.propagate(event.time, sink);
        Some(event)
    }

    /// Delivers every edge up to and including `time`.
    ///
    /// Returns the number of edges delivered.
    pub fn run_until(&mut self, time: u64) -> u64 {
        self.run_until_with_trace(time, &mut Discard)
    }

    /// Delivers every edge up to and including `time`, reporting to `sink`.
    pub fn run_until_with_trace(&mut self, time: u64, sink: &mut dyn TraceSink) -> u64 {
        let mut delivered = 0;
        while self.scheduler.peek_time().is_some_and(|next| next <= time) {
            if self.step_with_trace(sink).is_none() {
                break;
            }
            delivered += 1;
        }
        delivered
    }

    fn react(&mut self, role: DomainRole, event: EdgeEvent, sink: &mut dyn TraceSink) {
        let time = event.time;
        match (role, event.edge) {
            (DomainRole::Tck, Edge::Rising) => {
                let from = self.tap.state();
                let resets = self.tap.resets();
                let to = self.tap.rising(self.inputs.tms, self.inputs.tdi);
                let entered = self.tap.resets().saturating_sub(resets);
                self.counters.tap_resets = self.counters.tap_resets.saturating_add(entered);
                if from != to {
                    sink.on_event(TraceEvent::TapTransition { time, from, to });
                }
            }
            (DomainRole::Tck, Edge::Falling) => self.tap.falling(),
            (DomainRole::SelfTest, Edge::Rising) => {
                let from = self.bist.state();
                let runs = self.bist.completed_runs();
                self.bist.tick(self.inputs.bist);
                let to = self.bist.state();
                let completed = self.bist.completed_runs().saturating_sub(runs);
                self.counters.completed_bist_runs =
                    self.counters.completed_bist_runs.saturating_add(completed);
                if from != to {
                    sink.on_event(TraceEvent::BistTransition {
                        time,
                        from,
                        to,
                        count: self.bist.pattern_count(),
                    });
                }
            }
            (DomainRole::Producer, Edge::Rising) => {
                let item = self.pending.front().copied();
                if self.queue.write_tick(item) {
                    self.pending.pop_front();
                    if let Some(value) = item {
                        let value = value & self.config.queue.data_mask();
                        sink.on_event(TraceEvent::ItemWritten { time, value });
                    }
                } else if item.is_some() {
                    self.counters.record_refused_write();
                    sink.on_event(TraceEvent::WriteRefused { time });
                }
            }
            _ => {}
        }
    }

    fn propagate(&mut self, time: u64, sink: &mut dyn TraceSink) {
        let levels = [
            self.scheduler.level(DomainRole::FunctionalA.id()),
            self.scheduler.level(DomainRole::FunctionalB.id()),
        ];
        let handovers = self.selector.handovers();
        let owner = self.selector.enabled_candidate();
        let selected = self
            .selector
            .observe(levels, self.inputs.clock_source_select);
        self.counters.selector_handovers = self
            .counters
            .selector_handovers
            .saturating_add(self.selector.handovers().saturating_sub(handovers));
        if self.selector.enabled_candidate() != owner {
            sink.on_event(TraceEvent::SelectorHandover {
                time,
                owner: self.selector.enabled_candidate(),
            });
        }

        let selector_edge = self.selector_edges.observe(selected);
        let functional = match self.divider.as_mut() {
            Some(divider) => {
                if selector_edge == Some(Edge::Rising) {
                    divider.tick(true)
                } else {
                    divider.output()
                }
            }
            None => selected,
        };

        let candidates = ArbiterCandidates {
            functional,
            external_test: self.scheduler.level(DomainRole::ExternalTest.id()),
            protocol_test: self.scheduler.level(DomainRole::Tck.id()),
            self_test: self.bist.gated_clock(),
        };
        let output = self.arbiter.observe(candidates, self.inputs.scan_enable);
        if self.arbiter_edges.observe(output) == Some(Edge::Rising) {
            self.consume(time, sink);
        }
    }

    fn consume(&mut self, time: u64, sink: &mut dyn TraceSink) {
        match self.queue.read_tick(self.inputs.drain) {
            Some(value) => {
                self.received.push(value);
                self.counters.record_delivery();
                sink.on_event(TraceEvent::ItemRead { time, value });
            }
            None if self.inputs.drain => self.counters.record_empty_read(),
            None => {}
        }
    }

    /// Snapshot of every status output.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            time: self.scheduler.now(),
            functional_source: self.selector.enabled_candidate(),
            arbiter: self.arbiter.status(),
            bist_state: self.bist.state(),
            bist_active: self.bist.active(),
            bist_done: self.bist.done(),
            bist_count: self.bist.pattern_count(),
            tap_state: self.tap.state(),
            instruction: self.tap.instruction(),
            tdo: self.tap.tdo_pin(),
            queue_full: self.queue.full(),
            queue_empty: self.queue.empty(),
            queue_occupancy: self.queue.occupancy(),
            pending_items: self.pending.len(),
            counters: self.counters,
        }
    }

    /// Configuration the core was built from.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Simulated time of the last delivered edge.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Current arbiter output level.
    #[must_use]
    pub fn output(&self) -> bool {
        self.arbiter.output()
    }

    /// Read access to the test-access controller.
    #[must_use]
    pub const fn tap(&self) -> &TapController {
        &self.tap
    }

    /// Read access to the self-test sequencer.
    #[must_use]
    pub const fn bist(&self) -> &BistSequencer {
        &self.bist
    }
}

#[cfg(test)]
mod tests {
    use super::ControlCore;
    use crate::{
        ArbiterMode, BistInputs, BistState, ConfigError, ControlInputs, CoreConfig, DomainConfig,
        DomainRole, QueueConfig, TapState, TraceEvent,
    };

    #[test]
    fn invalid_parts_are_rejected_at_construction() {
        let config = CoreConfig {
            tck: DomainConfig::with_period(1),
            ..CoreConfig::default()
        };
        assert_eq!(
            ControlCore::new(config).err(),
            Some(ConfigError::PeriodTooShort)
        );

        let config = CoreConfig {
            queue: QueueConfig {
                capacity: 6,
                data_width: 8,
            },
            ..CoreConfig::default()
        };
        assert_eq!(
            ControlCore::new(config).err(),
            Some(ConfigError::CapacityNotPowerOfTwo)
        );
    }

    #[test]
    fn functional_source_is_claimed_after_start_up() {
        let mut core = ControlCore::new(CoreConfig::default()).expect("valid config");
        core.run_until(200);
        let status = core.status();
        assert_eq!(status.functional_source, Some(0));
        assert_eq!(status.arbiter.driving, Some(ArbiterMode::Functional));
        assert!(!status.arbiter.is_test_mode);
        assert_eq!(status.counters.selector_handovers, 1);
    }

    #[test]
    fn items_cross_to_the_consumer_in_order() {
        let mut core = ControlCore::new(CoreConfig::default()).expect("valid config");
        core.set_inputs(ControlInputs {
            drain: true,
            ..ControlInputs::default()
        });
        for value in [0x11, 0x122, 0x33] {
            core.push_item(value);
        }
        core.run_until(2_000);
        assert_eq!(core.received(), &[0x11, 0x22, 0x33]);
        assert!(core.status().queue_empty);
        assert_eq!(core.status().pending_items, 0);
    }

    #[test]
    fn tms_high_keeps_tap_in_reset_and_trace_reports_edges() {
        let mut core = ControlCore::new(CoreConfig::default()).expect("valid config");
        core.set_inputs(ControlInputs {
            tms: true,
            ..ControlInputs::default()
        });
        let mut trace: Vec<TraceEvent> = Vec::new();
        core.run_until_with_trace(500, &mut trace);
        assert_eq!(core.status().tap_state, TapState::TestLogicReset);
        assert!(trace.iter().any(|event| matches!(
            event,
            TraceEvent::DomainEdge {
                role: DomainRole::Tck,
                ..
            }
        )));
        assert!(!trace
            .iter()
            .any(|event| matches!(event, TraceEvent::TapTransition { .. })));
    }

    #[test]
    fn reset_returns_components_to_initial_state() {
        let mut core = ControlCore::new(CoreConfig::default()).expect("valid config");
        core.set_inputs(ControlInputs {
            bist: BistInputs {
                enable: true,
                start: true,
                hold: false,
            },
            ..ControlInputs::default()
        });
        core.run_until(100);
        assert_ne!(core.status().bist_state, BistState::Idle);
        core.reset();
        let status = core.status();
        assert_eq!(status.bist_state, BistState::Idle);
        assert_eq!(status.tap_state, TapState::TestLogicReset);
        assert_eq!(status.functional_source, None);
        assert_eq!(status.counters.completed_bist_runs, 0);
    }
}
