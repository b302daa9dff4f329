//! Built-in self-test sequencer.
//!
//! ```text
//!   Idle --enable&start--> Init --> Run --hold--> Pause --!hold--> Run
//!                                   Run --count>=max--> Complete
//!   Run/Pause --!enable--> Idle          Complete --!enable|start--> Idle
//! ```
//!
//! The sequencer is clocked by its own source domain. A local power-of-two
//! divider, enabled only in Init and Run while not held, produces the gated
//! pattern stream; each rising edge of that stream is one pattern tick.

use log::debug;

use crate::{ConfigError, IntegerDivider, IntegerRatio};

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BistState {
    /// Waiting for enable and start.
    #[default]
    Idle,
    /// One-tick initialization.
    Init,
    /// Counting patterns.
    Run,
    /// Held; the pattern counter is frozen.
    Pause,
    /// Maximum pattern count reached.
    Complete,
}

impl BistState {
    /// `true` in Init, Run and Pause.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Init | Self::Run | Self::Pause)
    }

    /// `true` only in Complete.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Static sequencer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BistConfig {
    /// Pattern counter width in bits, `1..=32`.
    pub counter_width: u8,
    /// Pattern count that completes a run.
    pub max_count: u32,
    /// Local divider ratio for the pattern stream.
    pub pattern_ratio: IntegerRatio,
}

impl Default for BistConfig {
    fn default() -> Self {
        Self {
            counter_width: 16,
            max_count: 1024,
            pattern_ratio: IntegerRatio::Div2,
        }
    }
}

impl BistConfig {
    /// Validates counter width and maximum count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CounterWidthOutOfRange`] for widths outside
    /// `1..=32` and [`ConfigError::MaxCountExceedsWidth`] when `max_count`
    /// does not fit in the counter.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.counter_width == 0 || self.counter_width > 32 {
            return Err(ConfigError::CounterWidthOutOfRange);
        }
        if self.counter_width < 32 && self.max_count >> self.counter_width != 0 {
            return Err(ConfigError::MaxCountExceedsWidth);
        }
        Ok(())
    }
}

/// Control inputs sampled on every sequencer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BistInputs {
    /// Global self-test enable.
    pub enable: bool,
    /// Start request.
    pub start: bool,
    /// Hold (pause) request.
    pub hold: bool,
}

/// Self-test sequencer with its local pattern divider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BistSequencer {
    config: BistConfig,
    state: BistState,
    count: u32,
    divider: IntegerDivider,
    held: bool,
    completed_runs: u32,
}

impl BistSequencer {
    /// Creates an idle sequencer.
    ///
    /// # Errors
    ///
    /// Propagates [`BistConfig::validate`] failures.
    pub const fn new(config: BistConfig) -> Result<Self, ConfigError> {
        if let Err(error) = config.validate() {
            return Err(error);
        }
        Ok(Self {
            config,
            state: BistState::Idle,
            count: 0,
            divider: IntegerDivider::new(config.pattern_ratio),
            held: false,
            completed_runs: 0,
        })
    }

    /// Synchronous reset: Idle with a cleared counter.
    pub fn reset(&mut self) {
        self.state = BistState::Idle;
        self.count = 0;
        self.held = false;
        self.divider = IntegerDivider::new(self.config.pattern_ratio);
    }

    /// Reacts to one rising edge of the sequencer's source domain.
    ///
    /// Returns `true` when this tick produced a pattern tick.
    pub fn tick(&mut self, inputs: BistInputs) -> bool {
        let state = self.state;
        let was_low = !self.divider.output();
        // Paused and resuming ticks keep the divider cleared, so every
        // rising edge of the gated stream falls on a counting tick.
        let divider_enable = matches!(state, BistState::Init | BistState::Run) && !inputs.hold;
        let pattern_tick = self.divider.tick(divider_enable) && was_low;

        let (next, count) = match state {
            BistState::Idle if inputs.enable && inputs.start => (BistState::Init, 0),
            BistState::Idle => (BistState::Idle, 0),
            BistState::Init => (BistState::Run, 0),
            BistState::Run if !inputs.enable => (BistState::Idle, 0),
            BistState::Run if inputs.hold => (BistState::Pause, self.count),
            BistState::Run => {
                let count = if pattern_tick && self.count < self.config.max_count {
                    self.count + 1
                } else {
                    self.count
                };
                if count >= self.config.max_count {
                    (BistState::Complete, count)
                } else {
                    (BistState::Run, count)
                }
            }
            BistState::Pause if !inputs.enable => (BistState::Idle, 0),
            BistState::Pause if !inputs.hold => (BistState::Run, self.count),
            BistState::Pause => (BistState::Pause, self.count),
            BistState::Complete if !inputs.enable || inputs.start => (BistState::Idle, 0),
            BistState::Complete => (BistState::Complete, self.count),
        };

        if next != state {
            debug!("bist: {state:?} -> {next:?} (count {count})");
            if next == BistState::Complete {
                self.completed_runs = self.completed_runs.saturating_add(1);
            }
        }
        self.state = next;
        self.count = count;
        self.held = inputs.hold;
        pattern_tick && state == BistState::Run
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BistState {
        self.state
    }

    /// Patterns counted in the current run.
    #[must_use]
    pub const fn pattern_count(&self) -> u32 {
        self.count
    }

    /// Active status output.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.state.is_active()
    }

    /// Done status output.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.state.is_done()
    }

    /// Gated pattern stream offered to pattern generators and the arbiter.
    #[must_use]
    pub const fn gated_clock(&self) -> bool {
        self.divider.output() && self.state.is_active() && !self.held
    }

    /// Number of runs that reached Complete.
    #[must_use]
    pub const fn completed_runs(&self) -> u32 {
        self.completed_runs
    }

    /// Static configuration.
    #[must_use]
    pub const fn config(&self) -> &BistConfig {
        &self.config
    }
}
