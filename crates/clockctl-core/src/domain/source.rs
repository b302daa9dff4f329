use crate::{ConfigError, DomainId, Edge};

/// Period and start offset of one periodic source, in abstract time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DomainConfig {
    /// Full period in time units; must be at least 2.
    pub period: u64,
    /// Time of the first rising edge.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase: u64,
}

impl DomainConfig {
    /// Creates a configuration with the first rising edge at time zero.
    #[must_use]
    pub const fn with_period(period: u64) -> Self {
        Self { period, phase: 0 }
    }

    /// Validates the period.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeriodTooShort`] when `period < 2`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.period < 2 {
            Err(ConfigError::PeriodTooShort)
        } else {
            Ok(())
        }
    }
}

/// One free-running periodic trigger stream.
///
/// The stream starts low and rises at `phase`. The high phase lasts
/// `period / 2`, the low phase the remainder, so odd periods spend one extra
/// unit low. A period change takes effect at the next rising edge, which lets
/// a host model transient frequency variation without tearing a half-period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSource {
    id: DomainId,
    period: u64,
    pending_period: Option<u64>,
    level: bool,
    next_edge: u64,
    rising_edges: u64,
}

impl DomainSource {
    /// Creates a source from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeriodTooShort`] for periods below 2.
    pub const fn new(id: DomainId, config: DomainConfig) -> Result<Self, ConfigError> {
        if let Err(error) = config.validate() {
            return Err(error);
        }
        Ok(Self {
            id,
            period: config.period,
            pending_period: None,
            level: false,
            next_edge: config.phase,
            rising_edges: 0,
        })
    }

    /// Returns the domain identity.
    #[must_use]
    pub const fn id(&self) -> DomainId {
        self.id
    }

    /// Returns the period currently in effect.
    #[must_use]
    pub const fn period(&self) -> u64 {
        self.period
    }

    /// Returns the current level of the stream.
    #[must_use]
    pub const fn level(&self) -> bool {
        self.level
    }

    /// Returns the time of the next transition.
    #[must_use]
    pub const fn next_edge_time(&self) -> u64 {
        self.next_edge
    }

    /// Number of rising edges produced so far.
    #[must_use]
    pub const fn rising_edges(&self) -> u64 {
        self.rising_edges
    }

    /// Requests a new period, applied at the next rising edge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeriodTooShort`] for periods below 2.
    pub const fn set_period(&mut self, period: u64) -> Result<(), ConfigError> {
        if period < 2 {
            return Err(ConfigError::PeriodTooShort);
        }
        self.pending_period = Some(period);
        Ok(())
    }

    const fn high_time(&self) -> u64 {
        self.period / 2
    }

    /// Performs the pending transition and returns its edge and time.
    pub fn advance(&mut self) -> (u64, Edge) {
        let time = self.next_edge;
        if self.level {
            self.level = false;
            self.next_edge = time + (self.period - self.high_time());
            (time, Edge::Falling)
        } else {
            if let Some(period) = self.pending_period.take() {
                self.period = period;
            }
            self.level = true;
            self.rising_edges += 1;
            self.next_edge = time + self.high_time();
            (time, Edge::Rising)
        }
    }
}
