use log::trace;

use crate::{ConfigError, DomainConfig, DomainId, DomainSource, Edge};

/// One transition delivered by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EdgeEvent {
    /// Simulated time of the transition.
    pub time: u64,
    /// Domain that transitioned.
    pub domain: DomainId,
    /// Direction of the transition.
    pub edge: Edge,
}

/// Discrete-event scheduler over independent periodic sources.
///
/// Edges are delivered one at a time in time order. Edges of different
/// domains that fall on the same instant are delivered in ascending domain
/// order; components must not rely on that order, it only keeps runs
/// reproducible.
#[derive(Debug, Clone, Default)]
pub struct DomainScheduler {
    now: u64,
    sources: Vec<DomainSource>,
}

impl DomainScheduler {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: 0,
            sources: Vec::new(),
        }
    }

    /// Registers a new periodic source and returns its identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PeriodTooShort`] when the period is invalid.
    pub fn add(&mut self, config: DomainConfig) -> Result<DomainId, ConfigError> {
        let index = u8::try_from(self.sources.len()).map_err(|_| ConfigError::UnknownDomain)?;
        let id = DomainId(index);
        self.sources.push(DomainSource::new(id, config)?);
        Ok(id)
    }

    /// Current simulated time (time of the last delivered edge).
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Returns the source registered under `id`.
    #[must_use]
    pub fn source(&self, id: DomainId) -> Option<&DomainSource> {
        self.sources.get(id.index())
    }

    /// Returns the current level of a domain, low for unknown domains.
    #[must_use]
    pub fn level(&self, id: DomainId) -> bool {
        self.source(id).is_some_and(DomainSource::level)
    }

    /// Requests a new period for a domain, effective at its next rising edge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDomain`] for unregistered domains and
    /// [`ConfigError::PeriodTooShort`] for invalid periods.
    pub fn set_period(&mut self, id: DomainId, period: u64) -> Result<(), ConfigError> {
        self.sources
            .get_mut(id.index())
            .ok_or(ConfigError::UnknownDomain)?
            .set_period(period)
    }

    /// Time of the next pending edge across all domains.
    #[must_use]
    pub fn peek_time(&self) -> Option<u64> {
        self.sources.iter().map(DomainSource::next_edge_time).min()
    }

    /// Delivers the earliest pending edge.
    pub fn next_event(&mut self) -> Option<EdgeEvent> {
        let source = self
            .sources
            .iter_mut()
            .min_by_key(|source| (source.next_edge_time(), source.id()))?;
        let domain = source.id();
        let (time, edge) = source.advance();
        self.now = time;
        trace!("t={time} domain={} {edge:?}", domain.0);
        Some(EdgeEvent { time, domain, edge })
    }
}
