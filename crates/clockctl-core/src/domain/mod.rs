//! Timing domains: periodic sources, the multi-domain edge scheduler, and
//! the sampling primitives used to move signals between domains.

/// Discrete-event scheduler over independent domain sources.
pub mod scheduler;
/// Periodic trigger source with a settable period.
pub mod source;
/// Multi-stage synchronizer and edge detector primitives.
pub mod sync;

pub use scheduler::{DomainScheduler, EdgeEvent};
pub use source::{DomainConfig, DomainSource};
pub use sync::{EdgeDetector, Synchronizer};

/// Identity of one timing domain registered with a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DomainId(pub u8);

impl DomainId {
    /// Returns the scheduler slot index for this domain.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Direction of a trigger transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Edge {
    /// Low-to-high transition; the leading edge every register samples on.
    Rising,
    /// High-to-low transition; the trailing edge.
    Falling,
}

impl Edge {
    /// Returns the level a stream holds right after this edge.
    #[must_use]
    pub const fn level_after(self) -> bool {
        matches!(self, Self::Rising)
    }
}
