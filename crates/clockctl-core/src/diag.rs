//! Saturating status counters kept by the composed core.

/// Counters of locally absorbed runtime hazards and notable events.
///
/// Every counter saturates at `u32::MAX`; nothing here ever escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StatusCounters {
    /// Producer writes refused because the queue looked full.
    pub refused_writes: u32,
    /// Consumer reads requested while the queue looked empty.
    pub empty_reads: u32,
    /// Entries into Test-Logic-Reset, by TMS or TRST.
    pub tap_resets: u32,
    /// Ownership changes of the functional source selector.
    pub selector_handovers: u32,
    /// Self-test runs that reached Complete.
    pub completed_bist_runs: u32,
    /// Items the consumer side delivered.
    pub delivered_items: u32,
}

impl StatusCounters {
    /// Creates a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a refused producer write.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_refused_write(&mut self) {
        self.refused_writes = self.refused_writes.saturating_add(1);
    }

    /// Records a read attempted while empty.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_empty_read(&mut self) {
        self.empty_reads = self.empty_reads.saturating_add(1);
    }

    /// Records a delivered item.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_delivery(&mut self) {
        self.delivered_items = self.delivered_items.saturating_add(1);
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::StatusCounters;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(StatusCounters::new(), StatusCounters::default());
    }

    #[test]
    fn counters_saturate() {
        let mut counters = StatusCounters {
            refused_writes: u32::MAX,
            empty_reads: u32::MAX - 1,
            ..StatusCounters::default()
        };
        counters.record_refused_write();
        counters.record_empty_read();
        counters.record_empty_read();
        assert_eq!(counters.refused_writes, u32::MAX);
        assert_eq!(counters.empty_reads, u32::MAX);
    }

    #[test]
    fn reset_clears_everything() {
        let mut counters = StatusCounters::new();
        counters.record_delivery();
        counters.reset();
        assert_eq!(counters.delivered_items, 0);
    }
}
