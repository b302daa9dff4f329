//! Cross-domain transfer queue with Gray-coded pointers.
//!
//! The producer and consumer sides are clocked by unrelated domains. Each
//! side owns its binary and Gray pointers and a two-stage synchronizer that
//! samples the other side's Gray pointer on its own tick. Pointers are one
//! bit wider than the address so a full queue and an empty queue differ.
//!
//! ```text
//!   full  <= next_wgray == synced_rgray ^ (0b11 << (addr_bits - 1))
//!   empty <= next_rgray == synced_wgray
//! ```
//!
//! Both flags are registered and pessimistic: a side may see the queue as
//! full or empty for a few ticks after the other side has moved, but never
//! the reverse.

/// Gray-code helpers.
pub mod gray;

pub use gray::{gray_decode, gray_encode, hamming_distance};

use log::trace;

use crate::{ConfigError, Synchronizer};

/// Queue geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    /// Number of entries; a power of two, at least 2.
    pub capacity: u32,
    /// Item width in bits, `1..=32`. Wider input bits are dropped.
    pub data_width: u8,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            data_width: 8,
        }
    }
}

impl QueueConfig {
    /// Validates capacity and item width.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CapacityTooSmall`],
    /// [`ConfigError::CapacityNotPowerOfTwo`] or
    /// [`ConfigError::DataWidthOutOfRange`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 {
            return Err(ConfigError::CapacityTooSmall);
        }
        if !self.capacity.is_power_of_two() || self.capacity > 1 << 30 {
            return Err(ConfigError::CapacityNotPowerOfTwo);
        }
        if self.data_width == 0 || self.data_width > 32 {
            return Err(ConfigError::DataWidthOutOfRange);
        }
        Ok(())
    }

    /// Mask keeping the low `data_width` bits of an item.
    #[must_use]
    pub const fn data_mask(&self) -> u32 {
        if self.data_width >= 32 {
            u32::MAX
        } else {
            (1 << self.data_width) - 1
        }
    }
}

/// Registers owned by one side of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Pointer {
    binary: u32,
    gray: u32,
}

impl Pointer {
    const fn advanced(self, mask: u32) -> Self {
        let binary = self.binary.wrapping_add(1) & mask;
        Self {
            binary,
            gray: gray_encode(binary),
        }
    }
}

/// Bounded two-domain FIFO.
///
/// [`CdcQueue::write_tick`] must only be called from producer-domain
/// rising edges and [`CdcQueue::read_tick`] only from consumer-domain
/// rising edges; each reads the other side solely through its synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdcQueue {
    config: QueueConfig,
    storage: Vec<u32>,
    pointer_mask: u32,
    write: Pointer,
    read: Pointer,
    read_in_write_domain: Synchronizer<u32>,
    write_in_read_domain: Synchronizer<u32>,
    full: bool,
    empty: bool,
}

impl CdcQueue {
    /// Creates an empty queue.
    ///
    /// # Errors
    ///
    /// Propagates [`QueueConfig::validate`] failures.
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            storage: vec![0; config.capacity as usize],
            pointer_mask: (config.capacity << 1) - 1,
            write: Pointer::default(),
            read: Pointer::default(),
            read_in_write_domain: Synchronizer::new(),
            write_in_read_domain: Synchronizer::new(),
            full: false,
            empty: true,
        })
    }

    /// Returns both sides to the empty state.
    pub fn reset(&mut self) {
        self.write = Pointer::default();
        self.read = Pointer::default();
        self.read_in_write_domain.clear();
        self.write_in_read_domain.clear();
        self.full = false;
        self.empty = true;
    }

    const fn full_pattern(&self, synced_read_gray: u32) -> u32 {
        let addr_bits = self.config.capacity.trailing_zeros();
        synced_read_gray ^ (0b11 << (addr_bits - 1))
    }

    /// Producer-domain rising edge. Stores `item` unless the queue is full.
    ///
    /// Returns `true` when an item was accepted.
    pub fn write_tick(&mut self, item: Option<u32>) -> bool {
        let synced_read = self.read_in_write_domain.output();
        let accepted = match item {
            Some(value) if !self.full => {
                let slot = (self.write.binary & (self.config.capacity - 1)) as usize;
                self.storage[slot] = value & self.config.data_mask();
                self.write = self.write.advanced(self.pointer_mask);
                trace!("queue: wrote {value:#x} into slot {slot}");
                true
            }
            _ => false,
        };
        self.full = self.write.gray == self.full_pattern(synced_read);
        self.read_in_write_domain.sample(self.read.gray);
        accepted
    }

    /// Consumer-domain rising edge. Pops the oldest item when `read_enable`
    /// is set and the queue is not empty.
    pub fn read_tick(&mut self, read_enable: bool) -> Option<u32> {
        let synced_write = self.write_in_read_domain.output();
        let item = if read_enable && !self.empty {
            let slot = (self.read.binary & (self.config.capacity - 1)) as usize;
            self.read = self.read.advanced(self.pointer_mask);
            trace!("queue: read slot {slot}");
            Some(self.storage[slot])
        } else {
            None
        };
        self.empty = self.read.gray == synced_write;
        self.write_in_read_domain.sample(self.write.gray);
        item
    }

    /// Registered full flag, as seen by the producer.
    #[must_use]
    pub const fn full(&self) -> bool {
        self.full
    }

    /// Registered empty flag, as seen by the consumer.
    #[must_use]
    pub const fn empty(&self) -> bool {
        self.empty
    }

    /// True occupancy from both binary pointers; an observer's view that
    /// neither side has.
    #[must_use]
    pub const fn occupancy(&self) -> u32 {
        self.write.binary.wrapping_sub(self.read.binary) & self.pointer_mask
    }

    /// Producer Gray pointer.
    #[must_use]
    pub const fn write_gray(&self) -> u32 {
        self.write.gray
    }

    /// Consumer Gray pointer.
    #[must_use]
    pub const fn read_gray(&self) -> u32 {
        self.read.gray
    }

    /// Geometry.
    #[must_use]
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }
}
