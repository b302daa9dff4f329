//! Cross-domain queue ordering and flag behavior between unrelated domains.

#![allow(clippy::pedantic, clippy::nursery)]

use clockctl_core::{
    gray_decode, gray_encode, hamming_distance, CdcQueue, ConfigError, DomainConfig,
    DomainScheduler, Edge, QueueConfig,
};
use env_logger as _;
use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn queue(capacity: u32, data_width: u8) -> CdcQueue {
    CdcQueue::new(QueueConfig {
        capacity,
        data_width,
    })
    .expect("valid geometry")
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
#[case(32)]
fn full_on_capacity_th_write_and_next_write_refused(#[case] capacity: u32) {
    let mut fifo = queue(capacity, 16);
    for value in 0..capacity {
        assert!(!fifo.full(), "full before write {value}");
        assert!(fifo.write_tick(Some(value)));
    }
    assert!(fifo.full());
    assert!(!fifo.write_tick(Some(0xFFFF)));
    assert_eq!(fifo.occupancy(), capacity);

    for _ in 0..3 {
        fifo.read_tick(false);
    }
    assert_eq!(fifo.read_tick(true), Some(0));
}

#[test]
fn empty_read_is_a_no_op() {
    let mut fifo = queue(4, 8);
    for _ in 0..5 {
        assert_eq!(fifo.read_tick(true), None);
        assert!(fifo.empty());
        assert_eq!(fifo.occupancy(), 0);
        assert_eq!(fifo.read_gray(), 0);
    }
}

#[test]
fn items_are_masked_to_data_width() {
    let mut fifo = queue(2, 4);
    fifo.write_tick(Some(0xAB));
    for _ in 0..3 {
        fifo.read_tick(false);
    }
    assert_eq!(fifo.read_tick(true), Some(0xB));
}

#[test]
fn full_clears_once_read_pointer_is_synchronized() {
    let mut fifo = queue(2, 8);
    fifo.write_tick(Some(1));
    fifo.write_tick(Some(2));
    assert!(fifo.full());
    for _ in 0..3 {
        fifo.read_tick(false);
    }
    assert_eq!(fifo.read_tick(true), Some(1));

    // Two producer ticks carry the new read pointer across, a third
    // registers the flag from it.
    assert!(!fifo.write_tick(Some(3)));
    assert!(!fifo.write_tick(Some(3)));
    assert!(!fifo.write_tick(None));
    assert!(!fifo.full());
    assert!(fifo.write_tick(Some(3)));
    assert!(fifo.full());
}

#[test]
fn pointer_widths_wrap_through_gray_space() {
    let mut fifo = queue(4, 8);
    for round in 0..20u32 {
        fifo.write_tick(Some(round));
        for _ in 0..3 {
            fifo.read_tick(false);
        }
        assert_eq!(fifo.read_tick(true), Some(round));
        assert_eq!(gray_decode(fifo.read_gray()), (round + 1) % 8);
        assert_eq!(fifo.write_gray(), gray_encode((round + 1) % 8));
        for _ in 0..3 {
            fifo.write_tick(None);
        }
    }
}

#[test]
fn invalid_geometry_is_rejected() {
    assert_eq!(
        CdcQueue::new(QueueConfig {
            capacity: 24,
            data_width: 8,
        })
        .err(),
        Some(ConfigError::CapacityNotPowerOfTwo)
    );
}

proptest! {
    #[test]
    fn property_fifo_order_across_unrelated_domains(
        items in prop::collection::vec(any::<u8>(), 0..64),
        capacity_exp in 1u32..5,
        producer_period in 2u64..30,
        consumer_period in 2u64..30,
        consumer_phase in 0u64..30,
    ) {
        let capacity = 1 << capacity_exp;
        let mut fifo = queue(capacity, 8);
        let mut scheduler = DomainScheduler::new();
        let producer = scheduler
            .add(DomainConfig::with_period(producer_period))
            .expect("valid");
        scheduler
            .add(DomainConfig { period: consumer_period, phase: consumer_phase })
            .expect("valid");

        let mut pending: Vec<u32> = items.iter().rev().map(|item| u32::from(*item)).collect();
        let mut received = Vec::new();
        let mut events = 0;
        let mut write_gray = fifo.write_gray();
        let mut read_gray = fifo.read_gray();
        while (!pending.is_empty() || fifo.occupancy() > 0) && events < 100_000 {
            let event = scheduler.next_event().expect("sources run forever");
            events += 1;
            if event.edge != Edge::Rising {
                continue;
            }
            if event.domain == producer {
                if fifo.write_tick(pending.last().copied()) {
                    pending.pop();
                }
            } else if let Some(item) = fifo.read_tick(true) {
                received.push(item);
            }

            // a synchronizer never samples more than one changing bit
            prop_assert!(hamming_distance(write_gray, fifo.write_gray()) <= 1);
            prop_assert!(hamming_distance(read_gray, fifo.read_gray()) <= 1);
            write_gray = fifo.write_gray();
            read_gray = fifo.read_gray();

            prop_assert!(fifo.occupancy() <= capacity);
            if fifo.occupancy() == capacity {
                prop_assert!(fifo.full());
            }
            if fifo.occupancy() == 0 {
                prop_assert!(fifo.empty());
            }
        }

        let sent: Vec<u32> = items.iter().map(|item| u32::from(*item)).collect();
        prop_assert_eq!(received, sent);
    }
}
