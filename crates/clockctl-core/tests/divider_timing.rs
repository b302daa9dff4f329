//! Divider output timing: power-of-two periods and fractional averages.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use clockctl_core::{
    Divider, DividerConfig, FractionalDivider, FractionalRatio, IntegerDivider, IntegerRatio,
};
use env_logger as _;
use log as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Runs `ticks` enabled ticks and returns the lengths between output
/// transitions, the first measured from the start.
fn toggle_intervals(mut tick: impl FnMut() -> bool, ticks: usize) -> Vec<u32> {
    let mut intervals = Vec::new();
    let mut run = 0;
    let mut last = false;
    for _ in 0..ticks {
        let level = tick();
        run += 1;
        if level != last {
            intervals.push(run);
            run = 0;
            last = level;
        }
    }
    intervals
}

#[rstest]
#[case(IntegerRatio::Div2, 1)]
#[case(IntegerRatio::Div4, 2)]
#[case(IntegerRatio::Div8, 4)]
#[case(IntegerRatio::Div16, 8)]
fn integer_divider_has_fifty_percent_duty(#[case] ratio: IntegerRatio, #[case] half: u32) {
    let mut divider = IntegerDivider::new(ratio);
    let intervals = toggle_intervals(|| divider.tick(true), 200);
    assert_eq!(intervals[0], half, "first rise after {half} ticks");
    assert!(intervals[1..].iter().all(|interval| *interval == half));
    assert_eq!(ratio.divisor(), half * 2);
}

#[rstest]
#[case(IntegerRatio::Div2)]
#[case(IntegerRatio::Div16)]
fn disabled_integer_divider_stays_low(#[case] ratio: IntegerRatio) {
    let mut divider = IntegerDivider::new(ratio);
    for _ in 0..5 {
        divider.tick(true);
    }
    for _ in 0..40 {
        assert!(!divider.tick(false));
        assert_eq!(divider.candidates(), [false; 4]);
    }
}

#[test]
fn integer_candidates_are_counter_bits() {
    let mut divider = IntegerDivider::new(IntegerRatio::Div8);
    for _ in 0..6 {
        divider.tick(true);
    }
    assert_eq!(divider.candidates(), [false, true, true, false]);
    assert!(divider.output());
}

#[rstest]
#[case(0x38, 3, 8)]
#[case(0x28, 2, 8)]
#[case(0x10, 1, 0)]
#[case(0x2F, 2, 15)]
#[case(0xF1, 15, 1)]
fn fractional_average_half_period_is_exact(
    #[case] byte: u8,
    #[case] integer: u32,
    #[case] fraction: u32,
) {
    let ratio = FractionalRatio::from_byte(byte).expect("valid ratio");
    let mut divider = FractionalDivider::new(ratio);
    let intervals = toggle_intervals(|| divider.tick(true), 2_000);
    assert_eq!(intervals[0], integer);

    // Sixteen periods after the first rise carry exactly `fraction` times.
    let window: u32 = intervals[1..33].iter().sum();
    assert_eq!(window, 32 * integer + 2 * fraction);
    assert!(intervals[1..]
        .iter()
        .all(|interval| *interval == integer || *interval == integer + 1));
    assert_eq!(
        ratio.average_half_period_sixteenths(),
        16 * integer + fraction
    );
}

#[test]
fn fractional_halves_of_one_period_are_equal() {
    let ratio = FractionalRatio::from_byte(0x25).expect("valid ratio");
    let mut divider = FractionalDivider::new(ratio);
    let intervals = toggle_intervals(|| divider.tick(true), 500);
    for pair in intervals[1..].chunks_exact(2) {
        assert_eq!(pair[0], pair[1]);
    }
}

#[test]
fn engine_enum_matches_direct_engines() {
    let ratio = FractionalRatio::from_byte(0x38).expect("valid ratio");
    let mut wrapped = Divider::new(DividerConfig::Fractional(ratio));
    let mut direct = FractionalDivider::new(ratio);
    for _ in 0..100 {
        assert_eq!(wrapped.tick(true), direct.tick(true));
    }

    let mut wrapped = Divider::new(DividerConfig::Integer(IntegerRatio::Div4));
    let mut direct = IntegerDivider::new(IntegerRatio::Div4);
    for _ in 0..100 {
        assert_eq!(wrapped.tick(true), direct.tick(true));
    }
}
