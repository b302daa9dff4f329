//! Composed core: arbiter modes, bypass, self-test runs and queue draining.

#![allow(clippy::pedantic, clippy::nursery)]

use clockctl_core::{
    ArbiterMode, BistConfig, BistInputs, BistState, ControlCore, ControlInputs, CoreConfig,
    DividerConfig, DomainArbiter, DomainRole, FractionalRatio, IntegerRatio, TraceEvent,
};
use log as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn core() -> ControlCore {
    let _ = env_logger::builder().is_test(true).try_init();
    ControlCore::new(CoreConfig::default()).expect("valid config")
}

#[rstest]
#[case(ArbiterMode::Functional, false)]
#[case(ArbiterMode::ExternalTest, true)]
#[case(ArbiterMode::ProtocolTest, true)]
#[case(ArbiterMode::SelfTest, true)]
fn test_mode_flag_follows_mode_unless_bypassed(#[case] mode: ArbiterMode, #[case] test: bool) {
    let mut arbiter = DomainArbiter::new();
    arbiter.set_mode_bits(mode.bits());
    let status = arbiter.status();
    assert_eq!(status.requested, mode);
    assert_eq!(status.is_test_mode, test);

    arbiter.set_bypass(true);
    let status = arbiter.status();
    assert_eq!(status.effective, ArbiterMode::Functional);
    assert!(!status.is_test_mode);
    assert!(status.bypass);
}

#[rstest]
#[case(ArbiterMode::ExternalTest, DomainRole::ExternalTest)]
#[case(ArbiterMode::ProtocolTest, DomainRole::Tck)]
fn test_mode_output_follows_its_source(#[case] mode: ArbiterMode, #[case] role: DomainRole) {
    let mut core = core();
    core.set_inputs(ControlInputs {
        mode,
        ..ControlInputs::default()
    });
    core.run_until(1_000);
    assert_eq!(core.status().arbiter.driving, Some(mode));

    for _ in 0..200 {
        let before = core.output();
        let event = core.step().expect("sources run forever");
        if event.domain == role.id() {
            assert_eq!(core.output(), event.edge.level_after());
        } else {
            assert_eq!(core.output(), before, "t={}", event.time);
        }
    }
}

#[test]
fn bypass_hands_output_back_to_functional_source() {
    let mut core = core();
    let inputs = ControlInputs {
        mode: ArbiterMode::ExternalTest,
        ..ControlInputs::default()
    };
    core.set_inputs(inputs);
    core.run_until(1_000);
    assert!(core.status().arbiter.is_test_mode);

    core.set_inputs(ControlInputs {
        bypass: true,
        ..inputs
    });
    core.run_until(3_000);
    let status = core.status();
    assert!(!status.arbiter.is_test_mode);
    assert_eq!(status.arbiter.requested, ArbiterMode::ExternalTest);
    assert_eq!(status.arbiter.driving, Some(ArbiterMode::Functional));
}

#[test]
fn runtime_source_switch_moves_functional_ownership() {
    let mut core = core();
    core.run_until(500);
    assert_eq!(core.status().functional_source, Some(0));
    core.set_inputs(ControlInputs {
        clock_source_select: true,
        ..ControlInputs::default()
    });
    let mut trace: Vec<TraceEvent> = Vec::new();
    core.run_until_with_trace(1_000, &mut trace);
    assert_eq!(core.status().functional_source, Some(1));
    let owners: Vec<Option<usize>> = trace
        .iter()
        .filter_map(|event| match event {
            TraceEvent::SelectorHandover { owner, .. } => Some(*owner),
            _ => None,
        })
        .collect();
    assert_eq!(owners, vec![None, Some(1)]);
    assert_eq!(core.status().counters.selector_handovers, 2);
}

#[test]
fn scan_enable_reaches_status_after_functional_edges() {
    let mut core = core();
    core.set_inputs(ControlInputs {
        scan_enable: true,
        ..ControlInputs::default()
    });
    core.run_until(300);
    assert!(core.status().arbiter.scan_enable);
}

#[test]
fn self_test_run_completes_and_is_counted() {
    let config = CoreConfig {
        bist: BistConfig {
            counter_width: 8,
            max_count: 4,
            pattern_ratio: IntegerRatio::Div2,
        },
        ..CoreConfig::default()
    };
    let mut core = ControlCore::new(config).expect("valid config");
    let start = ControlInputs {
        mode: ArbiterMode::SelfTest,
        bist: BistInputs {
            enable: true,
            start: true,
            hold: false,
        },
        ..ControlInputs::default()
    };
    core.set_inputs(start);
    core.run_until(4);
    assert_eq!(core.status().bist_state, BistState::Init);

    core.set_inputs(ControlInputs {
        bist: BistInputs {
            start: false,
            ..start.bist
        },
        ..start
    });
    let mut trace: Vec<TraceEvent> = Vec::new();
    core.run_until_with_trace(400, &mut trace);
    let status = core.status();
    assert!(status.bist_done);
    assert!(!status.bist_active);
    assert_eq!(status.bist_count, 4);
    assert_eq!(status.counters.completed_bist_runs, 1);
    assert!(trace.contains(&TraceEvent::BistTransition {
        time: 72,
        from: BistState::Run,
        to: BistState::Complete,
        count: 4,
    }));
}

#[test]
fn divided_functional_stream_clocks_the_consumer() {
    let config = CoreConfig {
        divider: Some(DividerConfig::Fractional(
            FractionalRatio::from_byte(0x38).expect("valid ratio"),
        )),
        ..CoreConfig::default()
    };
    let mut core = ControlCore::new(config).expect("valid config");
    core.set_inputs(ControlInputs {
        drain: true,
        ..ControlInputs::default()
    });
    for value in 1..=20 {
        core.push_item(value);
    }
    core.run_until(20_000);
    assert_eq!(core.take_received(), (1..=20).collect::<Vec<u32>>());
    assert!(core.received().is_empty());
    let counters = core.status().counters;
    assert_eq!(counters.delivered_items, 20);
    assert!(counters.empty_reads > 0);
}

#[test]
fn producer_stalls_while_consumer_is_stopped() {
    let mut core = core();
    for value in 0..40 {
        core.push_item(value);
    }
    core.run_until(5_000);
    let status = core.status();
    assert!(status.queue_full);
    assert_eq!(status.queue_occupancy, 16);
    assert_eq!(status.pending_items, 24);
    assert!(status.counters.refused_writes > 0);
    assert!(core.received().is_empty());
}

#[test]
fn trst_and_tms_resets_are_counted() {
    let mut core = core();
    core.trst();
    core.set_inputs(ControlInputs {
        tms: false,
        ..ControlInputs::default()
    });
    core.run_until(200);
    core.set_inputs(ControlInputs {
        tms: true,
        ..ControlInputs::default()
    });
    core.run_until(1_000);
    let status = core.status();
    assert_eq!(status.counters.tap_resets, 2);
    assert_eq!(status.tdo, None);
}
