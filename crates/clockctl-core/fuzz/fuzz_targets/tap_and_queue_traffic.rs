#![no_main]

use clockctl_core::{CdcQueue, QueueConfig, TapController, TapState, IDCODE_INSTRUCTION};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut tap = TapController::new(u32::from_le_bytes([data[0], data[1], 0x43, 0x4D]));
    for byte in &data[2..] {
        if byte & 0x80 != 0 {
            tap.force_state_bits(byte >> 2);
        }
        tap.rising(byte & 1 != 0, byte & 2 != 0);
        tap.falling();
        assert_eq!(tap.tdo_enabled(), tap.state().is_shift());
    }
    for _ in 0..5 {
        tap.rising(true, false);
        tap.falling();
    }
    assert_eq!(tap.state(), TapState::TestLogicReset);
    assert_eq!(tap.instruction(), IDCODE_INSTRUCTION);

    let capacity = 2u32 << (data[0] % 5);
    let Ok(mut queue) = CdcQueue::new(QueueConfig {
        capacity,
        data_width: 8,
    }) else {
        return;
    };
    let mut next_write = 0u32;
    let mut next_read = 0u32;
    for byte in &data[2..] {
        if byte & 0x10 != 0 && queue.write_tick(Some(next_write)) {
            next_write += 1;
        }
        if byte & 0x20 != 0 {
            if let Some(item) = queue.read_tick(byte & 0x40 != 0) {
                assert_eq!(item, next_read & 0xFF);
                next_read += 1;
            }
        }
        assert!(queue.occupancy() <= capacity);
    }
});
