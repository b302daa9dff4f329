//! Host-side probes: identification scans and divider waveform capture.

use clockctl_core::{Divider, DividerConfig, ScanDriver, TapController, TapPort};
use log::debug;
use serde::Serialize;

/// Port wrapper that counts TCK cycles.
#[derive(Debug)]
pub struct CountingPort<P: TapPort> {
    inner: P,
    cycles: u64,
}

impl<P: TapPort> CountingPort<P> {
    /// Wraps `inner` with a zeroed cycle count.
    pub const fn new(inner: P) -> Self {
        Self { inner, cycles: 0 }
    }

    /// TCK cycles applied so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Unwraps the port.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: TapPort> TapPort for CountingPort<P> {
    fn clock(&mut self, tms: bool, tdi: bool) -> bool {
        self.cycles += 1;
        self.inner.clock(tms, tdi)
    }
}

/// Result of an identification scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdcodeProbe {
    /// Identification word read back.
    pub value: u32,
    /// TCK cycles the scan took, including the initial reset.
    pub tck_cycles: u64,
}

/// Reads the identification register of a controller configured with
/// `idcode`, starting from a TMS reset.
#[must_use]
pub fn probe_idcode(idcode: u32) -> IdcodeProbe {
    let mut driver = ScanDriver::new(CountingPort::new(TapController::new(idcode)));
    let value = driver.read_idcode();
    let tck_cycles = driver.port().cycles();
    debug!("idcode probe read {value:#010x} in {tck_cycles} TCK cycles");
    IdcodeProbe { value, tck_cycles }
}

/// Drives a divider for `ticks` source rising edges and returns the length,
/// in source ticks, of every completed output half-period.
#[must_use]
pub fn divider_half_periods(config: DividerConfig, ticks: u64) -> Vec<u64> {
    let mut divider = Divider::new(config);
    let mut level = divider.output();
    let mut last_toggle = 0;
    let mut halves = Vec::new();
    for tick in 1..=ticks {
        let output = divider.tick(true);
        if output != level {
            halves.push(tick - last_toggle);
            last_toggle = tick;
            level = output;
        }
    }
    halves
}
