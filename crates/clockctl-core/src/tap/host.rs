use super::{
    tms_path, TapController, TapState, BYPASS_INSTRUCTION, IDCODE_INSTRUCTION, IDCODE_WIDTH,
    IR_WIDTH,
};

/// One TCK cycle on a test-access port.
pub trait TapPort {
    /// Samples TDO, then applies a full TCK cycle with the given TMS/TDI.
    ///
    /// Returns the TDO value seen *before* the rising edge, the instant a
    /// probe samples it.
    fn clock(&mut self, tms: bool, tdi: bool) -> bool;
}

impl TapPort for TapController {
    fn clock(&mut self, tms: bool, tdi: bool) -> bool {
        let tdo = self.tdo();
        self.rising(tms, tdi);
        self.falling();
        tdo
    }
}

/// Host-side driver that tracks the controller state and issues scans.
///
/// Paths between states are the shortest TMS sequences through the
/// transition table; shifts exit to Exit1 on the last bit and the driver
/// parks in Run-Test/Idle after every scan.
#[derive(Debug)]
pub struct ScanDriver<P: TapPort> {
    port: P,
    state: TapState,
}

impl<P: TapPort> ScanDriver<P> {
    /// Wraps a port and forces it into Test-Logic-Reset.
    pub fn new(port: P) -> Self {
        let mut driver = Self {
            port,
            state: TapState::TestLogicReset,
        };
        driver.reset();
        driver
    }

    /// Drives five TMS-high cycles, reaching Test-Logic-Reset from anywhere.
    pub fn reset(&mut self) {
        for _ in 0..5 {
            self.port.clock(true, false);
        }
        self.state = TapState::TestLogicReset;
    }

    /// State the driver believes the controller is in.
    #[must_use]
    pub const fn state(&self) -> TapState {
        self.state
    }

    /// Borrows the wrapped port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Consumes the driver, returning the port.
    pub fn into_port(self) -> P {
        self.port
    }

    /// Walks to `target` along the shortest TMS path.
    pub fn goto(&mut self, target: TapState) {
        for tms in tms_path(self.state, target) {
            self.port.clock(tms, false);
        }
        self.state = target;
    }

    /// Shifts `bits` (first element first) through the current shift state
    /// and returns the TDO bits captured alongside them.
    fn shift(&mut self, bits: &[bool]) -> Vec<bool> {
        let last = bits.len().saturating_sub(1);
        let captured = bits
            .iter()
            .enumerate()
            .map(|(index, bit)| self.port.clock(index == last, *bit))
            .collect();
        if !bits.is_empty() {
            self.state = match self.state {
                TapState::ShiftIr => TapState::Exit1Ir,
                _ => TapState::Exit1Dr,
            };
        }
        captured
    }

    /// Loads a 4-bit instruction, LSB first, and returns the captured IR bits.
    pub fn load_instruction(&mut self, instruction: u8) -> Vec<bool> {
        let bits: Vec<bool> = (0..IR_WIDTH)
            .map(|bit| (instruction >> bit) & 1 != 0)
            .collect();
        self.goto(TapState::ShiftIr);
        let captured = self.shift(&bits);
        self.goto(TapState::RunTestIdle);
        captured
    }

    /// Performs a data scan and returns the bits shifted out, first bit first.
    pub fn scan_data(&mut self, bits: &[bool]) -> Vec<bool> {
        self.goto(TapState::ShiftDr);
        let captured = self.shift(bits);
        self.goto(TapState::RunTestIdle);
        captured
    }

    /// Loads IDCODE and reads the 32-bit device identification register.
    pub fn read_idcode(&mut self) -> u32 {
        self.load_instruction(IDCODE_INSTRUCTION);
        let bits = self.scan_data(&[false; IDCODE_WIDTH]);
        bits.iter()
            .enumerate()
            .fold(0, |word, (index, bit)| word | (u32::from(*bit) << index))
    }

    /// Loads BYPASS and shifts `bits` through the pass-through register.
    pub fn bypass_scan(&mut self, bits: &[bool]) -> Vec<bool> {
        self.load_instruction(BYPASS_INSTRUCTION);
        self.scan_data(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::ScanDriver;
    use crate::tap::{TapController, TapState, BYPASS_INSTRUCTION, DEFAULT_IDCODE};

    #[test]
    fn reads_default_idcode() {
        let mut driver = ScanDriver::new(TapController::default());
        assert_eq!(driver.read_idcode(), DEFAULT_IDCODE);
        assert_eq!(driver.state(), TapState::RunTestIdle);
        assert_eq!(driver.port().state(), TapState::RunTestIdle);
    }

    #[test]
    fn instruction_scan_returns_capture_pattern() {
        let mut driver = ScanDriver::new(TapController::default());
        assert_eq!(
            driver.load_instruction(BYPASS_INSTRUCTION),
            vec![true, false, true, false]
        );
        assert_eq!(driver.into_port().instruction(), BYPASS_INSTRUCTION);
    }

    #[test]
    fn bypass_delays_by_one_cycle() {
        let mut driver = ScanDriver::new(TapController::default());
        let out = driver.bypass_scan(&[true, true, false, true]);
        assert_eq!(out, vec![false, true, true, false]);
    }
}
