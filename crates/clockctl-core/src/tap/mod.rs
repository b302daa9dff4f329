//! Test-access controller: 1149.1-style state machine with IDCODE and
//! BYPASS data registers.

/// Host-side scan driver that walks the controller through scans.
pub mod host;
/// State set, encodings, and the transition table.
pub mod state;

pub use host::{ScanDriver, TapPort};
pub use state::{next_state, tms_path, TapState, TAP_TRANSITION_TABLE};

use log::debug;

/// Instruction register width in bits.
pub const IR_WIDTH: usize = 4;
/// Device identification register width in bits.
pub const IDCODE_WIDTH: usize = 32;
/// Instruction selecting the device identification register.
pub const IDCODE_INSTRUCTION: u8 = 0b0001;
/// Instruction selecting the single-bit pass-through register.
pub const BYPASS_INSTRUCTION: u8 = 0b1111;
/// Fixed value loaded into the instruction shift register in Capture-IR.
pub const IR_CAPTURE_PATTERN: u8 = 0b0101;
/// Device identification constant used when none is configured.
pub const DEFAULT_IDCODE: u32 = 0x4D43_4453;

/// Data register placed between TDI and TDO by the held instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DataRegister {
    /// 32-bit device identification register.
    DeviceId,
    /// Single-bit pass-through register.
    Bypass,
}

impl DataRegister {
    /// Register selected by an instruction; anything but IDCODE bypasses.
    #[must_use]
    pub const fn for_instruction(instruction: u8) -> Self {
        if instruction & 0x0F == IDCODE_INSTRUCTION {
            Self::DeviceId
        } else {
            Self::Bypass
        }
    }
}

/// Test-access controller clocked by its own TCK domain.
///
/// All registers update on the rising edge from pre-edge values; TDO and its
/// enable update on the falling edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapController {
    idcode: u32,
    state: TapState,
    ir_shift: u8,
    ir_hold: u8,
    id_shift: u32,
    bypass: bool,
    tdo: bool,
    tdo_enable: bool,
    resets: u32,
}

impl Default for TapController {
    fn default() -> Self {
        Self::new(DEFAULT_IDCODE)
    }
}

impl TapController {
    /// Creates a controller in Test-Logic-Reset reporting `idcode`.
    #[must_use]
    pub const fn new(idcode: u32) -> Self {
        Self {
            idcode,
            state: TapState::TestLogicReset,
            ir_shift: 0,
            ir_hold: IDCODE_INSTRUCTION,
            id_shift: 0,
            bypass: false,
            tdo: false,
            tdo_enable: false,
            resets: 0,
        }
    }

    /// Asynchronous reset (TRST): initial state and IDCODE instruction.
    pub fn trst(&mut self) {
        let resets = self.resets.saturating_add(1);
        *self = Self {
            resets,
            ..Self::new(self.idcode)
        };
        debug!("tap: asynchronous reset");
    }

    /// Reacts to a TCK rising edge with the sampled TMS and TDI pins.
    pub fn rising(&mut self, tms: bool, tdi: bool) -> TapState {
        let state = self.state;
        let selected = self.selected_register();
        match state {
            TapState::CaptureIr => self.ir_shift = IR_CAPTURE_PATTERN,
            TapState::ShiftIr => {
                self.ir_shift = (self.ir_shift >> 1) | (u8::from(tdi) << (IR_WIDTH - 1));
            }
            TapState::UpdateIr => self.ir_hold = self.ir_shift,
            TapState::CaptureDr => match selected {
                DataRegister::DeviceId => self.id_shift = self.idcode,
                DataRegister::Bypass => self.bypass = false,
            },
            TapState::ShiftDr => match selected {
                DataRegister::DeviceId => {
                    self.id_shift =
                        (self.id_shift >> 1) | (u32::from(tdi) << (IDCODE_WIDTH - 1));
                }
                DataRegister::Bypass => self.bypass = tdi,
            },
            _ => {}
        }

        self.state = next_state(state, tms);
        if self.state == TapState::TestLogicReset {
            self.ir_hold = IDCODE_INSTRUCTION;
            if state != TapState::TestLogicReset {
                self.resets = self.resets.saturating_add(1);
                debug!("tap: {state:?} -> Test-Logic-Reset");
            }
        }
        self.state
    }

    /// Reacts to a TCK falling edge by updating TDO and its enable.
    pub const fn falling(&mut self) {
        self.tdo_enable = self.state.is_shift();
        self.tdo = match self.state {
            TapState::ShiftIr => self.ir_shift & 1 != 0,
            _ => match self.selected_register() {
                DataRegister::DeviceId => self.id_shift & 1 != 0,
                DataRegister::Bypass => self.bypass,
            },
        };
    }

    /// Current controller state.
    #[must_use]
    pub const fn state(&self) -> TapState {
        self.state
    }

    /// Overwrites the raw state register, as a fault injector would.
    ///
    /// Unrecognized encodings land in Test-Logic-Reset.
    pub const fn force_state_bits(&mut self, bits: u8) {
        self.state = TapState::from_bits(bits);
    }

    /// Latched instruction.
    #[must_use]
    pub const fn instruction(&self) -> u8 {
        self.ir_hold
    }

    /// Instruction shift register contents.
    #[must_use]
    pub const fn instruction_shift(&self) -> u8 {
        self.ir_shift
    }

    /// Data register selected by the latched instruction.
    #[must_use]
    pub const fn selected_register(&self) -> DataRegister {
        DataRegister::for_instruction(self.ir_hold)
    }

    /// Configured device identification constant.
    #[must_use]
    pub const fn idcode(&self) -> u32 {
        self.idcode
    }

    /// TDO pin value (meaningful only while [`Self::tdo_enabled`]).
    #[must_use]
    pub const fn tdo(&self) -> bool {
        self.tdo
    }

    /// `true` while TDO is driven (Shift-IR or Shift-DR).
    #[must_use]
    pub const fn tdo_enabled(&self) -> bool {
        self.tdo_enable
    }

    /// TDO as a tri-state pin: `None` while not driven.
    #[must_use]
    pub const fn tdo_pin(&self) -> Option<bool> {
        if self.tdo_enable {
            Some(self.tdo)
        } else {
            None
        }
    }

    /// Number of entries into Test-Logic-Reset, by TMS or TRST.
    #[must_use]
    pub const fn resets(&self) -> u32 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DataRegister, TapController, TapState, BYPASS_INSTRUCTION, DEFAULT_IDCODE,
        IDCODE_INSTRUCTION, IR_CAPTURE_PATTERN,
    };

    fn clock(tap: &mut TapController, tms: bool, tdi: bool) {
        tap.rising(tms, tdi);
        tap.falling();
    }

    #[test]
    fn power_up_selects_idcode() {
        let tap = TapController::default();
        assert_eq!(tap.state(), TapState::TestLogicReset);
        assert_eq!(tap.instruction(), IDCODE_INSTRUCTION);
        assert_eq!(tap.selected_register(), DataRegister::DeviceId);
        assert_eq!(tap.tdo_pin(), None);
    }

    #[test]
    fn capture_ir_loads_fixed_pattern() {
        let mut tap = TapController::default();
        for tms in [false, true, true, false, false] {
            clock(&mut tap, tms, false);
        }
        assert_eq!(tap.state(), TapState::ShiftIr);
        assert_eq!(tap.instruction_shift(), IR_CAPTURE_PATTERN);
        assert_eq!(tap.tdo_pin(), Some(true));
    }

    #[test]
    fn instruction_latches_only_in_update_ir() {
        let mut tap = TapController::default();
        for tms in [false, true, true, false, false] {
            clock(&mut tap, tms, false);
        }
        for (index, tms) in [false, false, false, true].into_iter().enumerate() {
            clock(&mut tap, tms, true);
            assert_eq!(tap.instruction(), IDCODE_INSTRUCTION, "bit {index}");
        }
        assert_eq!(tap.state(), TapState::Exit1Ir);
        clock(&mut tap, true, false);
        assert_eq!(tap.state(), TapState::UpdateIr);
        assert_eq!(tap.instruction(), IDCODE_INSTRUCTION);
        clock(&mut tap, false, false);
        assert_eq!(tap.instruction(), BYPASS_INSTRUCTION);
        assert_eq!(tap.selected_register(), DataRegister::Bypass);
    }

    #[test]
    fn trst_restores_idcode_instruction() {
        let mut tap = TapController::new(0x1234_5678);
        tap.force_state_bits(TapState::ShiftDr.bits());
        tap.trst();
        assert_eq!(tap.state(), TapState::TestLogicReset);
        assert_eq!(tap.instruction(), IDCODE_INSTRUCTION);
        assert_eq!(tap.idcode(), 0x1234_5678);
        assert_eq!(tap.resets(), 1);
    }

    #[test]
    fn corrupted_state_register_recovers_through_reset() {
        let mut tap = TapController::default();
        tap.force_state_bits(0x3C);
        assert_eq!(tap.state(), TapState::TestLogicReset);
        clock(&mut tap, false, false);
        assert_eq!(tap.state(), TapState::RunTestIdle);
    }

    #[test]
    fn tdo_is_released_outside_shift_states() {
        let mut tap = TapController::default();
        clock(&mut tap, false, false);
        assert!(!tap.tdo_enabled());
        assert_eq!(DEFAULT_IDCODE & 1, 1);
    }
}
