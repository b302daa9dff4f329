/// The sixteen controller states, with their conventional 4-bit encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum TapState {
    /// Test-Logic-Reset; the initial state.
    #[default]
    TestLogicReset = 0xF,
    /// Run-Test/Idle.
    RunTestIdle = 0xC,
    /// Select-DR-Scan.
    SelectDrScan = 0x7,
    /// Capture-DR.
    CaptureDr = 0x6,
    /// Shift-DR.
    ShiftDr = 0x2,
    /// Exit1-DR.
    Exit1Dr = 0x1,
    /// Pause-DR.
    PauseDr = 0x3,
    /// Exit2-DR.
    Exit2Dr = 0x0,
    /// Update-DR.
    UpdateDr = 0x5,
    /// Select-IR-Scan.
    SelectIrScan = 0x4,
    /// Capture-IR.
    CaptureIr = 0xE,
    /// Shift-IR.
    ShiftIr = 0xA,
    /// Exit1-IR.
    Exit1Ir = 0x9,
    /// Pause-IR.
    PauseIr = 0xB,
    /// Exit2-IR.
    Exit2Ir = 0x8,
    /// Update-IR.
    UpdateIr = 0xD,
}

/// Transition table: `(state, next on TMS=0, next on TMS=1)`.
///
/// Both scan columns mirror each other except that Select-IR-Scan returns to
/// Test-Logic-Reset on TMS=1 instead of entering another column.
pub const TAP_TRANSITION_TABLE: &[(TapState, TapState, TapState)] = &[
    (TapState::TestLogicReset, TapState::RunTestIdle, TapState::TestLogicReset),
    (TapState::RunTestIdle, TapState::RunTestIdle, TapState::SelectDrScan),
    (TapState::SelectDrScan, TapState::CaptureDr, TapState::SelectIrScan),
    (TapState::CaptureDr, TapState::ShiftDr, TapState::Exit1Dr),
    (TapState::ShiftDr, TapState::ShiftDr, TapState::Exit1Dr),
    (TapState::Exit1Dr, TapState::PauseDr, TapState::UpdateDr),
    (TapState::PauseDr, TapState::PauseDr, TapState::Exit2Dr),
    (TapState::Exit2Dr, TapState::ShiftDr, TapState::UpdateDr),
    (TapState::UpdateDr, TapState::RunTestIdle, TapState::SelectDrScan),
    (TapState::SelectIrScan, TapState::CaptureIr, TapState::TestLogicReset),
    (TapState::CaptureIr, TapState::ShiftIr, TapState::Exit1Ir),
    (TapState::ShiftIr, TapState::ShiftIr, TapState::Exit1Ir),
    (TapState::Exit1Ir, TapState::PauseIr, TapState::UpdateIr),
    (TapState::PauseIr, TapState::PauseIr, TapState::Exit2Ir),
    (TapState::Exit2Ir, TapState::ShiftIr, TapState::UpdateIr),
    (TapState::UpdateIr, TapState::RunTestIdle, TapState::SelectDrScan),
];

impl TapState {
    /// Every state in table order.
    pub const ALL: [Self; 16] = [
        Self::TestLogicReset,
        Self::RunTestIdle,
        Self::SelectDrScan,
        Self::CaptureDr,
        Self::ShiftDr,
        Self::Exit1Dr,
        Self::PauseDr,
        Self::Exit2Dr,
        Self::UpdateDr,
        Self::SelectIrScan,
        Self::CaptureIr,
        Self::ShiftIr,
        Self::Exit1Ir,
        Self::PauseIr,
        Self::Exit2Ir,
        Self::UpdateIr,
    ];

    /// Raw 4-bit state encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a raw state register.
    ///
    /// Values outside the 4-bit encoding space (for example a corrupted
    /// register in a fault-injection run) decode to Test-Logic-Reset.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            0xF => Self::TestLogicReset,
            0xC => Self::RunTestIdle,
            0x7 => Self::SelectDrScan,
            0x6 => Self::CaptureDr,
            0x2 => Self::ShiftDr,
            0x1 => Self::Exit1Dr,
            0x3 => Self::PauseDr,
            0x0 => Self::Exit2Dr,
            0x5 => Self::UpdateDr,
            0x4 => Self::SelectIrScan,
            0xE => Self::CaptureIr,
            0xA => Self::ShiftIr,
            0x9 => Self::Exit1Ir,
            0xB => Self::PauseIr,
            0x8 => Self::Exit2Ir,
            0xD => Self::UpdateIr,
            _ => Self::TestLogicReset,
        }
    }

    /// `true` in the two states where TDO is driven.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::ShiftDr | Self::ShiftIr)
    }
}

/// Looks up the successor of `state` for one TMS sample.
#[must_use]
pub fn next_state(state: TapState, tms: bool) -> TapState {
    TAP_TRANSITION_TABLE
        .iter()
        .find_map(|(from, on_low, on_high)| {
            (*from == state).then_some(if tms { *on_high } else { *on_low })
        })
        .unwrap_or(TapState::TestLogicReset)
}

/// Shortest TMS sequence leading from `from` to `to`.
///
/// Ties prefer TMS=0, so paths stay inside the current scan column when
/// possible. An empty sequence means the states are equal.
#[must_use]
pub fn tms_path(from: TapState, to: TapState) -> Vec<bool> {
    let mut visited = vec![from];
    let mut frontier = vec![(from, Vec::new())];
    while !frontier.is_empty() {
        let mut next_frontier = Vec::new();
        for (state, path) in frontier {
            if state == to {
                return path;
            }
            for tms in [false, true] {
                let next = next_state(state, tms);
                if !visited.contains(&next) {
                    visited.push(next);
                    let mut extended = path.clone();
                    extended.push(tms);
                    next_frontier.push((next, extended));
                }
            }
        }
        frontier = next_frontier;
    }
    Vec::new()
}
