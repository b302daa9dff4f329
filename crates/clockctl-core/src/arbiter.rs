//! DFT domain arbiter: picks the stream that clocks the rest of the system.

use crate::{select_while_idle, Edge, EdgeDetector, GlitchFreeSelector4, Synchronizer};

/// Source chosen by the 2-bit mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ArbiterMode {
    /// `00`: functional clock from the source selector and divider.
    #[default]
    Functional = 0,
    /// `01`: externally supplied scan/test clock.
    ExternalTest = 1,
    /// `10`: test-access controller clock.
    ProtocolTest = 2,
    /// `11`: self-test sequencer gated clock.
    SelfTest = 3,
}

impl ArbiterMode {
    /// Every mode in code order.
    pub const ALL: [Self; 4] = [
        Self::Functional,
        Self::ExternalTest,
        Self::ProtocolTest,
        Self::SelfTest,
    ];

    /// Decodes the low two bits of a mode register.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Functional,
            1 => Self::ExternalTest,
            2 => Self::ProtocolTest,
            _ => Self::SelfTest,
        }
    }

    /// Returns the 2-bit mode code.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// `true` for every mode except [`ArbiterMode::Functional`].
    #[must_use]
    pub const fn is_test_mode(self) -> bool {
        !matches!(self, Self::Functional)
    }
}

/// Levels of the four arbiter candidates at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbiterCandidates {
    /// Functional stream.
    pub functional: bool,
    /// External scan/test stream.
    pub external_test: bool,
    /// Test-access controller stream.
    pub protocol_test: bool,
    /// Self-test gated stream.
    pub self_test: bool,
}

impl ArbiterCandidates {
    /// Levels in mode-code order.
    #[must_use]
    pub const fn as_array(self) -> [bool; 4] {
        [
            self.functional,
            self.external_test,
            self.protocol_test,
            self.self_test,
        ]
    }
}

/// Decoded arbiter status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArbiterStatus {
    /// Mode register contents.
    pub requested: ArbiterMode,
    /// Mode in effect after applying bypass.
    pub effective: ArbiterMode,
    /// `true` when the effective mode is a test mode.
    pub is_test_mode: bool,
    /// Bypass bit.
    pub bypass: bool,
    /// Scan enable as seen by the functional domain.
    pub scan_enable: bool,
    /// Candidate currently driving the glitch-free output, if any.
    pub driving: Option<ArbiterMode>,
}

/// Mode-driven clock arbiter with bypass and synchronized scan enable.
///
/// [`DomainArbiter::observe`] routes through the glitch-free selector tree
/// and is safe while the mode changes under running clocks.
/// [`DomainArbiter::pick_while_idle`] is a plain combinational pick for call
/// sites that only change mode while everything downstream is idle, such as
/// a reset sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainArbiter {
    mode: ArbiterMode,
    bypass: bool,
    tree: GlitchFreeSelector4,
    scan_sync: Synchronizer<bool>,
    functional_edges: EdgeDetector,
}

impl DomainArbiter {
    /// Creates an arbiter in functional mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the 2-bit mode register.
    pub const fn set_mode_bits(&mut self, bits: u8) {
        self.mode = ArbiterMode::from_bits(bits);
    }

    /// Loads the mode register from a decoded mode.
    pub const fn set_mode(&mut self, mode: ArbiterMode) {
        self.mode = mode;
    }

    /// Sets the bypass bit that forces the functional source.
    pub const fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Mode in effect after applying bypass.
    #[must_use]
    pub const fn effective_mode(&self) -> ArbiterMode {
        if self.bypass {
            ArbiterMode::Functional
        } else {
            self.mode
        }
    }

    /// Glitch-free output for the given candidate levels.
    ///
    /// Rising edges of the functional candidate also clock the scan-enable
    /// synchronizer with the asynchronous `scan_enable` input.
    pub fn observe(&mut self, candidates: ArbiterCandidates, scan_enable: bool) -> bool {
        if self.functional_edges.observe(candidates.functional) == Some(Edge::Rising) {
            self.scan_sync.sample(scan_enable);
        }
        self.tree
            .observe(candidates.as_array(), self.effective_mode().bits())
    }

    /// Plain combinational pick of the effective mode's candidate.
    #[must_use]
    pub fn pick_while_idle(&self, candidates: ArbiterCandidates) -> bool {
        select_while_idle(
            candidates.as_array(),
            usize::from(self.effective_mode().bits()),
        )
    }

    /// Last glitch-free output level.
    #[must_use]
    pub fn output(&self) -> bool {
        self.tree.output()
    }

    /// Scan enable after double-latching into the functional domain.
    #[must_use]
    pub fn scan_enable(&self) -> bool {
        self.scan_sync.output()
    }

    /// Decoded status outputs.
    #[must_use]
    pub fn status(&self) -> ArbiterStatus {
        let effective = self.effective_mode();
        ArbiterStatus {
            requested: self.mode,
            effective,
            is_test_mode: effective.is_test_mode(),
            bypass: self.bypass,
            scan_enable: self.scan_enable(),
            driving: self
                .tree
                .enabled_candidate()
                .and_then(|index| u8::try_from(index).ok())
                .map(ArbiterMode::from_bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArbiterCandidates, ArbiterMode, DomainArbiter};

    #[test]
    fn mode_decode_uses_low_two_bits() {
        assert_eq!(ArbiterMode::from_bits(0b110), ArbiterMode::ProtocolTest);
        for mode in ArbiterMode::ALL {
            assert_eq!(ArbiterMode::from_bits(mode.bits()), mode);
        }
    }

    #[test]
    fn scan_enable_needs_two_functional_rising_edges() {
        let mut arbiter = DomainArbiter::new();
        let high = ArbiterCandidates {
            functional: true,
            ..ArbiterCandidates::default()
        };
        let low = ArbiterCandidates::default();

        arbiter.observe(high, true);
        assert!(!arbiter.scan_enable());
        arbiter.observe(low, true);
        arbiter.observe(high, true);
        assert!(arbiter.scan_enable());
    }

    #[test]
    fn idle_pick_follows_effective_mode() {
        let mut arbiter = DomainArbiter::new();
        let candidates = ArbiterCandidates {
            protocol_test: true,
            ..ArbiterCandidates::default()
        };
        arbiter.set_mode(ArbiterMode::ProtocolTest);
        assert!(arbiter.pick_while_idle(candidates));
        arbiter.set_bypass(true);
        assert!(!arbiter.pick_while_idle(candidates));
        assert_eq!(arbiter.status().effective, ArbiterMode::Functional);
    }
}
