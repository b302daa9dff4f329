//! Glitch-free and plain source selectors.
//!
//! The glitch-free selector hands the output from one candidate stream to
//! another without ever enabling two candidates at once and without cutting
//! a high phase short. Each candidate owns a two-stage synchronizer clocked
//! on its *own* falling edge:
//!
//! ```text
//!   stage1(i) <= requested(i) & !active(other)     (on falling edge of i)
//!   stage2(i) <= stage1(i)                          (on falling edge of i)
//!   enable(i)  = stage2(i)
//!   output     = OR over i of (level(i) & enable(i))
//! ```
//!
//! `active(other)` is true while either stage of the other synchronizer is
//! set, so a candidate may only claim the output once the previous owner has
//! drained both stages. Enables only change while their own candidate is
//! low, so no output pulse is ever split between two candidates.

use log::debug;

use crate::Synchronizer;

/// Two-input glitch-free selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlitchFreeSelector {
    sync: [Synchronizer<bool>; 2],
    levels: [bool; 2],
    owner: Option<usize>,
    handovers: u32,
}

impl GlitchFreeSelector {
    /// Creates a selector with neither candidate enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the current candidate levels and the requested candidate.
    ///
    /// `select == false` requests candidate 0, `true` candidate 1. Falling
    /// edges since the previous call clock the owning synchronizers, in
    /// candidate order. Returns the output level.
    pub fn observe(&mut self, levels: [bool; 2], select: bool) -> bool {
        for index in 0..2 {
            let fell = self.levels[index] && !levels[index];
            self.levels[index] = levels[index];
            if fell {
                let requested = usize::from(select) == index;
                let other_active = self.sync[1 - index].any_active();
                self.sync[index].sample(requested && !other_active);
            }
        }
        self.track_owner();
        self.output()
    }

    fn track_owner(&mut self) {
        let owner = self.enabled_candidate();
        if owner != self.owner {
            if owner.is_some() {
                self.handovers = self.handovers.saturating_add(1);
            }
            debug!("selector owner {:?} -> {:?}", self.owner, owner);
            self.owner = owner;
        }
    }

    /// Current output level computed from the last observed levels.
    #[must_use]
    pub fn output(&self) -> bool {
        (0..2).any(|index| self.levels[index] && self.sync[index].output())
    }

    /// Enable flag of each candidate.
    #[must_use]
    pub fn enables(&self) -> [bool; 2] {
        [self.sync[0].output(), self.sync[1].output()]
    }

    /// Candidate currently allowed to drive the output, if any.
    #[must_use]
    pub fn enabled_candidate(&self) -> Option<usize> {
        self.enables().iter().position(|enabled| *enabled)
    }

    /// Number of times a candidate took ownership of the output.
    #[must_use]
    pub const fn handovers(&self) -> u32 {
        self.handovers
    }
}

/// Four-input glitch-free selector built as a tree of three binary ones.
///
/// Bit 0 of the select code picks within each pair (0/1 and 2/3), bit 1
/// picks between the two pair outputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlitchFreeSelector4 {
    pairs: [GlitchFreeSelector; 2],
    root: GlitchFreeSelector,
}

impl GlitchFreeSelector4 {
    /// Creates a tree with no candidate enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the four candidate levels and the 2-bit select code.
    pub fn observe(&mut self, levels: [bool; 4], select: u8) -> bool {
        let within_pair = select & 0b01 != 0;
        let between_pairs = select & 0b10 != 0;
        let low = self.pairs[0].observe([levels[0], levels[1]], within_pair);
        let high = self.pairs[1].observe([levels[2], levels[3]], within_pair);
        self.root.observe([low, high], between_pairs)
    }

    /// Current output level.
    #[must_use]
    pub fn output(&self) -> bool {
        self.root.output()
    }

    /// Effective enable of each of the four candidates.
    #[must_use]
    pub fn enables(&self) -> [bool; 4] {
        let root = self.root.enables();
        let low = self.pairs[0].enables();
        let high = self.pairs[1].enables();
        [
            root[0] && low[0],
            root[0] && low[1],
            root[1] && high[0],
            root[1] && high[1],
        ]
    }

    /// Candidate currently driving the output, if any.
    #[must_use]
    pub fn enabled_candidate(&self) -> Option<usize> {
        self.enables().iter().position(|enabled| *enabled)
    }
}

/// Plain combinational pick of `levels[index]`; unknown indices read low.
///
/// This is *not* glitch-free: switching `index` while the candidates run can
/// truncate a pulse or splice two candidates together. Only use it where the
/// select changes while every consumer is idle, for example under reset.
#[must_use]
pub fn select_while_idle<const N: usize>(levels: [bool; N], index: usize) -> bool {
    levels.get(index).copied().unwrap_or(false)
}
