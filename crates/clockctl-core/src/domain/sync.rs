/// Chain of sampling stages that admits a foreign-domain value into the
/// domain that clocks [`Synchronizer::sample`].
///
/// The first stage is the only register allowed to read a foreign value;
/// every later stage reads its predecessor. Latency is `STAGES` ticks of the
/// sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synchronizer<T: Copy + Default, const STAGES: usize = 2> {
    stages: [T; STAGES],
}

impl<T: Copy + Default, const STAGES: usize> Default for Synchronizer<T, STAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const STAGES: usize> Synchronizer<T, STAGES> {
    const DEPTH_CHECK: () = assert!(STAGES >= 2, "a synchronizer needs at least two stages");

    /// Creates a synchronizer with every stage at the default value.
    #[must_use]
    pub fn new() -> Self {
        let () = Self::DEPTH_CHECK;
        Self {
            stages: [T::default(); STAGES],
        }
    }

    /// Clocks the chain once, capturing `foreign` in the first stage.
    ///
    /// Returns the new output (last stage).
    pub fn sample(&mut self, foreign: T) -> T {
        self.stages.copy_within(0..STAGES - 1, 1);
        self.stages[0] = foreign;
        self.output()
    }

    /// Returns the synchronized value (last stage).
    #[must_use]
    pub fn output(&self) -> T {
        self.stages[STAGES - 1]
    }

    /// Returns every stage, first stage first.
    #[must_use]
    pub const fn stages(&self) -> &[T; STAGES] {
        &self.stages
    }

    /// Forces every stage back to the default value.
    pub fn clear(&mut self) {
        self.stages = [T::default(); STAGES];
    }
}

impl<const STAGES: usize> Synchronizer<bool, STAGES> {
    /// Returns `true` while any stage still holds an asserted value.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.stages.iter().any(|stage| *stage)
    }
}

/// Turns a level into edges by remembering the previously observed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeDetector {
    last: bool,
}

impl EdgeDetector {
    /// Observes a level and reports the transition since the last call.
    pub fn observe(&mut self, level: bool) -> Option<crate::Edge> {
        let previous = std::mem::replace(&mut self.last, level);
        match (previous, level) {
            (false, true) => Some(crate::Edge::Rising),
            (true, false) => Some(crate::Edge::Falling),
            _ => None,
        }
    }

    /// Last observed level.
    #[must_use]
    pub const fn level(&self) -> bool {
        self.last
    }
}
