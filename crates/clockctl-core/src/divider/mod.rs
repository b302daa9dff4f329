//! Divider engine: power-of-two and sigma-delta fractional dividers.

/// Sigma-delta fractional divider.
pub mod fractional;
/// Power-of-two divider with 50% duty cycle.
pub mod integer;

pub use fractional::{FractionalDivider, FractionalRatio};
pub use integer::{IntegerDivider, IntegerRatio};

/// Divider configuration: which engine and which ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DividerConfig {
    /// Power-of-two division selected by a 2-bit code.
    Integer(IntegerRatio),
    /// Fractional division by `N + F/16` per half-period.
    Fractional(FractionalRatio),
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self::Integer(IntegerRatio::Div2)
    }
}

/// Either divider engine behind one tick interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    /// Power-of-two engine.
    Integer(IntegerDivider),
    /// Fractional engine.
    Fractional(FractionalDivider),
}

impl Divider {
    /// Builds the engine described by `config`.
    #[must_use]
    pub const fn new(config: DividerConfig) -> Self {
        match config {
            DividerConfig::Integer(ratio) => Self::Integer(IntegerDivider::new(ratio)),
            DividerConfig::Fractional(ratio) => Self::Fractional(FractionalDivider::new(ratio)),
        }
    }

    /// Configuration this engine was built from.
    #[must_use]
    pub const fn config(&self) -> DividerConfig {
        match self {
            Self::Integer(divider) => DividerConfig::Integer(divider.ratio()),
            Self::Fractional(divider) => DividerConfig::Fractional(divider.ratio()),
        }
    }

    /// Reacts to one rising edge of the source domain.
    pub const fn tick(&mut self, enable: bool) -> bool {
        match self {
            Self::Integer(divider) => divider.tick(enable),
            Self::Fractional(divider) => divider.tick(enable),
        }
    }

    /// Current divided output level.
    #[must_use]
    pub const fn output(&self) -> bool {
        match self {
            Self::Integer(divider) => divider.output(),
            Self::Fractional(divider) => divider.output(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Divider, DividerConfig, FractionalRatio, IntegerRatio};

    #[test]
    fn default_config_is_divide_by_two() {
        assert_eq!(
            DividerConfig::default(),
            DividerConfig::Integer(IntegerRatio::Div2)
        );
    }

    #[test]
    fn engine_reports_its_configuration() {
        let ratio = FractionalRatio::from_byte(0x28).expect("valid ratio");
        let divider = Divider::new(DividerConfig::Fractional(ratio));
        assert_eq!(divider.config(), DividerConfig::Fractional(ratio));
        assert!(!divider.output());
    }
}
