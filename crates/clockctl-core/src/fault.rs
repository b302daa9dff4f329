use thiserror::Error;

/// Configuration areas used to group rejected settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ConfigArea {
    /// Domain source periods and phases.
    Domain,
    /// Integer and fractional divider ratios.
    Divider,
    /// Self-test sequencer counter settings.
    SelfTest,
    /// Cross-domain queue geometry.
    Queue,
}

/// Stable taxonomy of configurations rejected at construction time.
///
/// Every component validates its configuration once, when it is built. The
/// per-tick reaction paths never fail: runtime hazards (queue overflow,
/// underflow, selector requests arriving faster than they settle) are local
/// no-ops and are only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ConfigError {
    /// Domain period too short to hold a high and a low phase.
    #[error("domain period must be at least 2 time units")]
    PeriodTooShort = 0x01,
    /// Domain identifier not registered with the scheduler.
    #[error("unknown domain identifier")]
    UnknownDomain = 0x02,
    /// Integer divider ratio select wider than 2 bits.
    #[error("integer ratio select must be in 0..=3")]
    IntegerRatioOutOfRange = 0x03,
    /// Fractional divider with a zero integer part.
    #[error("fractional ratio integer part must be at least 1")]
    ZeroFractionalRatio = 0x04,
    /// Fractional divider part wider than 4 bits.
    #[error("fractional ratio fields must each fit in 4 bits")]
    FractionalRatioOutOfRange = 0x05,
    /// Pattern counter width outside the supported range.
    #[error("pattern counter width must be in 1..=32 bits")]
    CounterWidthOutOfRange = 0x06,
    /// Maximum pattern count does not fit in the configured counter width.
    #[error("maximum pattern count exceeds the counter width")]
    MaxCountExceedsWidth = 0x07,
    /// Queue capacity is not a power of two.
    #[error("queue capacity must be a power of two")]
    CapacityNotPowerOfTwo = 0x08,
    /// Queue capacity below the two-entry minimum.
    #[error("queue capacity must be at least 2")]
    CapacityTooSmall = 0x09,
    /// Queue item width outside the supported range.
    #[error("queue data width must be in 1..=32 bits")]
    DataWidthOutOfRange = 0x0A,
}

impl ConfigError {
    /// Converts the error to its stable one-byte code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable one-byte code back into an error.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::PeriodTooShort),
            0x02 => Some(Self::UnknownDomain),
            0x03 => Some(Self::IntegerRatioOutOfRange),
            0x04 => Some(Self::ZeroFractionalRatio),
            0x05 => Some(Self::FractionalRatioOutOfRange),
            0x06 => Some(Self::CounterWidthOutOfRange),
            0x07 => Some(Self::MaxCountExceedsWidth),
            0x08 => Some(Self::CapacityNotPowerOfTwo),
            0x09 => Some(Self::CapacityTooSmall),
            0x0A => Some(Self::DataWidthOutOfRange),
            _ => None,
        }
    }

    /// Returns the configuration area this error belongs to.
    #[must_use]
    pub const fn area(self) -> ConfigArea {
        match self {
            Self::PeriodTooShort | Self::UnknownDomain => ConfigArea::Domain,
            Self::IntegerRatioOutOfRange
            | Self::ZeroFractionalRatio
            | Self::FractionalRatioOutOfRange => ConfigArea::Divider,
            Self::CounterWidthOutOfRange | Self::MaxCountExceedsWidth => ConfigArea::SelfTest,
            Self::CapacityNotPowerOfTwo | Self::CapacityTooSmall | Self::DataWidthOutOfRange => {
                ConfigArea::Queue
            }
        }
    }
}
