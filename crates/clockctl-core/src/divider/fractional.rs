use crate::ConfigError;

/// Fractional division ratio `N + F/16`, packed as the byte `{N, F}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct FractionalRatio {
    integer: u8,
    fraction: u8,
}

impl FractionalRatio {
    /// Builds a ratio from its integer and sixteenths parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroFractionalRatio`] when `integer == 0` and
    /// [`ConfigError::FractionalRatioOutOfRange`] when a part exceeds 4 bits.
    pub const fn new(integer: u8, fraction: u8) -> Result<Self, ConfigError> {
        if integer > 0x0F || fraction > 0x0F {
            return Err(ConfigError::FractionalRatioOutOfRange);
        }
        if integer == 0 {
            return Err(ConfigError::ZeroFractionalRatio);
        }
        Ok(Self { integer, fraction })
    }

    /// Decodes the packed ratio byte (`0x38` is 3.5).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroFractionalRatio`] when the high nibble is 0.
    pub const fn from_byte(byte: u8) -> Result<Self, ConfigError> {
        Self::new(byte >> 4, byte & 0x0F)
    }

    /// Packed ratio byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        (self.integer << 4) | self.fraction
    }

    /// Integer part `N`.
    #[must_use]
    pub const fn integer(self) -> u8 {
        self.integer
    }

    /// Fractional part `F`, in sixteenths.
    #[must_use]
    pub const fn fraction(self) -> u8 {
        self.fraction
    }

    /// Long-run average half-period, in sixteenths of a source tick.
    #[must_use]
    pub const fn average_half_period_sixteenths(self) -> u32 {
        self.integer as u32 * 16 + self.fraction as u32
    }
}

impl TryFrom<u8> for FractionalRatio {
    type Error = ConfigError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte)
    }
}

impl From<FractionalRatio> for u8 {
    fn from(ratio: FractionalRatio) -> Self {
        ratio.as_byte()
    }
}

/// Sigma-delta fractional divider.
///
/// Each output half-period lasts `N` or `N+1` source ticks. The 4-bit
/// accumulator gains `F` once per output period, on the transition out of
/// the low phase; a carry out of bit 3 stretches both halves of the coming
/// period to `N+1` ticks. Over any 16 periods exactly `F` carries occur, so
/// the average half-period is exactly `N + F/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FractionalDivider {
    ratio: FractionalRatio,
    accumulator: u8,
    count: u8,
    half_period: u8,
    output: bool,
}

impl FractionalDivider {
    /// Creates a divider at the start of its first low phase.
    #[must_use]
    pub const fn new(ratio: FractionalRatio) -> Self {
        Self {
            ratio,
            accumulator: 0,
            count: 0,
            half_period: ratio.integer,
            output: false,
        }
    }

    /// Configured ratio.
    #[must_use]
    pub const fn ratio(&self) -> FractionalRatio {
        self.ratio
    }

    /// Current accumulator value (low 4 bits).
    #[must_use]
    pub const fn accumulator(&self) -> u8 {
        self.accumulator
    }

    /// Current divided output level.
    #[must_use]
    pub const fn output(&self) -> bool {
        self.output
    }

    /// Reacts to one rising edge of the source domain.
    ///
    /// While `enable` is low the divider returns to its initial state and the
    /// output stays low.
    pub const fn tick(&mut self, enable: bool) -> bool {
        if !enable {
            *self = Self::new(self.ratio);
            return false;
        }
        self.count += 1;
        if self.count >= self.half_period {
            self.count = 0;
            if !self.output {
                let sum = self.accumulator + self.ratio.fraction;
                self.accumulator = sum & 0x0F;
                self.half_period = if sum > 0x0F {
                    self.ratio.integer + 1
                } else {
                    self.ratio.integer
                };
            }
            self.output = !self.output;
        }
        self.output
    }
}
