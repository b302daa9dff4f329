use crate::ConfigError;

/// Power-of-two division ratio selected by a 2-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum IntegerRatio {
    /// Code `00`: divide by 2.
    #[default]
    Div2 = 0,
    /// Code `01`: divide by 4.
    Div4 = 1,
    /// Code `10`: divide by 8.
    Div8 = 2,
    /// Code `11`: divide by 16.
    Div16 = 3,
}

impl IntegerRatio {
    /// Every ratio in code order.
    pub const ALL: [Self; 4] = [Self::Div2, Self::Div4, Self::Div8, Self::Div16];

    /// Decodes a 2-bit ratio select.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IntegerRatioOutOfRange`] for codes above 3.
    pub const fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(Self::Div2),
            1 => Ok(Self::Div4),
            2 => Ok(Self::Div8),
            3 => Ok(Self::Div16),
            _ => Err(ConfigError::IntegerRatioOutOfRange),
        }
    }

    /// Returns the 2-bit select code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Number of source ticks per output period.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        2 << self.code()
    }
}

/// Power-of-two divider with 50% duty cycle.
///
/// A 4-bit counter advances on every source tick while enabled. Counter bit
/// `k` toggles every `2^k` ticks, so it is the ÷`2^(k+1)` candidate; the
/// output is the candidate picked by the ratio code. The pick is plain
/// combinational logic: change the ratio only while the divider is disabled
/// or its consumers are idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegerDivider {
    ratio: IntegerRatio,
    counter: u8,
    enabled: bool,
}

impl IntegerDivider {
    /// Creates a disabled divider with the given ratio.
    #[must_use]
    pub const fn new(ratio: IntegerRatio) -> Self {
        Self {
            ratio,
            counter: 0,
            enabled: false,
        }
    }

    /// Selected ratio.
    #[must_use]
    pub const fn ratio(&self) -> IntegerRatio {
        self.ratio
    }

    /// Replaces the ratio select; only glitch-safe while idle.
    pub const fn set_ratio(&mut self, ratio: IntegerRatio) {
        self.ratio = ratio;
    }

    /// Reacts to one rising edge of the source domain.
    ///
    /// While `enable` is low the counter is held at zero and the output low.
    pub const fn tick(&mut self, enable: bool) -> bool {
        self.counter = if enable {
            (self.counter + 1) & 0x0F
        } else {
            0
        };
        self.enabled = enable;
        self.output()
    }

    /// All four divided candidates, ÷2 first.
    #[must_use]
    pub const fn candidates(&self) -> [bool; 4] {
        [
            self.enabled && self.counter & 0b0001 != 0,
            self.enabled && self.counter & 0b0010 != 0,
            self.enabled && self.counter & 0b0100 != 0,
            self.enabled && self.counter & 0b1000 != 0,
        ]
    }

    /// Current divided output level.
    #[must_use]
    pub const fn output(&self) -> bool {
        self.candidates()[self.ratio.code() as usize]
    }
}
