//! # Performance Parameters
//!
//! The two knob-controlled performance parameters are represented here.
//!
//! A single potentiometer sets both parameters at once:
//!
//! - `rate`: how many half-period counts the glissando slides per tick, in `[0, 15]`
//! - `tempo`: how many ticks the arpeggiator waits between notes, in `[12, 114]`
//!
//! Turning the knob up makes the glissando faster but the arpeggiator slower.

use crate::ADC_MAX;

/// The performance parameters derived from one potentiometer reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerformanceParams {
    /// Glissando slide amount per tick, in half-period counts
    pub rate: u8,
    /// Arpeggiator ticks per note
    pub tempo: u8,
}

impl PerformanceParams {
    /// `PerformanceParams::from_sample(s)` is the parameters derived from the raw 10 bit ADC sample `s`
    ///
    /// Bits above the tenth are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::params::PerformanceParams;
    ///
    /// let p = PerformanceParams::from_sample(512);
    /// assert_eq!(p.rate, 8);
    /// assert_eq!(p.tempo, 63);
    /// ```
    pub const fn from_sample(sample: u16) -> Self {
        let sample = sample & ADC_MAX;
        Self {
            rate: (sample / RATE_DIVISOR) as u8,
            tempo: (sample / TEMPO_DIVISOR + MIN_TEMPO) as u8,
        }
    }

    /// `p.to_bits()` is the params packed into one word, rate in the high byte and tempo in the low byte
    pub(crate) const fn to_bits(self) -> u16 {
        (self.rate as u16) << 8 | self.tempo as u16
    }

    /// `PerformanceParams::from_bits(b)` unpacks params packed with `to_bits`
    pub(crate) const fn from_bits(bits: u16) -> Self {
        Self {
            rate: (bits >> 8) as u8,
            tempo: bits as u8,
        }
    }
}

impl Default for PerformanceParams {
    /// The power-on params, used until the first conversion completes
    fn default() -> Self {
        Self {
            rate: 0,
            tempo: POWER_ON_TEMPO,
        }
    }
}

const RATE_DIVISOR: u16 = 64;
const TEMPO_DIVISOR: u16 = 10;

/// The fastest arpeggiator tempo the knob can select, in ticks per note
pub const MIN_TEMPO: u16 = 12;

/// The tempo before the knob has ever been read
pub const POWER_ON_TEMPO: u8 = 8;
