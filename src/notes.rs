//! # Notes
//!
//! The six keys of the synth and the fixed pitches they play are represented here.
//!
//! Pitches are stored as half-periods, the number of tone-timer counts the output pin holds each logic level. The
//! tone timer toggles its output every time it counts up to the compare value, so a bigger half-period is a lower
//! note. With the tone timer clocked at [`TONE_TIMER_CLOCK_HZ`](crate::TONE_TIMER_CLOCK_HZ) the table below is an
//! E minor pentatonic scale from E4 up to E5.

/// Half-period of E4, about 330Hz
pub const E4: u16 = 1515;
/// Half-period of G4, about 392Hz
pub const G4: u16 = 1276;
/// Half-period of A4, about 440Hz
pub const A4: u16 = 1136;
/// Half-period of B4, about 494Hz
pub const B4: u16 = 1012;
/// Half-period of D5, about 586Hz
pub const D5: u16 = 852;
/// Half-period of E5, about 658Hz
pub const E5: u16 = 759;

/// The number of note keys
pub const NUM_KEYS: usize = 6;

/// The note table, indexed by key number
const NOTE_TABLE: [u16; NUM_KEYS] = [E4, G4, A4, B4, D5, E5];

/// The six note keys are represented here
///
/// Keys are always scanned in the order `Key1..Key6`, this order decides both the order of the active notes and
/// which note the glissando slides toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
}

impl Key {
    /// All keys in scan order
    pub const ALL: [Key; NUM_KEYS] = [
        Key::Key1,
        Key::Key2,
        Key::Key3,
        Key::Key4,
        Key::Key5,
        Key::Key6,
    ];

    /// `k.index()` is the zero-based position of key `k` in scan order
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `k.half_period()` is the half-period of the note played by key `k`
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::notes::{self, Key};
    ///
    /// assert_eq!(Key::Key1.half_period(), notes::E4);
    /// assert_eq!(Key::Key6.half_period(), notes::E5);
    /// ```
    pub const fn half_period(self) -> u16 {
        NOTE_TABLE[self.index()]
    }
}

/// `half_period_to_hz(p, clk)` is the frequency of the square wave made by a toggling timer with compare value `p`
///
/// The timer counts `0..=p`, so one half of the wave lasts `p + 1` counts of `clk`.
///
/// # Returns
///
/// * `None` when `p` is zero, which is the silent state
///
/// * `Some(f)` otherwise, in hertz rounded down
pub fn half_period_to_hz(half_period: u16, timer_clock_hz: u32) -> Option<u32> {
    if half_period == 0 {
        return None;
    }
    Some(timer_clock_hz / (2 * (half_period as u32 + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_the_scale_in_order() {
        let periods: [u16; NUM_KEYS] = Key::ALL.map(Key::half_period);
        assert_eq!(periods, [1515, 1276, 1136, 1012, 852, 759]);
    }

    #[test]
    fn scale_goes_up_in_pitch_with_key_order() {
        // higher pitch means shorter half-period
        for pair in Key::ALL.windows(2) {
            assert!(pair[1].half_period() < pair[0].half_period());
        }
    }

    #[test]
    fn key_index_matches_scan_position() {
        for (i, k) in Key::ALL.iter().enumerate() {
            assert_eq!(k.index(), i);
        }
    }

    #[test]
    fn zero_half_period_is_silent() {
        assert_eq!(half_period_to_hz(0, 1_000_000), None);
    }

    #[test]
    fn e4_is_about_330_hz() {
        assert_eq!(half_period_to_hz(E4, 1_000_000), Some(329));
    }

    #[test]
    fn a4_is_about_440_hz() {
        assert_eq!(half_period_to_hz(A4, 1_000_000), Some(439));
    }
}
