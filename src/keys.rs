//! # Keys
//!
//! Reading the six note keys is represented here.
//!
//! The keys are momentary pushbuttons wired active-low: a pulled-up input reads high while the button is up and low
//! while it is pressed. Keys are sampled, not latched, so only the state at the instant of the scan matters.

use embedded_hal::digital::v2::InputPin;

use crate::notes::{Key, NUM_KEYS};

/// A snapshot of which keys are held down at one instant is represented here
///
/// The keys are stored as an integer bitfield, bit `n` is set iff the key with index `n` is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStates(u8);

impl KeyStates {
    /// No keys pressed
    pub const NONE: Self = Self(0);

    /// Every key pressed
    pub const ALL: Self = Self(ALL_KEYS_MASK);

    /// `KeyStates::from_bits(b)` is the set of keys whose bits are set in `b`, bits above the sixth are ignored
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & ALL_KEYS_MASK)
    }

    /// `KeyStates::from_port(p)` is the set of keys pressed according to the raw 8 bit input port reading `p`
    ///
    /// The keys sit on port bits 2 through 7 in key order, and read low when pressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::{keys::KeyStates, notes::Key};
    ///
    /// // every line pulled high except bit 2, so only the first key is down
    /// let keys = KeyStates::from_port(0b1111_1011);
    /// assert!(keys.is_pressed(Key::Key1));
    /// assert_eq!(keys.count(), 1);
    /// ```
    pub const fn from_port(port_in: u8) -> Self {
        Self::from_bits(!port_in >> PORT_FIRST_KEY_BIT)
    }

    /// `ks.bits()` is the raw bitfield of pressed keys
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `ks.is_pressed(k)` is true iff key `k` is held down in this snapshot
    pub const fn is_pressed(self, key: Key) -> bool {
        (self.0 >> key.index()) & 1 == 1
    }

    /// `ks.press(k)` marks key `k` as held down
    pub fn press(&mut self, key: Key) {
        self.0 |= 1 << key.index();
    }

    /// `ks.release(k)` marks key `k` as released
    pub fn release(&mut self, key: Key) {
        self.0 &= !(1 << key.index());
    }

    /// `ks.count()` is the number of keys held down
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// `ks.pressed()` iterates over the keys held down, in scan order
    pub fn pressed(self) -> impl Iterator<Item = Key> {
        Key::ALL.into_iter().filter(move |k| self.is_pressed(*k))
    }
}

impl From<&[Key]> for KeyStates {
    fn from(keys: &[Key]) -> Self {
        let mut states = Self::NONE;
        keys.iter().for_each(|k| states.press(*k));
        states
    }
}

/// Something the scheduler can read the six keys from is represented here
pub trait KeyBank {
    /// `kb.read_keys()` is the set of keys held down right now
    fn read_keys(&self) -> KeyStates;
}

impl KeyBank for KeyStates {
    fn read_keys(&self) -> KeyStates {
        *self
    }
}

/// Six active-low input pins in key order form a key bank
///
/// A pin that fails to read is treated as released.
impl<P: InputPin> KeyBank for [P; NUM_KEYS] {
    fn read_keys(&self) -> KeyStates {
        let mut states = KeyStates::NONE;
        for (pin, key) in self.iter().zip(Key::ALL) {
            if pin.is_low().unwrap_or(false) {
                states.press(key);
            }
        }
        states
    }
}

const ALL_KEYS_MASK: u8 = (1 << NUM_KEYS) - 1;

// the first key is wired to port bit 2, bits 0 and 1 are the pot and the speaker
const PORT_FIRST_KEY_BIT: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct MockPin {
        level_high: bool,
    }

    impl InputPin for MockPin {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Self::Error> {
            Ok(self.level_high)
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            Ok(!self.level_high)
        }
    }

    struct BrokenPin;

    impl InputPin for BrokenPin {
        type Error = ();

        fn is_high(&self) -> Result<bool, Self::Error> {
            Err(())
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            Err(())
        }
    }

    fn pins(levels: [bool; NUM_KEYS]) -> [MockPin; NUM_KEYS] {
        levels.map(|level_high| MockPin { level_high })
    }

    #[test]
    fn all_pins_high_means_no_keys() {
        assert_eq!(pins([true; NUM_KEYS]).read_keys(), KeyStates::NONE);
    }

    #[test]
    fn low_pins_are_pressed_keys() {
        let keys = pins([true, false, true, true, false, true]).read_keys();
        assert!(keys.is_pressed(Key::Key2));
        assert!(keys.is_pressed(Key::Key5));
        assert_eq!(keys.count(), 2);
    }

    #[test]
    fn failed_reads_count_as_released() {
        let bank = [BrokenPin, BrokenPin, BrokenPin, BrokenPin, BrokenPin, BrokenPin];
        assert_eq!(bank.read_keys(), KeyStates::NONE);
    }

    #[test]
    fn port_with_all_lines_high_has_no_keys() {
        assert_eq!(KeyStates::from_port(0xFF), KeyStates::NONE);
    }

    #[test]
    fn port_ignores_pot_and_speaker_bits() {
        // bits 0 and 1 low, all key lines high
        assert_eq!(KeyStates::from_port(0b1111_1100), KeyStates::NONE);
    }

    #[test]
    fn port_with_all_lines_low_has_every_key() {
        assert_eq!(KeyStates::from_port(0x00), KeyStates::ALL);
    }

    #[test]
    fn port_bit_7_is_the_last_key() {
        let keys = KeyStates::from_port(0b0111_1111);
        assert_eq!(keys.pressed().collect::<heapless::Vec<Key, 6>>(), [Key::Key6]);
    }

    #[test]
    fn pressed_iterates_in_scan_order() {
        let keys = KeyStates::from(&[Key::Key4, Key::Key1, Key::Key3][..]);
        let pressed: heapless::Vec<Key, 6> = keys.pressed().collect();
        assert_eq!(pressed, [Key::Key1, Key::Key3, Key::Key4]);
    }

    #[test]
    fn press_and_release() {
        let mut keys = KeyStates::NONE;
        keys.press(Key::Key6);
        assert!(keys.is_pressed(Key::Key6));
        assert_eq!(keys.bits(), 1 << 5);
        keys.release(Key::Key6);
        assert!(!keys.is_pressed(Key::Key6));
    }

    #[test]
    fn from_bits_drops_high_bits() {
        assert_eq!(KeyStates::from_bits(0xFF), KeyStates::ALL);
        assert_eq!(KeyStates::from_bits(0xFF).bits(), 0b0011_1111);
    }
}
