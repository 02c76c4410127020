//! # Active Notes
//!
//! The list of notes currently being held down is represented here.
//!
//! The list is rebuilt from scratch on every scan. Entries are kept in key order, not sorted by pitch, and there can
//! never be more entries than there are keys.

use heapless::Vec;

use crate::{
    keys::KeyStates,
    notes::{Key, NUM_KEYS},
};

/// The half-periods of the held down keys, in key order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveNotes {
    periods: Vec<u16, NUM_KEYS>,
}

impl ActiveNotes {
    /// `ActiveNotes::new()` is a new empty list of active notes
    pub fn new() -> Self {
        Self::default()
    }

    /// `an.rescan(ks)` replaces the contents of the list with the notes of the keys pressed in `ks`
    pub fn rescan(&mut self, keys: KeyStates) {
        self.periods.clear();
        keys.pressed().for_each(|k: Key| {
            // capacity equals the number of keys, this can't fail
            self.periods.push(k.half_period()).ok();
        });
    }

    /// `an.len()` is the number of active notes
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// `an.is_empty()` is true iff no keys are held down
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// `an.get(i)` is the half-period of the `i`th active note, if there is one
    pub fn get(&self, idx: usize) -> Option<u16> {
        self.periods.get(idx).copied()
    }

    /// `an.last()` is the half-period of the last held key in scan order, the glissando target
    ///
    /// Note that this is not necessarily the highest pitch held, just the held key furthest along in key order.
    pub fn last(&self) -> Option<u16> {
        self.periods.last().copied()
    }

    /// `an.as_slice()` is the active notes as a slice
    pub fn as_slice(&self) -> &[u16] {
        &self.periods
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ActiveNotes {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u16]}", self.as_slice())
    }
}
