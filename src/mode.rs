//! # Playback Mode
//!
//! The two playing styles of the synth are represented here, along with the edge flag of the mode-select button.
//!
//! - Glissando: the pitch slides continuously toward the last held key
//! - Arpeggiator: the pitch steps through every held key at a fixed tempo
//!
//! Each press of the mode-select button flips between the two. There is no terminal state.

/// The playback modes are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackMode {
    #[default]
    Glissando,
    Arpeggiator,
}

impl PlaybackMode {
    /// `m.toggled()` is the other mode
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::mode::PlaybackMode;
    ///
    /// let m = PlaybackMode::default();
    /// assert_eq!(m, PlaybackMode::Glissando);
    /// assert_eq!(m.toggled(), PlaybackMode::Arpeggiator);
    /// assert_eq!(m.toggled().toggled(), PlaybackMode::Glissando);
    /// ```
    pub const fn toggled(self) -> Self {
        match self {
            Self::Glissando => Self::Arpeggiator,
            Self::Arpeggiator => Self::Glissando,
        }
    }

    /// `m.is_arpeggiator()` is true iff `m` is the arpeggiator mode
    pub const fn is_arpeggiator(self) -> bool {
        matches!(self, Self::Arpeggiator)
    }
}

impl From<bool> for PlaybackMode {
    /// `true` is arpeggiator, `false` is glissando
    fn from(arpeggiator: bool) -> Self {
        if arpeggiator {
            Self::Arpeggiator
        } else {
            Self::Glissando
        }
    }
}

impl From<PlaybackMode> for bool {
    fn from(mode: PlaybackMode) -> Self {
        mode.is_arpeggiator()
    }
}

/// The latched edge-detect flag of the mode-select line is represented here
///
/// The edge interrupt may be shared with other pins, so the handler checks that this particular flag is set before
/// acting on it. The flag must be cleared exactly once per edge, or the same edge fires the interrupt again.
pub trait EdgeFlag {
    /// `ef.is_pending()` is true iff an edge has been latched and not yet acknowledged
    fn is_pending(&self) -> bool;

    /// `ef.acknowledge()` clears the latched edge
    fn acknowledge(&mut self);
}
