//! # Controls
//!
//! The state shared between interrupt handlers is represented here.
//!
//! Two handlers write to the controls and one reads them:
//!
//! - the ADC conversion-complete handler writes the performance params
//! - the mode-select edge handler writes the playback mode
//! - the tick handler reads both
//!
//! Every field is a single machine word, written with one store and read with one load, so a handler interrupted by
//! a higher priority handler never sees half of an update. Only plain loads and stores are used, no read-modify-write,
//! so the controls work on cores without compare-and-swap.
//!
//! The controls are meant to live in a `static` and be handed to each handler by shared reference.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::{
    mode::{EdgeFlag, PlaybackMode},
    params::{PerformanceParams, POWER_ON_TEMPO},
};

/// The shared controls are represented here
pub struct Controls {
    // rate and tempo packed into one word so they always change together
    params: AtomicU16,

    // true means arpeggiator
    arpeggiator: AtomicBool,
}

impl Controls {
    /// `Controls::new()` is a new set of controls in the power-on state, glissando mode with default params
    ///
    /// Usable in a `static` initializer.
    pub const fn new() -> Self {
        Self {
            params: AtomicU16::new(
                PerformanceParams {
                    rate: 0,
                    tempo: POWER_ON_TEMPO,
                }
                .to_bits(),
            ),
            arpeggiator: AtomicBool::new(false),
        }
    }

    /// `c.on_conversion_complete(s)` derives new performance params from the finished ADC sample `s`
    ///
    /// Meant to be called from the conversion-complete interrupt. The new params are only picked up on the next tick.
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::controls::Controls;
    ///
    /// static CONTROLS: Controls = Controls::new();
    ///
    /// CONTROLS.on_conversion_complete(1023);
    /// assert_eq!(CONTROLS.params().rate, 15);
    /// assert_eq!(CONTROLS.params().tempo, 114);
    /// ```
    pub fn on_conversion_complete(&self, sample: u16) {
        self.set_params(PerformanceParams::from_sample(sample));
    }

    /// `c.on_mode_edge(ef)` flips the playback mode if the mode-select edge flag `ef` is pending
    ///
    /// Meant to be called from the edge interrupt. The flag is acknowledged exactly once. If the flag is not pending
    /// nothing happens, the interrupt was raised by some other pin.
    ///
    /// Switching modes leaves everything else alone, the scheduler carries its cursor, countdown, and output period
    /// over into the new mode.
    pub fn on_mode_edge<E: EdgeFlag>(&self, edge: &mut E) {
        if edge.is_pending() {
            self.set_mode(self.mode().toggled());
            edge.acknowledge();
        }
    }

    /// `c.params()` is the current performance params
    pub fn params(&self) -> PerformanceParams {
        PerformanceParams::from_bits(self.params.load(Ordering::Relaxed))
    }

    /// `c.set_params(p)` replaces the performance params with `p`
    pub fn set_params(&self, params: PerformanceParams) {
        self.params.store(params.to_bits(), Ordering::Relaxed);
    }

    /// `c.mode()` is the current playback mode
    pub fn mode(&self) -> PlaybackMode {
        self.arpeggiator.load(Ordering::Relaxed).into()
    }

    /// `c.set_mode(m)` sets the playback mode to `m`
    pub fn set_mode(&self, mode: PlaybackMode) {
        self.arpeggiator.store(mode.into(), Ordering::Relaxed);
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}
