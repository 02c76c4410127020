//! # Input & Playback Scheduler
//!
//! The periodic heart of the synth is represented here. It is expected to be called from a fixed rate timer
//! interrupt, once per tick. Each tick it:
//!
//! - kicks off the next potentiometer conversion
//! - scans the six keys and rebuilds the list of active notes
//! - advances the output half-period according to the playback mode
//! - writes the half-period to the tone output
//!
//! ## Glissando
//!
//! The output slides toward the note of the last held key in scan order by `rate` counts per tick. There is no
//! clamping, so when `rate` does not evenly divide the distance the output overshoots and then hovers around the
//! target, which gives a slight warble. With no keys held the output keeps its last value, so the note rings on.
//!
//! ## Arpeggiator
//!
//! Every `tempo` ticks the output steps to the next held note, cycling through them in key order. With no keys held
//! the output goes silent on the next step.
//!
//! The conversion started at the top of a tick must finish well before the next tick, its result is only read then.

use crate::{
    active_notes::ActiveNotes,
    controls::Controls,
    keys::{KeyBank, KeyStates},
    mode::PlaybackMode,
    params::{PerformanceParams, POWER_ON_TEMPO},
};

/// Something that can start an ADC conversion of the potentiometer is represented here
///
/// The result is delivered later to [`Controls::on_conversion_complete`].
pub trait ConversionTrigger {
    /// `ct.start_conversion()` starts a single conversion and returns without waiting for it
    fn start_conversion(&mut self);
}

/// A square wave output with a settable half-period is represented here
pub trait ToneOutput {
    /// `to.set_half_period(p)` sets the half-period of the output square wave to `p` tone-timer counts
    ///
    /// A half-period of zero silences the output.
    fn set_half_period(&mut self, half_period: u16);
}

/// The input and playback scheduler is represented here
///
/// Everything in here belongs to the tick handler alone, nothing else reads or writes it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    active_notes: ActiveNotes,

    // index of the next note the arpeggiator will play
    cursor: usize,

    // ticks left until the next arpeggiator step
    countdown: u16,

    // the half-period being written to the tone output
    period: u16,
}

impl Scheduler {
    /// `Scheduler::new()` is a new scheduler in the power-on state, silent with no notes held
    pub fn new() -> Self {
        Self {
            active_notes: ActiveNotes::new(),
            cursor: 0,
            countdown: POWER_ON_TEMPO as u16,
            period: 0,
        }
    }

    /// `s.tick(c, k, a, o)` runs one tick of the scheduler
    ///
    /// # Arguments
    ///
    /// * `controls` - the shared params and mode, read once each
    ///
    /// * `keys` - the six note keys, read once
    ///
    /// * `adc` - the potentiometer ADC, a new conversion is started
    ///
    /// * `output` - the tone output, the new half-period is written to it
    ///
    /// # Examples
    ///
    /// ```
    /// use pushbutton_synth::{
    ///     controls::Controls,
    ///     keys::KeyStates,
    ///     notes::{self, Key},
    ///     scheduler::{ConversionTrigger, Scheduler, ToneOutput},
    /// };
    ///
    /// struct Adc;
    /// impl ConversionTrigger for Adc {
    ///     fn start_conversion(&mut self) {}
    /// }
    ///
    /// struct Speaker(u16);
    /// impl ToneOutput for Speaker {
    ///     fn set_half_period(&mut self, p: u16) {
    ///         self.0 = p;
    ///     }
    /// }
    ///
    /// let controls = Controls::new();
    /// controls.on_conversion_complete(704); // glide 11 counts per tick
    ///
    /// let mut sched = Scheduler::new();
    /// let keys = KeyStates::from(&[Key::Key6][..]);
    /// let mut speaker = Speaker(0);
    ///
    /// sched.tick(&controls, &keys, &mut Adc, &mut speaker);
    /// assert_eq!(speaker.0, 11);
    ///
    /// for _ in 0..100 {
    ///     sched.tick(&controls, &keys, &mut Adc, &mut speaker);
    /// }
    /// assert_eq!(speaker.0, notes::E5);
    /// ```
    pub fn tick<K, A, O>(&mut self, controls: &Controls, keys: &K, adc: &mut A, output: &mut O)
    where
        K: KeyBank,
        A: ConversionTrigger,
        O: ToneOutput,
    {
        adc.start_conversion();
        let period = self.advance(keys.read_keys(), controls.mode(), controls.params());
        output.set_half_period(period);
    }

    /// `s.advance(k, m, p)` is the new output half-period after advancing one tick with keys `k`, mode `m`, params `p`
    ///
    /// This is the hardware-free part of `tick`.
    pub fn advance(&mut self, keys: KeyStates, mode: PlaybackMode, params: PerformanceParams) -> u16 {
        self.scan(keys);

        match mode {
            PlaybackMode::Glissando => self.glide(params.rate),
            PlaybackMode::Arpeggiator => self.arpeggiate(params.tempo),
        }

        self.period
    }

    /// `s.scan(k)` rebuilds the active notes from keys `k`, restarting the arpeggio if the number of notes changed
    fn scan(&mut self, keys: KeyStates) {
        let last_len = self.active_notes.len();
        self.active_notes.rescan(keys);
        if self.active_notes.len() != last_len {
            self.cursor = 0;
        }
    }

    /// `s.glide(r)` slides the output `r` counts toward the last held note, without clamping
    fn glide(&mut self, rate: u8) {
        let Some(target) = self.active_notes.last() else {
            // nothing held, let the last note ring
            return;
        };

        let rate = rate as u16;
        if self.period < target {
            self.period = self.period.saturating_add(rate);
        } else if target < self.period {
            self.period = self.period.saturating_sub(rate);
        }
    }

    /// `s.arpeggiate(t)` counts down one tick and steps to the next held note every `t` ticks
    ///
    /// The countdown is checked after decrementing, so a step lands every `t` ticks rather than every `t + 1` as the
    /// MSP430 firmware's check-then-decrement countdown did.
    fn arpeggiate(&mut self, tempo: u8) {
        // saturating so a countdown already at zero fires right away instead of wrapping to a huge wait
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown != 0 {
            return;
        }
        self.countdown = tempo as u16;

        self.period = match self.active_notes.get(self.cursor) {
            Some(note) => {
                // non-empty here, so the modulo can't be by zero
                self.cursor = (self.cursor + 1) % self.active_notes.len();
                note
            }
            None => 0,
        };
    }

    /// `s.active_notes()` is the notes found on the last scan
    pub fn active_notes(&self) -> &ActiveNotes {
        &self.active_notes
    }

    /// `s.cursor()` is the index of the next note the arpeggiator will play
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// `s.countdown()` is the number of ticks until the next arpeggiator step
    pub fn countdown(&self) -> u16 {
        self.countdown
    }

    /// `s.period()` is the half-period most recently written to the tone output
    pub fn period(&self) -> u16 {
        self.period
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
