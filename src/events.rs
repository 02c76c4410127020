//! # Events
//!
//! The interrupt driven structure of the synth is represented here.
//!
//! Three hardware events drive everything, each handled by exactly one handler:
//!
//! - `Tick`: the fixed rate timer fired, run the scheduler
//! - `ConversionComplete`: the potentiometer ADC finished, update the performance params
//! - `ModeEdge`: the mode-select line saw an edge, toggle the playback mode
//!
//! Handlers run to completion and are never re-entered. When several events are pending at once the one with the
//! highest [`priority`](Event::priority) is served first.
//!
//! Firmware with a real interrupt controller usually splits the handlers across separate interrupt functions,
//! sharing a `static` [`Controls`] and giving the [`Scheduler`] to the timer interrupt. [`Synth`] bundles everything
//! into one value for targets that poll events from a single context, and for testing.

use crate::{
    controls::Controls,
    keys::KeyBank,
    mode::EdgeFlag,
    scheduler::{ConversionTrigger, Scheduler, ToneOutput},
};

/// The hardware events the synth responds to are represented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The periodic tick timer fired
    Tick,
    /// An ADC conversion finished with the given raw 10 bit sample
    ConversionComplete(u16),
    /// The mode-select edge interrupt fired
    ModeEdge,
}

impl Event {
    /// `e.priority()` is the relative priority of event `e`, bigger numbers are served first
    ///
    /// The tick outranks the ADC, which outranks the mode button.
    pub const fn priority(self) -> u8 {
        match self {
            Event::Tick => 2,
            Event::ConversionComplete(_) => 1,
            Event::ModeEdge => 0,
        }
    }
}

/// A complete synth, the controls, the scheduler, and the hardware they talk to, is represented here
///
/// # Generic arguments:
///
/// * `K` - the six note keys
///
/// * `A` - the potentiometer ADC trigger
///
/// * `O` - the square wave tone output
///
/// * `E` - the mode-select edge flag
pub struct Synth<K, A, O, E> {
    controls: Controls,
    scheduler: Scheduler,
    keys: K,
    adc: A,
    output: O,
    mode_edge: E,
}

impl<K, A, O, E> Synth<K, A, O, E>
where
    K: KeyBank,
    A: ConversionTrigger,
    O: ToneOutput,
    E: EdgeFlag,
{
    /// `Synth::new(k, a, o, e)` is a new synth in the power-on state, using the given hardware
    pub fn new(keys: K, adc: A, output: O, mode_edge: E) -> Self {
        Self {
            controls: Controls::new(),
            scheduler: Scheduler::new(),
            keys,
            adc,
            output,
            mode_edge,
        }
    }

    /// `s.handle(e)` dispatches event `e` to its handler
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Tick => {
                self.scheduler
                    .tick(&self.controls, &self.keys, &mut self.adc, &mut self.output)
            }
            Event::ConversionComplete(sample) => self.controls.on_conversion_complete(sample),
            Event::ModeEdge => self.controls.on_mode_edge(&mut self.mode_edge),
        }
    }

    /// `s.handle_pending(es)` handles every event in `es`, highest priority first
    ///
    /// Events of equal priority are handled in the order given.
    pub fn handle_pending(&mut self, events: &[Event]) {
        for priority in (0..=Event::Tick.priority()).rev() {
            events
                .iter()
                .filter(|e| e.priority() == priority)
                .for_each(|e| self.handle(*e));
        }
    }

    /// `s.controls()` is the shared controls
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// `s.scheduler()` is the scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// `s.keys_mut()` is the note keys, mutably
    pub fn keys_mut(&mut self) -> &mut K {
        &mut self.keys
    }

    /// `s.adc()` is the ADC trigger
    pub fn adc(&self) -> &A {
        &self.adc
    }

    /// `s.output()` is the tone output
    pub fn output(&self) -> &O {
        &self.output
    }

    /// `s.mode_edge_mut()` is the mode-select edge flag, mutably
    pub fn mode_edge_mut(&mut self) -> &mut E {
        &mut self.mode_edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::KeyStates,
        mode::PlaybackMode,
        notes::{self, Key},
    };

    #[derive(Default)]
    struct Adc {
        starts: u32,
    }

    impl ConversionTrigger for Adc {
        fn start_conversion(&mut self) {
            self.starts += 1;
        }
    }

    #[derive(Default)]
    struct Speaker {
        half_period: u16,
    }

    impl ToneOutput for Speaker {
        fn set_half_period(&mut self, half_period: u16) {
            self.half_period = half_period;
        }
    }

    #[derive(Default)]
    struct Button {
        latched: bool,
    }

    impl EdgeFlag for Button {
        fn is_pending(&self) -> bool {
            self.latched
        }

        fn acknowledge(&mut self) {
            self.latched = false;
        }
    }

    type TestSynth = Synth<KeyStates, Adc, Speaker, Button>;

    fn synth() -> TestSynth {
        Synth::new(
            KeyStates::NONE,
            Adc::default(),
            Speaker::default(),
            Button::default(),
        )
    }

    fn press_mode_button(s: &mut TestSynth) {
        s.mode_edge_mut().latched = true;
        s.handle(Event::ModeEdge);
    }

    #[test]
    fn tick_outranks_adc_outranks_mode() {
        assert!(Event::Tick.priority() > Event::ConversionComplete(0).priority());
        assert!(Event::ConversionComplete(0).priority() > Event::ModeEdge.priority());
    }

    #[test]
    fn each_tick_requests_one_conversion() {
        let mut s = synth();
        for _ in 0..10 {
            s.handle(Event::Tick);
        }
        assert_eq!(s.adc().starts, 10);
    }

    #[test]
    fn conversion_feeds_the_next_tick() {
        let mut s = synth();
        *s.keys_mut() = KeyStates::from(&[Key::Key3][..]);

        s.handle(Event::Tick);
        assert_eq!(s.output().half_period, 0);

        s.handle(Event::ConversionComplete(64 * 4));
        // nothing is recomputed until the tick
        assert_eq!(s.output().half_period, 0);

        s.handle(Event::Tick);
        assert_eq!(s.output().half_period, 4);
    }

    #[test]
    fn mode_edge_switches_to_the_arpeggiator() {
        let mut s = synth();
        press_mode_button(&mut s);
        assert_eq!(s.controls().mode(), PlaybackMode::Arpeggiator);
        assert!(!s.mode_edge_mut().latched);

        // a second interrupt without a new edge changes nothing
        s.handle(Event::ModeEdge);
        assert_eq!(s.controls().mode(), PlaybackMode::Arpeggiator);

        press_mode_button(&mut s);
        assert_eq!(s.controls().mode(), PlaybackMode::Glissando);
    }

    #[test]
    fn full_performance() {
        let mut s = synth();

        // knob at zero, fastest arpeggio
        s.handle(Event::ConversionComplete(0));
        press_mode_button(&mut s);

        *s.keys_mut() = KeyStates::from(&[Key::Key1, Key::Key6][..]);
        while s.output().half_period == 0 {
            s.handle_pending(&[Event::ConversionComplete(0), Event::Tick]);
        }
        assert_eq!(s.output().half_period, notes::E4);

        for _ in 0..12 {
            s.handle(Event::Tick);
        }
        assert_eq!(s.output().half_period, notes::E5);

        // back to glissando, let go of E4 and the pitch holds at E5
        press_mode_button(&mut s);
        *s.keys_mut() = KeyStates::NONE;
        for _ in 0..50 {
            s.handle(Event::Tick);
        }
        assert_eq!(s.output().half_period, notes::E5);
        assert_eq!(s.scheduler().cursor(), 0);
    }

    #[test]
    fn pending_events_run_highest_priority_first() {
        let mut s = synth();
        *s.keys_mut() = KeyStates::from(&[Key::Key1][..]);

        // the tick runs before the conversion, so it still sees the old rate of zero
        s.handle_pending(&[Event::ConversionComplete(1023), Event::Tick]);
        assert_eq!(s.output().half_period, 0);

        s.handle(Event::Tick);
        assert_eq!(s.output().half_period, 15);
    }
}
