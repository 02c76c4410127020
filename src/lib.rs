#![no_std]
#![doc = include_str!("../README.md")]

pub mod active_notes;
pub mod controls;
pub mod events;
pub mod keys;
pub mod mode;
pub mod notes;
pub mod params;
pub mod scheduler;

pub use notes::NUM_KEYS;

/// The clock of the tone timer, the half-periods in [`notes`] are counts of this clock
///
/// An 8MHz system clock divided by 8.
pub const TONE_TIMER_CLOCK_HZ: u32 = 1_000_000;

/// The rate at which the scheduler is ticked, about 4ms per tick
///
/// An 8MHz system clock divided by 32768. The arpeggiator tempo is counted in these ticks.
pub const TICK_RATE_HZ: u32 = 244;

/// The biggest raw sample the 10 bit potentiometer ADC can produce
pub const ADC_MAX: u16 = (1 << 10) - 1;
