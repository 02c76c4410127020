//! Play the pushbutton synth on a "blue pill" board
//!
//! Hardware setup:
//!
//! - Six momentary pushbuttons from PB10..PB15 to ground, these are the note keys E4, G, A, B, D, E5
//! - One momentary pushbutton from PB1 to ground, this is the mode-select button
//! - A potentiometer wired as a voltage divider between 3.3V and ground, wiper to PA0
//! - A small speaker or piezo on PA6, through a series resistor
//!
//! Hold some keys and wiggle the knob. The synth starts in glissando mode, the pitch slides toward the last held key
//! and the knob sets how fast it slides. Press the mode button to switch to the arpeggiator, now the held keys are
//! played in turn and the knob sets the tempo.
//!
//! Everything happens in interrupts, the main loop just sleeps:
//!
//! - TIM2 ticks the scheduler at `TICK_RATE_HZ`, the highest priority
//! - ADC1_2 delivers the knob reading, the middle priority
//! - EXTI1 catches the mode button, the lowest priority
//!
//! TIM3 makes the square wave by toggling PA6 every time it counts up to the half-period, counting at 1MHz.
//!
//! Critical sections only guard the hand-off of peripherals between `main` and the handlers, the handlers themselves
//! run with interrupts enabled so the priorities above hold. Mode changes are logged over RTT.
//!
//! To flash:
//! $ cargo embed --example pushbutton_synth --chip stm32f103c8 --release

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m::{interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use panic_halt as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f1xx_hal::{
    adc::Adc,
    gpio::{gpiob::PB1, Edge, ErasedPin, ExtiPin, Input, PullUp},
    pac::{self, interrupt, Interrupt},
    prelude::*,
    timer::{CounterHz, Event, Timer},
};

use pushbutton_synth::{
    controls::Controls,
    mode::EdgeFlag,
    scheduler::{ConversionTrigger, Scheduler, ToneOutput},
    NUM_KEYS, TICK_RATE_HZ,
};

////////////////////////////////////////////////////////////////////////////////
//
// hardware glue
//
////////////////////////////////////////////////////////////////////////////////

/// TIM3 in output-compare toggle mode, the tone timer
struct Speaker(pac::TIM3);

impl Speaker {
    fn new(tim: pac::TIM3) -> Self {
        // 8MHz timer clock divided down to 1MHz, so half-periods count microseconds
        tim.psc.write(|w| w.psc().bits(7));
        tim.ccr1().write(|w| w.ccr().bits(0));
        tim.ccmr1_output().write(|w| w.oc1m().toggle());
        tim.ccer.write(|w| w.cc1e().set_bit());
        Self(tim)
    }
}

impl ToneOutput for Speaker {
    fn set_half_period(&mut self, half_period: u16) {
        if half_period == 0 {
            self.0.cr1.modify(|_, w| w.cen().clear_bit());
            return;
        }
        // the timer counts 0..=arr, so each level lasts half_period + 1 counts
        self.0.arr.write(|w| w.arr().bits(half_period));
        self.0.cr1.modify(|_, w| w.cen().set_bit());
    }
}

/// Starts conversions of the potentiometer
struct Pot;

impl ConversionTrigger for Pot {
    fn start_conversion(&mut self) {
        cortex_m::interrupt::free(|cs| {
            if let Some(adc) = ADC.borrow(cs).borrow().as_ref() {
                adc.cr2.modify(|_, w| w.swstart().set_bit());
            }
        });
    }
}

/// The mode-select button on PB1
struct ModeButton(PB1<Input<PullUp>>);

impl EdgeFlag for ModeButton {
    fn is_pending(&self) -> bool {
        self.0.check_interrupt()
    }

    fn acknowledge(&mut self) {
        self.0.clear_interrupt_pending_bit();
    }
}

type Keys = [ErasedPin<Input<PullUp>>; NUM_KEYS];

/// Everything the tick interrupt owns
struct TickContext {
    timer: CounterHz<pac::TIM2>,
    scheduler: Scheduler,
    keys: Keys,
    pot: Pot,
    speaker: Speaker,
}

////////////////////////////////////////////////////////////////////////////////
//
// shared state
//
////////////////////////////////////////////////////////////////////////////////

static CONTROLS: Controls = Controls::new();

static TICK: Mutex<RefCell<Option<TickContext>>> = Mutex::new(RefCell::new(None));
static ADC: Mutex<RefCell<Option<pac::ADC1>>> = Mutex::new(RefCell::new(None));
static MODE_BUTTON: Mutex<RefCell<Option<ModeButton>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    rtt_init_print!();

    ////////////////////////////////////////////////////////////////////////////
    //
    // general stm32 peripheral housekeeping
    //
    ////////////////////////////////////////////////////////////////////////////
    let mut cp = cortex_m::Peripherals::take().unwrap();
    let mut dp = pac::Peripherals::take().unwrap();
    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();
    let mut gpiob = dp.GPIOB.split();

    ////////////////////////////////////////////////////////////////////////////
    //
    // note keys, active low with pullups
    //
    ////////////////////////////////////////////////////////////////////////////
    let keys: Keys = [
        gpiob.pb10.into_pull_up_input(&mut gpiob.crh).erase(),
        gpiob.pb11.into_pull_up_input(&mut gpiob.crh).erase(),
        gpiob.pb12.into_pull_up_input(&mut gpiob.crh).erase(),
        gpiob.pb13.into_pull_up_input(&mut gpiob.crh).erase(),
        gpiob.pb14.into_pull_up_input(&mut gpiob.crh).erase(),
        gpiob.pb15.into_pull_up_input(&mut gpiob.crh).erase(),
    ];

    ////////////////////////////////////////////////////////////////////////////
    //
    // mode button, falling edge interrupt
    //
    ////////////////////////////////////////////////////////////////////////////
    let mut mode_pin = gpiob.pb1.into_pull_up_input(&mut gpiob.crl);
    mode_pin.make_interrupt_source(&mut afio);
    mode_pin.trigger_on_edge(&mut dp.EXTI, Edge::Falling);
    mode_pin.enable_interrupt(&mut dp.EXTI);

    ////////////////////////////////////////////////////////////////////////////
    //
    // potentiometer ADC, single software-triggered conversion with end-of-conversion interrupt
    //
    ////////////////////////////////////////////////////////////////////////////
    let _pot_pin = gpioa.pa0.into_analog(&mut gpioa.crl);
    // let the HAL power up and calibrate the ADC, then take it back to drive it from interrupts
    let adc1 = Adc::adc1(dp.ADC1, clocks).release();
    adc1.sqr3.write(|w| unsafe { w.sq1().bits(0) });
    adc1.smpr2.write(|w| w.smp0().cycles239_5());
    adc1.cr2
        .modify(|_, w| w.exttrig().set_bit().extsel().swstart().adon().set_bit());
    adc1.cr1.modify(|_, w| w.eocie().set_bit());

    ////////////////////////////////////////////////////////////////////////////
    //
    // speaker, TIM3 toggling PA6
    //
    ////////////////////////////////////////////////////////////////////////////
    let _speaker_pin = gpioa.pa6.into_alternate_push_pull(&mut gpioa.crl);
    let speaker = Speaker::new(Timer::new(dp.TIM3, &clocks).release());

    ////////////////////////////////////////////////////////////////////////////
    //
    // tick timer
    //
    ////////////////////////////////////////////////////////////////////////////
    let mut timer = dp.TIM2.counter_hz(&clocks);
    timer.start(TICK_RATE_HZ.Hz()).unwrap();
    timer.listen(Event::Update);

    cortex_m::interrupt::free(|cs| {
        TICK.borrow(cs).replace(Some(TickContext {
            timer,
            scheduler: Scheduler::new(),
            keys,
            pot: Pot,
            speaker,
        }));
        ADC.borrow(cs).replace(Some(adc1));
        MODE_BUTTON.borrow(cs).replace(Some(ModeButton(mode_pin)));
    });

    // lower numbers are more urgent, the tick must never wait on the others
    unsafe {
        cp.NVIC.set_priority(Interrupt::TIM2, 0x00);
        cp.NVIC.set_priority(Interrupt::ADC1_2, 0x40);
        cp.NVIC.set_priority(Interrupt::EXTI1, 0x80);
        NVIC::unmask(Interrupt::TIM2);
        NVIC::unmask(Interrupt::ADC1_2);
        NVIC::unmask(Interrupt::EXTI1);
    }

    rprintln!("pushbutton synth up, {:?} mode", CONTROLS.mode());

    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TIM2() {
    // only this handler ever uses the tick context, so move it out of the mutex on the first tick
    static mut CTX: Option<TickContext> = None;
    if CTX.is_none() {
        *CTX = cortex_m::interrupt::free(|cs| TICK.borrow(cs).replace(None));
    }
    let Some(ctx) = CTX.as_mut() else {
        return;
    };

    ctx.timer.clear_interrupt(Event::Update);
    ctx.scheduler
        .tick(&CONTROLS, &ctx.keys, &mut ctx.pot, &mut ctx.speaker);
}

#[interrupt]
fn ADC1_2() {
    // reading the data register clears the end-of-conversion flag, the core wants 10 bits not 12
    let sample = cortex_m::interrupt::free(|cs| {
        ADC.borrow(cs)
            .borrow()
            .as_ref()
            .map(|adc| adc.dr.read().data().bits() >> 2)
    });

    if let Some(sample) = sample {
        CONTROLS.on_conversion_complete(sample);
    }
}

#[interrupt]
fn EXTI1() {
    static mut BUTTON: Option<ModeButton> = None;
    if BUTTON.is_none() {
        *BUTTON = cortex_m::interrupt::free(|cs| MODE_BUTTON.borrow(cs).replace(None));
    }
    let Some(button) = BUTTON.as_mut() else {
        return;
    };

    let was = CONTROLS.mode();
    CONTROLS.on_mode_edge(button);
    if CONTROLS.mode() != was {
        rprintln!("mode: {:?}", CONTROLS.mode());
    }
}
