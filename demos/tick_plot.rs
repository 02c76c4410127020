//! Plot out the output half-period of the scheduler over a few seconds of playing in each mode
//!
//! Look in /images/ for the resulting plots.
//!
//! Requires plotters lib: https://docs.rs/plotters/latest/plotters/.

use plotters::prelude::*;
use pushbutton_synth::{
    keys::KeyStates,
    mode::PlaybackMode,
    notes::{self, Key},
    params::PerformanceParams,
    scheduler::Scheduler,
    TICK_RATE_HZ, TONE_TIMER_CLOCK_HZ,
};

const NUM_SECS_TO_PLOT: usize = 4;
const NUM_TICKS: usize = TICK_RATE_HZ as usize * NUM_SECS_TO_PLOT;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // hold E4, then add B4, then let go of everything, then hit E5 alone
    let mut mock_keys = [KeyStates::NONE; NUM_TICKS];
    mock_keys[50..300]
        .iter_mut()
        .for_each(|k| *k = KeyStates::from(&[Key::Key1][..]));
    mock_keys[300..550]
        .iter_mut()
        .for_each(|k| *k = KeyStates::from(&[Key::Key1, Key::Key4][..]));
    mock_keys[700..NUM_TICKS]
        .iter_mut()
        .for_each(|k| *k = KeyStates::from(&[Key::Key6][..]));

    // knob about two thirds of the way up
    let params = PerformanceParams::from_sample(700);

    plot(
        "images/glissando_example_plot_0.png",
        "Glissando",
        &mock_keys,
        PlaybackMode::Glissando,
        params,
    )?;

    // everything held down at the fastest tempo
    let all_keys = [KeyStates::ALL; NUM_TICKS];
    plot(
        "images/arpeggiator_example_plot_0.png",
        "Arpeggiator",
        &all_keys,
        PlaybackMode::Arpeggiator,
        PerformanceParams::from_sample(0),
    )?;

    Ok(())
}

fn plot(
    path: &str,
    caption: &str,
    keys: &[KeyStates],
    mode: PlaybackMode,
    params: PerformanceParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sched = Scheduler::new();

    let root = BitMapBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("Arial", 20).into_font())
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..NUM_SECS_TO_PLOT as f32, 0f32..(notes::E4 + 200) as f32)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Half-period")
        .draw()?;

    // plot out the target of the last held key
    chart
        .draw_series(LineSeries::new(
            keys.iter().enumerate().map(|(i, k)| {
                let target = k.pressed().last().map(Key::half_period).unwrap_or(0);
                (i as f32 / TICK_RATE_HZ as f32, target as f32)
            }),
            BLUE,
        ))?
        .label("Last held key")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    // plot out the scheduler output
    chart
        .draw_series(LineSeries::new(
            keys.iter().enumerate().map(|(i, k)| {
                let y = sched.advance(*k, mode, params);
                (i as f32 / TICK_RATE_HZ as f32, y as f32)
            }),
            RED,
        ))?
        .label("Output half-period")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;

    match notes::half_period_to_hz(sched.period(), TONE_TIMER_CLOCK_HZ) {
        Some(hz) => println!("{caption}: ends on {hz}Hz"),
        None => println!("{caption}: ends silent"),
    }

    Ok(())
}
