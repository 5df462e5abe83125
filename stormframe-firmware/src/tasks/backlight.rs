//! Backlight tasks
//!
//! Wake inputs (touch interrupt, motion sensor) raise [`WAKE`]; the backlight
//! task runs the inactivity policy and drives the enable pin.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use esp_hal::gpio::{Input, Output};

use stormframe_core::backlight::{BacklightAction, BacklightPolicy};
use stormframe_core::config::BacklightConfig;

use crate::channels::{BACKLIGHT_ON, WAKE};

/// Backlight power task
///
/// Without a wake source the backlight never turns off.
#[embassy_executor::task]
pub async fn backlight_task(mut pin: Output<'static>, config: BacklightConfig, has_wake_source: bool) {
    info!(
        "Backlight task started (timeout {} ms, wake source: {})",
        config.timeout_ms, has_wake_source
    );

    let mut policy = BacklightPolicy::new(config, has_wake_source);
    set_backlight(&mut pin, true);

    loop {
        let action = match policy.timer_ms() {
            Some(ms) => match select(Timer::after(Duration::from_millis(ms.into())), WAKE.wait()).await {
                Either::First(()) => policy.on_timeout(),
                Either::Second(()) => policy.on_wake(),
            },
            None => {
                WAKE.wait().await;
                policy.on_wake()
            }
        };

        match action {
            BacklightAction::TurnOn => {
                info!("Backlight on");
                set_backlight(&mut pin, true);
            }
            BacklightAction::TurnOff => {
                info!("Backlight off after inactivity");
                set_backlight(&mut pin, false);
            }
            BacklightAction::Rearm => {}
        }
    }
}

fn set_backlight(pin: &mut Output<'static>, on: bool) {
    BACKLIGHT_ON.lock(|state| state.set(on));
    if on {
        pin.set_high();
    } else {
        pin.set_low();
    }
}

/// Raise a wake event on every rising edge of `input`
#[embassy_executor::task(pool_size = 2)]
pub async fn wake_task(mut input: Input<'static>, source: &'static str) {
    info!("Wake source ready: {}", source);
    loop {
        input.wait_for_rising_edge().await;
        debug!("Wake from {}", source);
        WAKE.signal(());
        // Touch controllers pulse the line for every report
        Timer::after(Duration::from_millis(50)).await;
    }
}
