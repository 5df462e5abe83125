//! Rotation timer task
//!
//! Idle until the first cycle produces an image. Every later successful
//! cycle restarts the interval so a fresh image gets its full display time.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

use crate::channels::{ROTATE, ROTATION_ARM};

#[embassy_executor::task]
pub async fn rotation_task(interval_ms: u32) {
    let interval = Duration::from_millis(interval_ms.into());

    ROTATION_ARM.wait().await;
    info!("Rotation armed, every {} ms", interval_ms);

    loop {
        match select(Timer::after(interval), ROTATION_ARM.wait()).await {
            Either::First(()) => ROTATE.signal(()),
            Either::Second(()) => debug!("Rotation interval restarted"),
        }
    }
}
