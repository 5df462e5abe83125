//! Wi-Fi station and IP stack
//!
//! The connection task keeps the station associated; the update task only
//! needs [`wait_for_ip`] before its first cycle.

pub mod http;

use defmt::*;
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState};

/// Pause between failed association attempts
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Keep the station connected, reconnecting after drops
#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    ssid: &'static str,
    password: &'static str,
) {
    info!("Connecting to {}...", ssid);
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("Wi-Fi disconnected");
            Timer::after(RETRY_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(ssid.into())
                    .with_password(password.into()),
            );
            if let Err(e) = controller.set_config(&client_config) {
                error!("Wi-Fi config rejected: {:?}", Debug2Format(&e));
                Timer::after(RETRY_DELAY).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                warn!("Wi-Fi start failed: {:?}", Debug2Format(&e));
                Timer::after(RETRY_DELAY).await;
                continue;
            }
            info!("Wi-Fi started");
        }

        match controller.connect_async().await {
            Ok(()) => info!("Wi-Fi connected"),
            Err(e) => {
                warn!("Failed to connect: {:?}, retrying...", Debug2Format(&e));
                Timer::after(RETRY_DELAY).await;
            }
        }
    }
}

/// Drive the embassy-net stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Wait for link and a DHCP lease
pub async fn wait_for_ip(stack: Stack<'static>) {
    info!("Waiting for link...");
    while !stack.is_link_up() {
        Timer::after(Duration::from_millis(500)).await;
    }
    info!("Link up");

    info!("Waiting for IP...");
    loop {
        if let Some(config) = stack.config_v4() {
            info!("Got IP: {}", config.address);
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
