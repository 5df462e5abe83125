//! Stormframe - Weather Hazard Image Display Firmware
//!
//! Fetches storm graphics from a public feed, has a conversion service turn
//! them into raw pixel containers, and rotates them on an 800x480 RGB panel
//! driven by an ESP32-S3 with PSRAM.
//!
//! Board wiring (7" ESP32-S3 RGB panel board):
//! - RGB565 data on 16 lines, HSYNC 46, VSYNC 3, DE 5, PCLK 7
//! - Touch controller interrupt on GPIO4
//! - Backlight enable on GPIO6
//! - Optional PIR motion sensor on GPIO15

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::lcd_cam::lcd::dpi::Dpi;
use esp_hal::lcd_cam::LcdCam;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use esp_radio::Controller;
use static_cell::StaticCell;

use stormframe_core::config::AppConfig;

use crate::display::{dpi_config, Panel};
use crate::net::http::ReqwlessTransport;

mod channels;
mod clock;
mod config;
mod display;
mod net;
mod tasks;

esp_bootloader_esp_idf::esp_app_desc!();

/// Wi-Fi credentials, provided at build time
const WIFI_SSID: &str = env!("WIFI_SSID");
const WIFI_PASS: &str = env!("WIFI_PASS");

// Static cells for state that tasks borrow forever
static CONFIG: StaticCell<AppConfig> = StaticCell::new();
static RADIO: StaticCell<Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// Main entry point
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    info!("Stormframe firmware starting...");

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    // Internal RAM for the radio, PSRAM for frame and image buffers
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 64 * 1024);
    esp_alloc::psram_allocator!(&peripherals.PSRAM, esp_hal::psram);
    info!("Heap ready, {} bytes free", esp_alloc::HEAP.free());

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config: &'static AppConfig = CONFIG.init(config::load());

    // Panel
    let lcd_cam = LcdCam::new(peripherals.LCD_CAM);
    let dpi = Dpi::new(lcd_cam.lcd, peripherals.DMA_CH2, dpi_config())
        .unwrap()
        .with_hsync(peripherals.GPIO46)
        .with_vsync(peripherals.GPIO3)
        .with_de(peripherals.GPIO5)
        .with_pclk(peripherals.GPIO7)
        // Blue
        .with_data0(peripherals.GPIO14)
        .with_data1(peripherals.GPIO38)
        .with_data2(peripherals.GPIO18)
        .with_data3(peripherals.GPIO17)
        .with_data4(peripherals.GPIO10)
        // Green
        .with_data5(peripherals.GPIO39)
        .with_data6(peripherals.GPIO0)
        .with_data7(peripherals.GPIO45)
        .with_data8(peripherals.GPIO48)
        .with_data9(peripherals.GPIO47)
        .with_data10(peripherals.GPIO21)
        // Red
        .with_data11(peripherals.GPIO1)
        .with_data12(peripherals.GPIO2)
        .with_data13(peripherals.GPIO42)
        .with_data14(peripherals.GPIO41)
        .with_data15(peripherals.GPIO40);
    let panel = Panel::new(dpi).unwrap();

    spawner.spawn(tasks::display_task(panel, config)).unwrap();
    spawner
        .spawn(tasks::rotation_task(config.schedule.rotation_interval_ms))
        .unwrap();

    // Backlight and wake inputs
    let backlight = Output::new(peripherals.GPIO6, Level::High, OutputConfig::default());
    let touch_int = Input::new(peripherals.GPIO4, InputConfig::default().with_pull(Pull::Up));
    let motion = Input::new(peripherals.GPIO15, InputConfig::default().with_pull(Pull::Down));
    spawner.spawn(tasks::wake_task(touch_int, "touch")).unwrap();
    spawner.spawn(tasks::wake_task(motion, "motion")).unwrap();
    spawner
        .spawn(tasks::backlight_task(backlight, config.backlight, true))
        .unwrap();

    // Wi-Fi
    let radio = RADIO.init(esp_radio::init().unwrap());
    let (controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()).unwrap();

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner
        .spawn(net::connection_task(controller, WIFI_SSID, WIFI_PASS))
        .unwrap();
    spawner.spawn(net::net_task(runner)).unwrap();

    net::wait_for_ip(stack).await;
    Timer::after(Duration::from_millis(config.schedule.network_settle_ms.into())).await;

    let http = ReqwlessTransport::new(stack, rng);
    spawner.spawn(tasks::update_task(http, config)).unwrap();

    info!("All tasks spawned");
    loop {
        Timer::after(Duration::from_secs(60)).await;
        debug!("Free heap: {} bytes", esp_alloc::HEAP.free());
    }
}
