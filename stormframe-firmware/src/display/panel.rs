//! 800x480 RGB panel over the LCD_CAM DPI peripheral
//!
//! The frame buffer lives in PSRAM and is scanned out continuously. Redraws
//! stop the scan, paint, and restart it.

use alloc::boxed::Box;
use alloc::vec;

use defmt::*;
use esp_hal::dma::{DmaDescriptor, DmaTxBuf, CHUNK_SIZE};
use esp_hal::gpio::Level;
use esp_hal::lcd_cam::lcd::dpi::{Config as DpiConfig, Dpi, DpiTransfer, Format, FrameTiming};
use esp_hal::lcd_cam::lcd::{ClockMode, Phase, Polarity};
use esp_hal::time::Rate;
use esp_hal::Blocking;
use static_cell::StaticCell;

use super::painter::{Canvas, FRAME_BYTES, HEIGHT, WIDTH};

const NUM_DMA_DESC: usize = FRAME_BYTES.div_ceil(CHUNK_SIZE);

static DESCRIPTORS: StaticCell<[DmaDescriptor; NUM_DMA_DESC]> = StaticCell::new();

/// Panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum PanelError {
    /// Frame buffer could not be set up for DMA
    Buffer,
    /// DMA refused the transfer; the panel stays dark until the next redraw
    Dma,
}

/// Timing for the 7" 800x480 RGB565 panel
pub fn dpi_config() -> DpiConfig {
    DpiConfig::default()
        .with_clock_mode(ClockMode {
            polarity: Polarity::IdleLow,
            phase: Phase::ShiftHigh,
        })
        .with_frequency(Rate::from_mhz(16))
        .with_format(Format {
            enable_2byte_mode: true,
            ..Default::default()
        })
        .with_timing(FrameTiming {
            horizontal_active_width: WIDTH,
            vertical_active_height: HEIGHT,
            // 4 sync + 8 back porch + 8 front porch
            horizontal_total_width: WIDTH + 20,
            horizontal_blank_front_porch: 12,
            vertical_total_height: HEIGHT + 20,
            vertical_blank_front_porch: 12,
            hsync_width: 4,
            vsync_width: 4,
            hsync_position: 0,
        })
        .with_vsync_idle_level(Level::High)
        .with_hsync_idle_level(Level::High)
        .with_de_idle_level(Level::Low)
        .with_disable_black_region(false)
}

enum Scan {
    Idle(Dpi<'static, Blocking>, DmaTxBuf),
    Running(DpiTransfer<'static, DmaTxBuf, Blocking>),
}

pub struct Panel {
    scan: Option<Scan>,
}

impl Panel {
    /// Allocate the frame buffer; the panel starts dark
    pub fn new(dpi: Dpi<'static, Blocking>) -> Result<Self, PanelError> {
        let descriptors = DESCRIPTORS.init([DmaDescriptor::EMPTY; NUM_DMA_DESC]);
        // Too large for internal RAM, so the allocator places it in PSRAM
        let buffer: &'static mut [u8] = Box::leak(vec![0u8; FRAME_BYTES].into_boxed_slice());
        let dma_tx = DmaTxBuf::new(descriptors, buffer).map_err(|e| {
            error!("Frame buffer rejected: {:?}", e);
            PanelError::Buffer
        })?;
        info!("Frame buffer: {}x{} RGB565, {} bytes", WIDTH, HEIGHT, FRAME_BYTES);
        Ok(Self {
            scan: Some(Scan::Idle(dpi, dma_tx)),
        })
    }

    /// Paint into the frame buffer and (re)start scan-out
    pub fn redraw(&mut self, paint: impl FnOnce(&mut Canvas<'_>)) -> Result<(), PanelError> {
        let (dpi, mut dma_tx) = match self.scan.take() {
            Some(Scan::Idle(dpi, dma_tx)) => (dpi, dma_tx),
            Some(Scan::Running(transfer)) => transfer.stop(),
            None => return Err(PanelError::Dma),
        };

        paint(&mut Canvas::new(dma_tx.as_mut_slice()));

        match dpi.send(true, dma_tx) {
            Ok(transfer) => {
                self.scan = Some(Scan::Running(transfer));
                Ok(())
            }
            Err((e, dpi, dma_tx)) => {
                error!("DMA send error: {:?}", e);
                self.scan = Some(Scan::Idle(dpi, dma_tx));
                Err(PanelError::Dma)
            }
        }
    }
}
