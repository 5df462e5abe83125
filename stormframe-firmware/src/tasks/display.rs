//! Display task
//!
//! Owns the gallery between refresh cycles and paints whatever the rotation
//! selects.

use alloc::boxed::Box;

use defmt::*;
use embassy_futures::select::{select, Either};

use stormframe_core::config::AppConfig;
use stormframe_core::rotation::Selection;
use stormframe_core::traits::WallClock;

use crate::channels::{backlight_is_on, FrameGallery, GALLERY_BACK, GALLERY_OUT, GALLERY_REQUEST, ROTATE};
use crate::clock::UptimeClock;
use crate::display::{paint_frame, paint_message, Panel};

/// Shown until the first cycle finishes
const LOADING_TEXT: &str = "Loading hurricane data...";

#[embassy_executor::task]
pub async fn display_task(mut panel: Panel, config: &'static AppConfig) {
    info!("Display task started");

    let big_endian = config.conversion.big_endian;
    let mut gallery = Box::new(FrameGallery::new());

    if panel.redraw(|canvas| paint_message(canvas, LOADING_TEXT)).is_err() {
        warn!("Loading screen not shown");
    }

    loop {
        match select(ROTATE.wait(), GALLERY_REQUEST.wait()).await {
            // A dark panel keeps its cursor moving without redrawing
            Either::First(()) if !backlight_is_on() => gallery.advance(),
            Either::First(()) => show_next(&mut panel, &mut gallery, big_endian),
            Either::Second(()) => {
                debug!("Handing gallery to update task");
                GALLERY_OUT.send(gallery).await;
                let handback = GALLERY_BACK.receive().await;
                gallery = handback.gallery;

                // Ticks that arrived mid-cycle refer to the old contents
                ROTATE.reset();
                if !handback.ready || !gallery.has_images() {
                    warn!("No images available");
                }
                show_next(&mut panel, &mut gallery, big_endian);
            }
        }
    }
}

/// Paint the frame at the rotation cursor, then step past it
fn show_next(panel: &mut Panel, gallery: &mut FrameGallery, big_endian: bool) {
    {
        let (selection, frame) = gallery.current_frame();
        match selection {
            Selection::Slot(index) => info!("Showing slot {}: {}", index, frame.name),
            Selection::Placeholder => info!("Showing placeholder"),
        }

        let caption = frame.caption(UptimeClock.now_unix());
        if let Err(e) = panel.redraw(|canvas| paint_frame(canvas, &frame, &caption, big_endian)) {
            warn!("Redraw failed: {:?}", e);
        }
    }
    gallery.advance();
}
