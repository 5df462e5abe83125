//! Refresh cycle task
//!
//! Polls the update cadence, borrows the gallery from the display task and
//! runs the retrieval engine over it.

use defmt::*;
use embassy_time::{Duration, Timer};

use stormframe_core::cadence::UpdateCadence;
use stormframe_core::config::{AppConfig, MAX_IMAGES};
use stormframe_core::retrieval::{
    CycleObserver, CycleOutcome, CycleReport, FeedOutcome, RetrievalEngine, SlotOutcome,
};
use stormframe_core::traits::WallClock;

use crate::channels::{Handback, GALLERY_BACK, GALLERY_OUT, GALLERY_REQUEST, ROTATION_ARM};
use crate::clock::UptimeClock;
use crate::net::http::ReqwlessTransport;

/// Logs cycle progress with the heap level at each download
struct LogObserver;

impl CycleObserver for LogObserver {
    fn feed_done(&mut self, outcome: &FeedOutcome) {
        match outcome {
            FeedOutcome::Parsed {
                urls,
                page_links,
                oversized_items,
                error,
            } => {
                info!("Feed: {} image URLs", urls);
                if *page_links > 0 {
                    debug!("Feed: {} items linked a page instead of an image", page_links);
                }
                if *oversized_items > 0 {
                    warn!("Feed: {} items skipped, description too large", oversized_items);
                }
                if let Some(e) = error {
                    warn!("Feed scan stopped early: {:?}", e);
                }
            }
            FeedOutcome::Unavailable(e) => warn!("Feed unavailable ({:?}); static images only", e),
        }
    }

    fn fetch_started(&mut self, index: usize, url: &str) {
        info!(
            "Slot {}: fetching {} (free heap {} bytes)",
            index,
            url,
            esp_alloc::HEAP.free()
        );
    }

    fn slot_done(&mut self, index: usize, outcome: &SlotOutcome) {
        match outcome {
            SlotOutcome::Inactive => {}
            SlotOutcome::Fetched { bytes } => debug!("Slot {}: {} bytes", index, bytes),
            SlotOutcome::FetchFailed(e) => warn!("Slot {}: fetch failed: {:?}", index, e),
            SlotOutcome::Decoded { warnings } => {
                for w in warnings {
                    warn!("Slot {}: {:?}", index, w);
                }
                info!("Slot {}: ready", index);
            }
            SlotOutcome::DecodeFailed(e) => warn!("Slot {}: decode failed: {:?}", index, e),
        }
    }
}

fn log_report(report: &CycleReport<MAX_IMAGES>) {
    info!(
        "Cycle sources: {} static, {} feed, {} dropped",
        report.static_sources, report.feed_sources, report.dropped_sources
    );
    match report.outcome {
        CycleOutcome::Ready { decoded } => info!("Cycle done: {} images ready", decoded),
        CycleOutcome::Placeholder => warn!("Cycle done: no images, showing placeholder"),
    }
}

/// Refresh cycle task
///
/// The first cycle runs immediately; later ones at the configured UTC times.
#[embassy_executor::task]
pub async fn update_task(http: ReqwlessTransport, config: &'static AppConfig) {
    info!("Update task started");

    let clock = UptimeClock;
    let mut engine = RetrievalEngine::new(http, clock, config);
    let mut cadence = UpdateCadence::new(&config.schedule.update_times);
    let poll = Duration::from_secs(config.schedule.poll_interval_s.into());

    clock
        .sync(engine.http(), &config.time_sync, config.time_sync.attempts)
        .await;

    loop {
        if let Some(reason) = cadence.check(clock.now_unix()) {
            info!("Refresh triggered: {:?}", reason);

            if !clock.is_synced() {
                clock.sync(engine.http(), &config.time_sync, 1).await;
            }

            GALLERY_REQUEST.signal(());
            let mut gallery = GALLERY_OUT.receive().await;

            let report = engine
                .run_cycle(gallery.begin_refresh(), &mut LogObserver)
                .await;
            log_report(&report);

            let ready = report.outcome.is_ready();
            GALLERY_BACK.send(Handback { gallery, ready }).await;
            if ready {
                ROTATION_ARM.signal(());
            }
        }

        Timer::after(poll).await;
    }
}
