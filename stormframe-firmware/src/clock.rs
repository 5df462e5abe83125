//! Wall clock
//!
//! Unix time is kept as an offset from the embassy uptime counter, set once
//! a time document has been fetched.

use defmt::*;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::{AtomicI64, Ordering};

use stormframe_core::config::TimeSyncConfig;
use stormframe_core::timesync::fetch_unix_time;
use stormframe_core::traits::{HttpClient, WallClock};

/// Offset value meaning "never synchronized"
const UNSYNCED: i64 = i64::MIN;

/// Unix seconds minus uptime seconds
static EPOCH_OFFSET: AtomicI64 = AtomicI64::new(UNSYNCED);

/// UTC clock derived from uptime
#[derive(Clone, Copy, Default)]
pub struct UptimeClock;

impl UptimeClock {
    pub fn is_synced(&self) -> bool {
        EPOCH_OFFSET.load(Ordering::Relaxed) != UNSYNCED
    }

    fn set(&self, unix: i64) {
        let uptime = Instant::now().as_secs() as i64;
        EPOCH_OFFSET.store(unix - uptime, Ordering::Relaxed);
    }

    /// Fetch the time, up to `attempts` times
    pub async fn sync<H: HttpClient>(&self, http: &mut H, config: &TimeSyncConfig, attempts: u8) -> bool {
        for attempt in 1..=attempts {
            info!("Time sync attempt {}/{}", attempt, attempts);
            match fetch_unix_time(http, config).await {
                Ok(unix) => {
                    self.set(unix);
                    info!("Clock set to {}", unix);
                    return true;
                }
                Err(e) => warn!("Time sync failed: {:?}", e),
            }
            if attempt < attempts {
                Timer::after(Duration::from_millis(config.retry_delay_ms.into())).await;
            }
        }
        warn!("Clock still unsynchronized after {} attempts", attempts);
        false
    }
}

impl WallClock for UptimeClock {
    fn now_unix(&self) -> Option<i64> {
        let offset = EPOCH_OFFSET.load(Ordering::Relaxed);
        (offset != UNSYNCED).then(|| offset + Instant::now().as_secs() as i64)
    }
}
