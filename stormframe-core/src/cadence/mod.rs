//! Update cadence
//!
//! Decides when a refresh cycle runs: once at startup, then whenever the UTC
//! wall clock reads exactly one of the configured `HH:MM` times. The caller
//! polls once per `poll_interval_s`; a missed minute is not caught up.

use chrono::{DateTime, Timelike};

use crate::config::UpdateTime;

/// Why a refresh was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshReason {
    /// First check after boot
    Startup,
    /// Wall clock matched a configured time
    Scheduled(UpdateTime),
}

/// Refresh trigger state
#[derive(Debug, Clone)]
pub struct UpdateCadence<'a> {
    times: &'a [UpdateTime],
    started: bool,
    /// Minute that last triggered, so a fast poll cannot fire twice
    last_fired: Option<i64>,
}

impl<'a> UpdateCadence<'a> {
    pub fn new(times: &'a [UpdateTime]) -> Self {
        Self {
            times,
            started: false,
            last_fired: None,
        }
    }

    /// Check whether a refresh is due at `now` (Unix seconds, UTC)
    ///
    /// The first call always returns [`RefreshReason::Startup`]. An
    /// unsynchronized clock never matches a scheduled time.
    pub fn check(&mut self, now: Option<i64>) -> Option<RefreshReason> {
        if !self.started {
            self.started = true;
            return Some(RefreshReason::Startup);
        }

        let now = now?;
        let minute = now.div_euclid(60);
        if self.last_fired == Some(minute) {
            return None;
        }

        let time = DateTime::from_timestamp(now, 0)?;
        let hit = self
            .times
            .iter()
            .find(|t| u32::from(t.hour) == time.hour() && u32::from(t.minute) == time.minute())?;
        self.last_fired = Some(minute);
        Some(RefreshReason::Scheduled(*hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;

    // 2024-09-10 00:00:00 UTC
    const MIDNIGHT: i64 = 1_725_926_400;

    fn at(hour: i64, minute: i64, second: i64) -> Option<i64> {
        Some(MIDNIGHT + hour * 3600 + minute * 60 + second)
    }

    #[test]
    fn test_startup_always_first() {
        let schedule = ScheduleConfig::default();
        let mut cadence = UpdateCadence::new(&schedule.update_times);
        assert_eq!(cadence.check(None), Some(RefreshReason::Startup));
        assert_eq!(cadence.check(None), None);
    }

    #[test]
    fn test_scheduled_match() {
        let schedule = ScheduleConfig::default();
        let mut cadence = UpdateCadence::new(&schedule.update_times);
        cadence.check(at(1, 0, 0));

        assert_eq!(cadence.check(at(3, 9, 59)), None);
        assert_eq!(
            cadence.check(at(3, 10, 5)),
            Some(RefreshReason::Scheduled(UpdateTime { hour: 3, minute: 10 }))
        );
        // Same minute, polled again
        assert_eq!(cadence.check(at(3, 10, 50)), None);
        assert_eq!(cadence.check(at(3, 11, 0)), None);
        assert!(cadence.check(at(21, 10, 0)).is_some());
    }

    #[test]
    fn test_no_match_between_times() {
        let schedule = ScheduleConfig::default();
        let mut cadence = UpdateCadence::new(&schedule.update_times);
        cadence.check(None);
        for minute in 0..60 {
            if minute != 10 {
                assert_eq!(cadence.check(at(6, minute, 0)), None);
            }
        }
    }

    #[test]
    fn test_next_day_matches_again() {
        let times = [UpdateTime { hour: 0, minute: 10 }];
        let mut cadence = UpdateCadence::new(&times);
        cadence.check(None);
        assert!(cadence.check(at(0, 10, 0)).is_some());
        assert!(cadence.check(at(24, 10, 0)).is_some());
    }
}
