//! Backlight power policy
//!
//! ```text
//!        wake                 timeout (wake source present)
//!   ┌──────────────┐      ┌──────────────────────────────┐
//!   ▼              │      │                              ▼
//!  On ──timeout──► On    On ─────────────────────────► Off
//!  (no wake source,                                     │
//!   timer re-armed)      On ◄──────── wake ─────────────┘
//! ```
//!
//! Without a wake source the panel could never be turned back on, so the
//! backlight stays lit and the timer simply re-arms.

use crate::config::BacklightConfig;

/// What the firmware should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightAction {
    /// Switch the backlight on and restart the timer
    TurnOn,
    /// Switch the backlight off; the timer stays idle until a wake
    TurnOff,
    /// Leave the backlight as it is and restart the timer
    Rearm,
}

/// Inactivity timeout state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightPolicy {
    timeout_ms: u32,
    has_wake_source: bool,
    on: bool,
}

impl BacklightPolicy {
    /// Backlight starts on
    pub const fn new(config: BacklightConfig, has_wake_source: bool) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            has_wake_source,
            on: true,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Time until the next timeout, or `None` while the backlight is off
    pub fn timer_ms(&self) -> Option<u32> {
        self.on.then_some(self.timeout_ms)
    }

    /// Inactivity timer expired
    pub fn on_timeout(&mut self) -> BacklightAction {
        if self.on && self.has_wake_source {
            self.on = false;
            BacklightAction::TurnOff
        } else {
            BacklightAction::Rearm
        }
    }

    /// Touch or motion detected
    pub fn on_wake(&mut self) -> BacklightAction {
        if self.on {
            BacklightAction::Rearm
        } else {
            self.on = true;
            BacklightAction::TurnOn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(wake_source: bool) -> BacklightPolicy {
        BacklightPolicy::new(BacklightConfig::default(), wake_source)
    }

    #[test]
    fn test_timeout_turns_off_with_wake_source() {
        let mut backlight = policy(true);
        assert_eq!(backlight.timer_ms(), Some(60_000));
        assert_eq!(backlight.on_timeout(), BacklightAction::TurnOff);
        assert!(!backlight.is_on());
        assert_eq!(backlight.timer_ms(), None);
    }

    #[test]
    fn test_no_wake_source_stays_on() {
        let mut backlight = policy(false);
        for _ in 0..3 {
            assert_eq!(backlight.on_timeout(), BacklightAction::Rearm);
            assert!(backlight.is_on());
        }
    }

    #[test]
    fn test_wake_restores() {
        let mut backlight = policy(true);
        backlight.on_timeout();
        assert_eq!(backlight.on_wake(), BacklightAction::TurnOn);
        assert!(backlight.is_on());
        assert_eq!(backlight.on_wake(), BacklightAction::Rearm);
    }
}
