//! Wall clock trait

/// Source of UTC wall-clock time
///
/// Time synchronization happens elsewhere; implementations only report what
/// they currently know.
pub trait WallClock {
    /// Seconds since the Unix epoch, or `None` until the clock is synchronized
    fn now_unix(&self) -> Option<i64>;
}

impl<C: WallClock + ?Sized> WallClock for &C {
    fn now_unix(&self) -> Option<i64> {
        (**self).now_unix()
    }
}
