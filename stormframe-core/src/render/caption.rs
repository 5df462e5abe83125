//! Provenance caption

use core::fmt::Write;

use chrono::DateTime;
use heapless::String;

/// Caption capacity; long names are cut
pub const MAX_CAPTION_LEN: usize = 128;

/// Name shown when a frame has none
pub const FALLBACK_NAME: &str = "Hurricane Tracking Image";

/// Caption text
pub type Caption = String<MAX_CAPTION_LEN>;

/// Format "<name>\nLast updated: YYYY-MM-DD HH:MM:SS UTC"
pub fn caption(name: &str, timestamp: Option<i64>) -> Caption {
    let name = if name.is_empty() { FALLBACK_NAME } else { name };
    let mut out = Caption::new();

    for c in name.chars() {
        if out.len() + c.len_utf8() > MAX_CAPTION_LEN - 48 || out.push(c).is_err() {
            break;
        }
    }

    // Room for the time line is held back above, so these writes fit
    let _ = match timestamp.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        Some(time) => write!(
            out,
            "\nLast updated: {} UTC",
            time.format("%Y-%m-%d %H:%M:%S")
        ),
        None => out.push_str("\nLast updated: unknown").map_err(|_| core::fmt::Error),
    };
    out
}
