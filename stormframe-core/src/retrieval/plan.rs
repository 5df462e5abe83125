//! Source list construction

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::config::{truncated, AppConfig, Name};
use crate::slots::ImageSource;

/// Ordered sources for one cycle, already bounded to the slot capacity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePlan {
    pub sources: Vec<ImageSource>,
    /// Static images included
    pub static_count: usize,
    /// Feed images included
    pub feed_count: usize,
    /// Feed images left out for lack of slots
    pub dropped: usize,
}

/// Static images first, then feed images named "<prefix> <n>"
///
/// `feed_urls` is `None` when the feed could not be fetched, in which case
/// only the static images are used.
pub fn plan_sources(config: &AppConfig, feed_urls: Option<&[String]>, capacity: usize) -> SourcePlan {
    let mut plan = SourcePlan::default();

    for image in config.static_images.iter().take(capacity) {
        plan.sources.push(ImageSource {
            url: image.url.clone(),
            name: image.name.clone(),
        });
    }
    plan.static_count = plan.sources.len();

    let urls = feed_urls.unwrap_or(&[]);
    let room = capacity - plan.static_count;
    for (i, url) in urls.iter().take(room).enumerate() {
        plan.sources.push(ImageSource {
            url: url.clone(),
            name: feed_name(&config.feed.name_prefix, i + 1),
        });
    }
    plan.feed_count = urls.len().min(room);
    plan.dropped = urls.len() - plan.feed_count;
    plan
}

fn feed_name(prefix: &str, number: usize) -> Name {
    let mut name: Name = truncated(prefix);
    // Prefixes are labels, far shorter than a name
    let _ = write!(name, " {}", number);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| alloc::format!("http://x/{i}.png")).collect()
    }

    #[test]
    fn test_static_then_feed_bounded() {
        let config = AppConfig::default();
        let feed = urls(15);
        let plan = plan_sources(&config, Some(&feed), 10);

        assert_eq!(plan.sources.len(), 10);
        assert_eq!(plan.static_count, 2);
        assert_eq!(plan.feed_count, 8);
        assert_eq!(plan.dropped, 7);
        assert_eq!(plan.sources[0].name.as_str(), "Atlantic 7-Day Outlook");
        assert_eq!(plan.sources[2].url, "http://x/0.png");
        assert_eq!(plan.sources[2].name.as_str(), "Hurricane Cone 1");
        assert_eq!(plan.sources[9].name.as_str(), "Hurricane Cone 8");
    }

    #[test]
    fn test_feed_unavailable_is_static_only() {
        let config = AppConfig::default();
        let plan = plan_sources(&config, None, 10);
        assert_eq!(plan.sources.len(), 2);
        assert_eq!(plan.feed_count, 0);
        assert_eq!(plan.dropped, 0);
    }

    #[test]
    fn test_static_capped_by_capacity() {
        let config = AppConfig::default();
        let feed = urls(3);
        let plan = plan_sources(&config, Some(&feed), 1);
        assert_eq!(plan.sources.len(), 1);
        assert_eq!(plan.static_count, 1);
        assert_eq!(plan.dropped, 3);
    }
}
