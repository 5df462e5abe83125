//! Refresh cycle orchestration
//!
//! One cycle:
//! 1. Fetch and scan the feed (failure falls back to static images only)
//! 2. Assign sources to slots and release every old buffer
//! 3. Fetch each active slot through the conversion endpoint, one at a time
//! 4. Decode every slot that received data
//!
//! Failed slots are not retried within a cycle; the next scheduled cycle is
//! the retry.

use core::array;

use stormframe_container::{DecodeError, Warnings};

use super::plan::plan_sources;
use super::request::{ConversionRequest, RequestError};
use crate::config::{AppConfig, MIN_VALID_IMAGE_SIZE};
use crate::feed::{FeedError, FeedParser};
use crate::slots::{DownloadBuffer, SlotStore};
use crate::traits::{HttpClient, Request, TransportError, WallClock};

/// HTTP status accepted as success
const STATUS_OK: u16 = 200;

/// Why a download was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchFailure {
    /// Transport error or timeout
    Transport(TransportError),
    /// Response status other than 200
    Status(u16),
    /// Body shorter than the acceptance threshold
    TooShort { len: usize },
    /// Request body could not be built
    Request(RequestError),
}

/// What happened to the feed this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedOutcome {
    /// Feed downloaded and scanned
    Parsed {
        urls: usize,
        page_links: usize,
        oversized_items: usize,
        /// Scan stopped early; `urls` holds what was found before
        error: Option<FeedError>,
    },
    /// Feed unavailable; static images only
    Unavailable(FetchFailure),
}

/// What happened to one slot this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotOutcome {
    /// No source assigned
    Inactive,
    /// Downloaded, not yet decoded
    Fetched { bytes: usize },
    /// Download rejected; buffer released
    FetchFailed(FetchFailure),
    /// Decoded and valid
    Decoded { warnings: Warnings },
    /// Decode rejected; buffer released
    DecodeFailed(DecodeError),
}

/// Overall result of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// At least one slot is valid
    Ready { decoded: usize },
    /// Nothing decoded; the placeholder should be shown
    Placeholder,
}

impl CycleOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, CycleOutcome::Ready { .. })
    }
}

/// Everything that happened during one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport<const N: usize> {
    pub feed: FeedOutcome,
    pub static_sources: usize,
    pub feed_sources: usize,
    /// Feed sources that did not fit in the store
    pub dropped_sources: usize,
    pub slots: [SlotOutcome; N],
    pub outcome: CycleOutcome,
}

/// Progress hooks, called as a cycle runs
///
/// All methods default to doing nothing.
pub trait CycleObserver {
    /// Feed fetched (or not)
    fn feed_done(&mut self, _outcome: &FeedOutcome) {}

    /// About to download slot `index`
    fn fetch_started(&mut self, _index: usize, _url: &str) {}

    /// Slot `index` reached a final or intermediate outcome
    fn slot_done(&mut self, _index: usize, _outcome: &SlotOutcome) {}
}

impl CycleObserver for () {}

/// Runs refresh cycles against an HTTP transport
pub struct RetrievalEngine<'c, H, C> {
    http: H,
    clock: C,
    config: &'c AppConfig,
}

impl<'c, H: HttpClient, C: WallClock> RetrievalEngine<'c, H, C> {
    pub fn new(http: H, clock: C, config: &'c AppConfig) -> Self {
        Self {
            http,
            clock,
            config,
        }
    }

    /// Borrow the transport
    pub fn http(&mut self) -> &mut H {
        &mut self.http
    }

    /// Run a full cycle, replacing the contents of `store`
    pub async fn run_cycle<const N: usize, O: CycleObserver>(
        &mut self,
        store: &mut SlotStore<N>,
        observer: &mut O,
    ) -> CycleReport<N> {
        let config = self.config;

        let (feed, scan) = match self.fetch(Request::get(&config.feed.url, config.feed.timeout_ms), config.feed.max_bytes).await {
            Ok(body) => {
                let scan = FeedParser::new(&config.feed.marker).scan(body.as_slice());
                let outcome = FeedOutcome::Parsed {
                    urls: scan.urls.len(),
                    page_links: scan.page_links.len(),
                    oversized_items: scan.oversized_items,
                    error: scan.error,
                };
                (outcome, Some(scan))
            }
            Err(failure) => (FeedOutcome::Unavailable(failure), None),
        };
        observer.feed_done(&feed);

        let plan = plan_sources(config, scan.as_ref().map(|s| s.urls.as_slice()), N);
        drop(scan);

        let mut report = CycleReport {
            feed,
            static_sources: plan.static_count,
            feed_sources: plan.feed_count,
            dropped_sources: plan.dropped,
            slots: array::from_fn(|_| SlotOutcome::Inactive),
            outcome: CycleOutcome::Placeholder,
        };

        store.assign_sources(plan.sources);
        store.reset_all();

        for index in 0..store.active_count() {
            let outcome = match self.fetch_slot(store, index, observer).await {
                Ok(buffer) => {
                    let bytes = buffer.len();
                    store.set_buffer(index, buffer);
                    SlotOutcome::Fetched { bytes }
                }
                Err(failure) => {
                    store.reset(index);
                    SlotOutcome::FetchFailed(failure)
                }
            };
            observer.slot_done(index, &outcome);
            report.slots[index] = outcome;
        }

        let now = self.clock.now_unix();
        let mut decoded = 0;
        for index in 0..N {
            let outcome = match store.decode_slot(index, now) {
                Some(Ok(result)) => {
                    decoded += 1;
                    SlotOutcome::Decoded {
                        warnings: result.warnings,
                    }
                }
                Some(Err(e)) => SlotOutcome::DecodeFailed(e),
                None => continue,
            };
            observer.slot_done(index, &outcome);
            report.slots[index] = outcome;
        }

        if decoded > 0 {
            report.outcome = CycleOutcome::Ready { decoded };
        }
        report
    }

    async fn fetch_slot<const N: usize, O: CycleObserver>(
        &mut self,
        store: &SlotStore<N>,
        index: usize,
        observer: &mut O,
    ) -> Result<DownloadBuffer, FetchFailure> {
        let config = self.config;
        let url = store.slot(index).map(|slot| slot.url()).unwrap_or("");
        observer.fetch_started(index, url);

        let body = ConversionRequest::for_url(url, config)
            .to_json()
            .map_err(FetchFailure::Request)?;
        let conversion = &config.conversion;
        let buffer = self
            .fetch(
                Request::post_json(&conversion.endpoint, &body, conversion.timeout_ms),
                conversion.max_bytes,
            )
            .await?;

        if buffer.len() < MIN_VALID_IMAGE_SIZE {
            return Err(FetchFailure::TooShort { len: buffer.len() });
        }
        Ok(buffer)
    }

    /// Perform one request, accepting only a 200 with a non-empty body
    async fn fetch(&mut self, request: Request<'_>, limit: usize) -> Result<DownloadBuffer, FetchFailure> {
        let mut buffer = DownloadBuffer::new(limit);
        let status = self
            .http
            .fetch(&request, &mut buffer)
            .await
            .map_err(FetchFailure::Transport)?;

        if status != STATUS_OK {
            return Err(FetchFailure::Status(status));
        }
        if buffer.is_empty() {
            return Err(FetchFailure::TooShort { len: 0 });
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_IMAGES;
    use alloc::string::String;
    use alloc::vec::Vec;
    use embassy_futures::block_on;
    use stormframe_container::{ContainerHeader, PixelFormat};

    type Reply = Result<(u16, Vec<u8>), TransportError>;

    /// Transport answering from a fixed table keyed by target URL
    struct FakeHttp {
        feed: Reply,
        images: Vec<(String, Reply)>,
        requested: Vec<String>,
    }

    impl FakeHttp {
        fn new(feed: Reply) -> Self {
            Self {
                feed,
                images: Vec::new(),
                requested: Vec::new(),
            }
        }

        fn image(mut self, url: &str, reply: Reply) -> Self {
            self.images.push((String::from(url), reply));
            self
        }
    }

    impl HttpClient for FakeHttp {
        async fn fetch(
            &mut self,
            request: &Request<'_>,
            sink: &mut DownloadBuffer,
        ) -> Result<u16, TransportError> {
            let reply = match request.json_body {
                None => self.feed.clone(),
                Some(body) => {
                    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
                    let url = value["url"].as_str().unwrap();
                    self.requested.push(String::from(url));
                    self.images
                        .iter()
                        .find(|(u, _)| u == url)
                        .map(|(_, r)| r.clone())
                        .unwrap_or(Ok((404, Vec::new())))
                }
            };
            let (status, body) = reply?;
            sink.reserve_hint(body.len())?;
            sink.append(&body)?;
            Ok(status)
        }
    }

    struct FixedClock(Option<i64>);

    impl WallClock for FixedClock {
        fn now_unix(&self) -> Option<i64> {
            self.0
        }
    }

    fn container(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = ContainerHeader::new(PixelFormat::Rgb565, width, height)
            .encode()
            .to_vec();
        bytes.resize(bytes.len() + width as usize * height as usize * 2, 0x55);
        bytes
    }

    fn feed_xml(urls: &[&str]) -> Vec<u8> {
        let mut xml = String::from("<rss><channel>");
        for url in urls {
            xml.push_str("<item><title>Storm Graphics</title><description><![CDATA[<img src=\"");
            xml.push_str(url);
            xml.push_str("\">]]></description></item>");
        }
        xml.push_str("</channel></rss>");
        xml.into_bytes()
    }

    const OUTLOOK_7D: &str = "https://www.nhc.noaa.gov/xgtwo/two_atl_7d0.png";
    const OUTLOOK_2D: &str = "https://www.nhc.noaa.gov/xgtwo/two_atl_2d0.png";

    #[test]
    fn test_full_cycle() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Ok((200, feed_xml(&["http://x/cone1.png"]))))
            .image(OUTLOOK_7D, Ok((200, container(10, 10))))
            .image(OUTLOOK_2D, Ok((200, container(10, 10))))
            .image("http://x/cone1.png", Ok((200, container(10, 10))));
        let mut engine = RetrievalEngine::new(http, FixedClock(Some(1_000)), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: 3 });
        assert_eq!(report.static_sources, 2);
        assert_eq!(report.feed_sources, 1);
        assert_eq!(store.active_count(), 3);
        assert_eq!(store.slot(2).unwrap().name(), "Hurricane Cone 1");
        assert_eq!(store.slot(2).unwrap().updated_at(), Some(1_000));
        assert_eq!(report.slots[3], SlotOutcome::Inactive);
        assert_eq!(
            engine.http().requested,
            [OUTLOOK_7D, OUTLOOK_2D, "http://x/cone1.png"]
        );
    }

    #[test]
    fn test_feed_failure_falls_back_to_static() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Err(TransportError::Timeout))
            .image(OUTLOOK_7D, Ok((200, container(8, 8))))
            .image(OUTLOOK_2D, Ok((200, container(8, 8))));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(
            report.feed,
            FeedOutcome::Unavailable(FetchFailure::Transport(TransportError::Timeout))
        );
        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: 2 });
        assert_eq!(store.active_count(), 2);
    }

    #[test]
    fn test_one_slot_failure_does_not_abort_batch() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Ok((500, Vec::new())))
            .image(OUTLOOK_7D, Ok((503, container(8, 8))))
            .image(OUTLOOK_2D, Ok((200, container(8, 8))));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(report.slots[0], SlotOutcome::FetchFailed(FetchFailure::Status(503)));
        assert!(matches!(report.slots[1], SlotOutcome::Decoded { .. }));
        assert!(store.slot(0).unwrap().bytes().is_none());
        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: 1 });
    }

    #[test]
    fn test_slot_timeout_releases_only_that_slot() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Ok((200, feed_xml(&["http://x/a.png"]))))
            .image(OUTLOOK_7D, Ok((200, container(8, 8))))
            .image(OUTLOOK_2D, Err(TransportError::Timeout))
            .image("http://x/a.png", Ok((200, container(8, 8))));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(
            report.slots[1],
            SlotOutcome::FetchFailed(FetchFailure::Transport(TransportError::Timeout))
        );
        assert!(store.slot(1).unwrap().bytes().is_none());
        assert!(!store.slot(1).unwrap().is_valid());
        assert!(store.slot(0).unwrap().is_valid());
        assert!(store.slot(2).unwrap().is_valid());
        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: 2 });
    }

    #[test]
    fn test_feed_overflow_fetches_only_capacity() {
        let config = AppConfig::default();
        let urls: Vec<String> = (0..15).map(|i| alloc::format!("http://x/cone{i}.png")).collect();
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let mut http = FakeHttp::new(Ok((200, feed_xml(&url_refs))))
            .image(OUTLOOK_7D, Ok((200, container(8, 8))))
            .image(OUTLOOK_2D, Ok((200, container(8, 8))));
        for url in &urls {
            http = http.image(url, Ok((200, container(8, 8))));
        }
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(report.static_sources, 2);
        assert_eq!(report.feed_sources, 8);
        assert_eq!(report.dropped_sources, 7);
        assert_eq!(engine.http().requested.len(), MAX_IMAGES);
        assert_eq!(engine.http().requested[9], "http://x/cone7.png");
        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: MAX_IMAGES });
        assert_eq!(store.slot(9).unwrap().name(), "Hurricane Cone 8");
    }

    #[test]
    fn test_short_body_rejected() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Err(TransportError::Dns))
            .image(OUTLOOK_7D, Ok((200, alloc::vec![0x19; MIN_VALID_IMAGE_SIZE - 1])))
            .image(OUTLOOK_2D, Err(TransportError::Buffer(crate::slots::BufferError::LimitExceeded { limit: 8 })));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(
            report.slots[0],
            SlotOutcome::FetchFailed(FetchFailure::TooShort {
                len: MIN_VALID_IMAGE_SIZE - 1
            })
        );
        assert_eq!(report.outcome, CycleOutcome::Placeholder);
        assert_eq!(store.valid_count(), 0);
    }

    #[test]
    fn test_decode_failure_reported() {
        let config = AppConfig::default();
        let mut truncated = container(20, 20);
        truncated.truncate(200);
        let http = FakeHttp::new(Err(TransportError::Connect))
            .image(OUTLOOK_7D, Ok((200, truncated)))
            .image(OUTLOOK_2D, Ok((200, container(8, 8))));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();

        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert!(matches!(
            report.slots[0],
            SlotOutcome::DecodeFailed(DecodeError::Truncated { .. })
        ));
        assert!(!store.slot(0).unwrap().is_valid());
        assert!(store.slot(1).unwrap().is_valid());
    }

    #[test]
    fn test_new_cycle_replaces_old_contents() {
        let config = AppConfig::default();
        let http = FakeHttp::new(Ok((200, feed_xml(&["http://x/a.png", "http://x/b.png"]))))
            .image(OUTLOOK_7D, Ok((200, container(8, 8))))
            .image(OUTLOOK_2D, Ok((200, container(8, 8))))
            .image("http://x/a.png", Ok((200, container(8, 8))))
            .image("http://x/b.png", Ok((200, container(8, 8))));
        let mut engine = RetrievalEngine::new(http, FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();
        block_on(engine.run_cycle(&mut store, &mut ()));
        assert_eq!(store.valid_count(), 4);

        engine.http().feed = Err(TransportError::Timeout);
        let report = block_on(engine.run_cycle(&mut store, &mut ()));

        assert_eq!(report.outcome, CycleOutcome::Ready { decoded: 2 });
        assert_eq!(store.active_count(), 2);
        assert_eq!(store.valid_count(), 2);
        assert!(store.slot(3).unwrap().bytes().is_none());
    }

    #[test]
    fn test_observer_sees_each_fetch() {
        #[derive(Default)]
        struct Recorder {
            started: Vec<usize>,
            feed_seen: bool,
        }

        impl CycleObserver for Recorder {
            fn feed_done(&mut self, _outcome: &FeedOutcome) {
                self.feed_seen = true;
            }

            fn fetch_started(&mut self, index: usize, _url: &str) {
                self.started.push(index);
            }
        }

        let config = AppConfig::default();
        let mut engine = RetrievalEngine::new(FakeHttp::new(Err(TransportError::Timeout)), FixedClock(None), &config);
        let mut store = SlotStore::<MAX_IMAGES>::new();
        let mut recorder = Recorder::default();

        block_on(engine.run_cycle(&mut store, &mut recorder));

        assert!(recorder.feed_seen);
        assert_eq!(recorder.started, [0, 1]);
    }
}
