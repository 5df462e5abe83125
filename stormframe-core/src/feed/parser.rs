//! Streaming feed item scanner
//!
//! Walks the RSS document as a token stream without building a tree. Only
//! `<item>` elements are inspected; their `<title>` and `<description>`
//! character data is accumulated and examined when the item closes.

use alloc::string::String;
use alloc::vec::Vec;

use xmlparser::{ElementEnd, Token, Tokenizer};

use super::text::{for_each_unescaped, push_bounded};

/// Maximum title bytes kept per item; the rest is dropped
pub const MAX_TITLE_BYTES: usize = 255;

/// Maximum description bytes per item; larger items are skipped
pub const MAX_DESCRIPTION_BYTES: usize = 256 * 1024;

/// Description capacity reserved when the first item opens
const INITIAL_DESCRIPTION_CAPACITY: usize = 4096;

/// Attribute prefix holding an embedded image URL
const SRC_PREFIX: &str = "src=\"";

/// Attribute prefix holding a page link
const HREF_PREFIX: &str = "href=\"";

/// Errors that stop a feed scan early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedError {
    /// Document is not well-formed at the given position
    Malformed { row: u32, col: u32 },
    /// Closing tag does not match the open element, at this byte offset
    MismatchedTag { offset: usize },
    /// Document ended with elements still open
    UnexpectedEnd,
    /// Document is not valid UTF-8 past this byte offset
    InvalidUtf8 { valid_up_to: usize },
    /// Allocation failed while recording a URL
    OutOfMemory,
}

/// Result of scanning one feed document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedScan {
    /// Embedded image URLs, in document order
    pub urls: Vec<String>,
    /// Page links from matching items that had no embedded image
    pub page_links: Vec<String>,
    /// Items seen
    pub items: usize,
    /// Items whose title contained the marker
    pub matched: usize,
    /// Items skipped because their description exceeded the size cap
    pub oversized_items: usize,
    /// Set when the scan stopped before the end of the document
    pub error: Option<FeedError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Item,
    Title,
    Description,
}

impl Element {
    fn classify(prefix: &str, local: &str) -> Option<Self> {
        if !prefix.is_empty() {
            return None;
        }
        match local {
            "item" => Some(Element::Item),
            "title" => Some(Element::Title),
            "description" => Some(Element::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Title,
    Description,
}

/// Per-item accumulators, reused across items
struct ItemState {
    title: String,
    description: String,
    oversized: bool,
}

impl ItemState {
    fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            oversized: false,
        }
    }

    fn begin(&mut self) {
        self.title.clear();
        self.description.clear();
        self.oversized = false;
        if self.description.capacity() < INITIAL_DESCRIPTION_CAPACITY {
            // Growth is retried on demand if this fails
            let _ = self.description.try_reserve(INITIAL_DESCRIPTION_CAPACITY);
        }
    }

    fn push(&mut self, field: Field, piece: &str) {
        match field {
            Field::Title => {
                push_bounded(&mut self.title, piece, MAX_TITLE_BYTES);
            }
            Field::Description if !self.oversized => {
                if self.description.len() + piece.len() > MAX_DESCRIPTION_BYTES
                    || self.description.try_reserve(piece.len()).is_err()
                {
                    self.oversized = true;
                    self.description = String::new();
                } else {
                    self.description.push_str(piece);
                }
            }
            _ => {}
        }
    }
}

/// Scanner for items whose title contains a marker keyword
#[derive(Debug, Clone, Copy)]
pub struct FeedParser<'m> {
    marker: &'m str,
}

impl<'m> FeedParser<'m> {
    /// Create a scanner matching item titles against `marker`
    pub fn new(marker: &'m str) -> Self {
        Self { marker }
    }

    /// Scan a complete document
    ///
    /// Never fails outright: on malformed input the URLs found before the
    /// error are returned together with the error.
    pub fn scan(&self, xml: &[u8]) -> FeedScan {
        let mut scan = FeedScan::default();

        let text = match core::str::from_utf8(xml) {
            Ok(text) => text,
            Err(e) => {
                scan.error = Some(FeedError::InvalidUtf8 {
                    valid_up_to: e.valid_up_to(),
                });
                match core::str::from_utf8(&xml[..e.valid_up_to()]) {
                    Ok(text) => text,
                    Err(_) => return scan,
                }
            }
        };

        if let Err(e) = self.walk(text, &mut scan) {
            // A tokenizer error past an encoding error is a consequence of it
            scan.error.get_or_insert(e);
        }
        scan
    }

    fn walk(&self, text: &str, scan: &mut FeedScan) -> Result<(), FeedError> {
        let mut item = ItemState::new();
        let mut in_item = false;
        let mut field = Field::None;
        let mut pending: Option<Element> = None;
        let mut open: Vec<(&str, &str)> = Vec::new();

        for token in Tokenizer::from(text) {
            let token = token.map_err(|e| {
                let pos = e.pos();
                FeedError::Malformed {
                    row: pos.row,
                    col: pos.col,
                }
            })?;

            match token {
                Token::ElementStart { prefix, local, .. } => {
                    pending = Element::classify(prefix.as_str(), local.as_str());
                    open.try_reserve(1).map_err(|_| FeedError::OutOfMemory)?;
                    open.push((prefix.as_str(), local.as_str()));
                }
                Token::ElementEnd {
                    end: ElementEnd::Open,
                    ..
                } => match pending.take() {
                    Some(Element::Item) => {
                        in_item = true;
                        field = Field::None;
                        item.begin();
                    }
                    Some(Element::Title) if in_item => field = Field::Title,
                    Some(Element::Description) if in_item => field = Field::Description,
                    _ => {}
                },
                Token::ElementEnd {
                    end: ElementEnd::Empty,
                    ..
                } => {
                    open.pop();
                    if pending.take() == Some(Element::Item) {
                        item.begin();
                        self.finish_item(&item, scan)?;
                    }
                }
                Token::ElementEnd {
                    end: ElementEnd::Close(prefix, local),
                    span,
                } => {
                    let name = (prefix.as_str(), local.as_str());
                    if open.pop() != Some(name) {
                        return Err(FeedError::MismatchedTag {
                            offset: span.start(),
                        });
                    }
                    match Element::classify(name.0, name.1) {
                        Some(Element::Item) if in_item => {
                            in_item = false;
                            field = Field::None;
                            self.finish_item(&item, scan)?;
                        }
                        Some(Element::Title) | Some(Element::Description) => field = Field::None,
                        _ => {}
                    }
                }
                Token::Text { text } if in_item && field != Field::None => {
                    for_each_unescaped(text.as_str(), |piece| item.push(field, piece));
                }
                Token::Cdata { text, .. } if in_item && field != Field::None => {
                    item.push(field, text.as_str());
                }
                _ => {}
            }
        }

        if open.is_empty() {
            Ok(())
        } else {
            Err(FeedError::UnexpectedEnd)
        }
    }

    fn finish_item(&self, item: &ItemState, scan: &mut FeedScan) -> Result<(), FeedError> {
        scan.items += 1;
        if item.oversized {
            scan.oversized_items += 1;
            return Ok(());
        }
        if !item.title.contains(self.marker) {
            return Ok(());
        }
        scan.matched += 1;

        if item.description.contains(SRC_PREFIX) {
            if let Some(url) = quoted_after(&item.description, SRC_PREFIX) {
                push_owned(&mut scan.urls, url)?;
            }
        } else if let Some(link) = quoted_after(&item.description, HREF_PREFIX) {
            push_owned(&mut scan.page_links, link)?;
        }
        Ok(())
    }
}

/// Text between `prefix` and the next double quote, if non-empty
fn quoted_after<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
    let start = haystack.find(prefix)? + prefix.len();
    let rest = &haystack[start..];
    let value = &rest[..rest.find('"')?];
    (!value.is_empty()).then_some(value)
}

fn push_owned(list: &mut Vec<String>, value: &str) -> Result<(), FeedError> {
    list.try_reserve(1).map_err(|_| FeedError::OutOfMemory)?;
    let mut owned = String::new();
    owned
        .try_reserve_exact(value.len())
        .map_err(|_| FeedError::OutOfMemory)?;
    owned.push_str(value);
    list.push(owned);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(xml: &str) -> FeedScan {
        FeedParser::new("Graphics").scan(xml.as_bytes())
    }

    #[test]
    fn test_src_in_matching_item() {
        let result = scan(
            r#"<rss><channel><item>
                <title>Hurricane Graphics Update</title>
                <description>&lt;img src="http://x/a.png"&gt;</description>
            </item></channel></rss>"#,
        );
        assert_eq!(result.urls, ["http://x/a.png"]);
        assert_eq!(result.items, 1);
        assert_eq!(result.matched, 1);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_href_only_is_not_collected() {
        let result = scan(
            r#"<rss><channel><item>
                <title>Tropical Storm Graphics</title>
                <description><![CDATA[<a href="http://x/b.html">Cone</a>]]></description>
            </item></channel></rss>"#,
        );
        assert!(result.urls.is_empty());
        assert_eq!(result.page_links, ["http://x/b.html"]);
    }

    #[test]
    fn test_empty_item_is_counted_and_skipped() {
        let result = scan(
            r#"<rss><channel><item/><item>
                <title>Hurricane Graphics Update</title>
                <description>&lt;img src="http://x/a.png"&gt;</description>
            </item></channel></rss>"#,
        );
        assert_eq!(result.urls, ["http://x/a.png"]);
        assert_eq!(result.items, 2);
        assert_eq!(result.matched, 1);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_non_matching_title_is_ignored() {
        let result = scan(
            r#"<rss><channel><item>
                <title>Tropical Weather Outlook</title>
                <description>&lt;img src="http://x/c.png"&gt;</description>
            </item></channel></rss>"#,
        );
        assert!(result.urls.is_empty());
        assert_eq!(result.items, 1);
        assert_eq!(result.matched, 0);
    }

    #[test]
    fn test_document_order_and_channel_title() {
        let result = scan(
            r#"<rss><channel><title>NHC Graphics Feed</title>
            <item><title>Ernesto Graphics</title>
                <description><![CDATA[<img src="http://x/1.png">]]></description></item>
            <item><title>Francine Graphics</title>
                <description><![CDATA[<img src="http://x/2.png">]]></description></item>
            </channel></rss>"#,
        );
        assert_eq!(result.urls, ["http://x/1.png", "http://x/2.png"]);
    }

    #[test]
    fn test_title_is_truncated() {
        let long_title = "x".repeat(300);
        // Marker pushed past the cut is lost
        let xml = alloc::format!(
            "<rss><item><title>{}Graphics</title><description>&lt;img src=\"http://x/a.png\"&gt;</description></item></rss>",
            long_title
        );
        let result = scan(&xml);
        assert!(result.urls.is_empty());
        assert_eq!(result.matched, 0);
    }

    #[test]
    fn test_oversized_description_skips_item() {
        let mut big = String::from("&lt;img src=\"http://x/big.png\"&gt;");
        while big.len() <= MAX_DESCRIPTION_BYTES + 1024 {
            big.push_str("padding padding padding padding ");
        }
        let xml = alloc::format!(
            "<rss><item><title>Big Graphics</title><description>{}</description></item>\
             <item><title>Small Graphics</title><description>&lt;img src=\"http://x/small.png\"&gt;</description></item></rss>",
            big
        );
        let result = scan(&xml);
        assert_eq!(result.oversized_items, 1);
        assert_eq!(result.urls, ["http://x/small.png"]);
    }

    #[test]
    fn test_malformed_keeps_earlier_urls() {
        let result = scan(
            r#"<rss><channel>
            <item><title>One Graphics</title>
                <description><![CDATA[<img src="http://x/1.png">]]></description></item>
            <item><title>Two Graphics</title><description>x < y</description></item>"#,
        );
        assert_eq!(result.urls, ["http://x/1.png"]);
        assert!(matches!(result.error, Some(FeedError::Malformed { .. })));
    }

    #[test]
    fn test_mismatched_tag_stops_scan() {
        let result = scan(
            r#"<rss><item><title>One Graphics</title>
                <description><![CDATA[<img src="http://x/1.png">]]></description></item>
            <item><title>Two Graphics</title></description></item></rss>"#,
        );
        assert_eq!(result.urls, ["http://x/1.png"]);
        assert!(matches!(result.error, Some(FeedError::MismatchedTag { .. })));
    }

    #[test]
    fn test_truncated_document_keeps_urls() {
        let result = scan(
            r#"<rss><channel><item><title>One Graphics</title>
                <description><![CDATA[<img src="http://x/1.png">]]></description></item>
            <item><title>Two Gra"#,
        );
        assert_eq!(result.urls, ["http://x/1.png"]);
        assert_eq!(result.error, Some(FeedError::UnexpectedEnd));
    }

    #[test]
    fn test_invalid_utf8_scans_valid_prefix() {
        let mut bytes = b"<rss><item><title>A Graphics</title><description>&lt;img src=\"http://x/a.png\"&gt;</description></item>".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        let result = FeedParser::new("Graphics").scan(&bytes);
        assert_eq!(result.urls, ["http://x/a.png"]);
        assert!(matches!(result.error, Some(FeedError::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_unclosed_src_quote_yields_nothing() {
        let result = scan(
            r#"<rss><item><title>A Graphics</title>
            <description><![CDATA[<a href="http://x/b.html"></a><img src="http://x/a.png]]></description></item></rss>"#,
        );
        // src=" present, so href is not consulted either
        assert!(result.urls.is_empty());
        assert!(result.page_links.is_empty());
        assert_eq!(result.matched, 1);
    }
}
