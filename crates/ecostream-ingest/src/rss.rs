//! RSS headline source.
//!
//! Fetches an RSS 2.0 document over HTTP and keeps the first
//! `max_items` `<item>` entries. Extraction is pattern based: the feed
//! is only read for `title`, `link`, `description` and `pubDate`, so a
//! full XML parser is not needed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use ecostream_core::config::NewsConfig;
use ecostream_core::source::{NewsSource, SourceError};
use ecostream_types::NewsItem;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::IngestError;

/// User agent sent with every feed request.
const USER_AGENT: &str = concat!("ecostream/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Compiled patterns for pulling items out of an RSS document.
#[derive(Debug, Clone)]
pub struct FeedParser {
    item: Regex,
    title: Regex,
    link: Regex,
    description: Regex,
    pub_date: Regex,
    cdata: Regex,
    markup: Regex,
    numeric_ref: Regex,
}

impl FeedParser {
    /// Compile the extraction patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            item: Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>")?,
            title: element("title")?,
            link: element("link")?,
            description: element("description")?,
            pub_date: element("pubDate")?,
            cdata: Regex::new(r"(?s)^\s*<!\[CDATA\[(.*?)\]\]>\s*$")?,
            markup: Regex::new(r"<[^>]*>")?,
            numeric_ref: Regex::new(r"&#([xX])?([0-9a-fA-F]+);")?,
        })
    }

    /// Parse up to `max_items` news items from `xml`, in feed order.
    ///
    /// Items without a title are skipped. Items whose `pubDate` is
    /// missing or unparseable are stamped with `fetched_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] if the body is not an RSS document.
    pub fn parse(
        &self,
        xml: &str,
        max_items: usize,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, SourceError> {
        if !xml.contains("<rss") && !xml.contains("<channel") {
            return Err(SourceError::Parse {
                message: "document is not an RSS feed".to_owned(),
            });
        }

        let items = self
            .item
            .captures_iter(xml)
            .filter_map(|caps| caps.get(1))
            .filter_map(|body| self.parse_item(body.as_str(), fetched_at))
            .take(max_items)
            .collect();
        Ok(items)
    }

    fn parse_item(&self, body: &str, fetched_at: DateTime<Utc>) -> Option<NewsItem> {
        let title = self.text_of(&self.title, body)?;
        let link = self.text_of(&self.link, body);
        let summary = self
            .text_of(&self.description, body)
            .map(|html| self.strip_markup(&html))
            .filter(|s| !s.is_empty());
        let published = self
            .text_of(&self.pub_date, body)
            .and_then(|raw| DateTime::parse_from_rfc2822(&raw).ok())
            .map_or(fetched_at, |dt| dt.with_timezone(&Utc));

        Some(NewsItem {
            title,
            link,
            summary,
            published,
        })
    }

    /// Text content of the first `pattern` match, unwrapped and unescaped.
    fn text_of(&self, pattern: &Regex, body: &str) -> Option<String> {
        let raw = pattern.captures(body)?.get(1)?.as_str();
        let inner = self
            .cdata
            .captures(raw)
            .and_then(|c| c.get(1))
            .map_or(raw, |m| m.as_str());
        let text = self.unescape(inner.trim());
        (!text.is_empty()).then_some(text)
    }

    fn strip_markup(&self, html: &str) -> String {
        let plain = self.unescape(&self.markup.replace_all(html, " "));
        plain.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Decode numeric character references and the predefined entities.
    ///
    /// `&amp;` goes last so that double-escaped text decodes one level
    /// only. References that do not name a valid character are kept as
    /// written.
    fn unescape(&self, text: &str) -> String {
        let decoded = self.numeric_ref.replace_all(text, |caps: &Captures<'_>| {
            let radix = if caps.get(1).is_some() { 16 } else { 10 };
            caps.get(2)
                .and_then(|digits| u32::from_str_radix(digits.as_str(), radix).ok())
                .and_then(char::from_u32)
                .map_or_else(
                    || caps.get(0).map_or_else(String::new, |m| m.as_str().to_owned()),
                    String::from,
                )
        });
        decoded
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
    }
}

/// Pattern capturing the content of `<tag ...>...</tag>`.
fn element(tag: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?s)<{tag}\b[^>]*>(.*?)</{tag}>"))
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// News source backed by an RSS feed.
#[derive(Debug, Clone)]
pub struct RssNewsSource {
    client: reqwest::Client,
    feed_url: String,
    max_items: usize,
    parser: FeedParser,
}

impl RssNewsSource {
    /// Create a source for `feed_url` keeping at most `max_items` items.
    ///
    /// `timeout` bounds each HTTP request.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the HTTP client or the patterns cannot
    /// be built.
    pub fn new(
        feed_url: impl Into<String>,
        max_items: usize,
        timeout: Duration,
    ) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            feed_url: feed_url.into(),
            max_items,
            parser: FeedParser::new()?,
        })
    }

    /// Create a source from the `news` section of the configuration.
    ///
    /// # Errors
    ///
    /// See [`RssNewsSource::new`].
    pub fn from_config(config: &NewsConfig) -> Result<Self, IngestError> {
        Self::new(
            config.feed_url.clone(),
            config.max_items,
            Duration::from_millis(config.fetch_timeout_ms),
        )
    }

    /// The feed URL this source polls.
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

impl NewsSource for RssNewsSource {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, SourceError> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| SourceError::Fetch {
                message: format!("feed request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Fetch {
                message: format!("feed returned {status}"),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Fetch {
            message: format!("feed body unreadable: {e}"),
        })?;

        let items = self.parser.parse(&body, self.max_items, Utc::now())?;
        debug!(url = %self.feed_url, count = items.len(), "Fetched news feed");
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"air pollution india" - Google News</title>
    <link>https://news.google.com</link>
    <item>
      <title>Delhi AQI turns severe as smog blankets NCR</title>
      <link>https://example.com/a</link>
      <description>&lt;a href="https://example.com/a"&gt;Delhi AQI turns severe&lt;/a&gt;&amp;nbsp;&lt;font&gt;Times&lt;/font&gt;</description>
      <pubDate>Mon, 03 Nov 2025 06:30:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[Noida schools shut & traffic curbs announced]]></title>
      <link>https://example.com/b</link>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <link>https://example.com/untitled</link>
    </item>
    <item>
      <title>Crop burning drops 40%</title>
    </item>
  </channel>
</rss>"#;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_items_in_feed_order() {
        let parser = FeedParser::new().unwrap();
        let items = parser.parse(SAMPLE, 5, fetched_at()).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Delhi AQI turns severe as smog blankets NCR");
        assert_eq!(items[0].link.as_deref(), Some("https://example.com/a"));
        assert_eq!(
            items[0].published,
            Utc.with_ymd_and_hms(2025, 11, 3, 6, 30, 0).unwrap()
        );
        assert_eq!(items[2].title, "Crop burning drops 40%");
        assert_eq!(items[2].link, None);
    }

    #[test]
    fn description_markup_is_stripped() {
        let parser = FeedParser::new().unwrap();
        let items = parser.parse(SAMPLE, 5, fetched_at()).unwrap();
        assert_eq!(
            items[0].summary.as_deref(),
            Some("Delhi AQI turns severe Times")
        );
        assert_eq!(items[1].summary, None);
    }

    #[test]
    fn cdata_title_and_bad_date_fall_back() {
        let parser = FeedParser::new().unwrap();
        let items = parser.parse(SAMPLE, 5, fetched_at()).unwrap();
        assert_eq!(items[1].title, "Noida schools shut & traffic curbs announced");
        assert_eq!(items[1].published, fetched_at());
    }

    #[test]
    fn max_items_truncates() {
        let parser = FeedParser::new().unwrap();
        let items = parser.parse(SAMPLE, 1, fetched_at()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(parser.parse(SAMPLE, 0, fetched_at()).unwrap().is_empty());
    }

    #[test]
    fn empty_channel_is_not_an_error() {
        let parser = FeedParser::new().unwrap();
        let xml = "<rss><channel><title>quiet</title></channel></rss>";
        assert!(parser.parse(xml, 5, fetched_at()).unwrap().is_empty());
    }

    #[test]
    fn non_rss_body_is_a_parse_error() {
        let parser = FeedParser::new().unwrap();
        let err = parser
            .parse("<html><body>captcha</body></html>", 5, fetched_at())
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn unescape_decodes_one_level() {
        let parser = FeedParser::new().unwrap();
        assert_eq!(parser.unescape("a &amp;lt; b"), "a &lt; b");
        assert_eq!(parser.unescape("&quot;x&quot; &#39;y&#39;"), "\"x\" 'y'");
        assert_eq!(parser.unescape("&amp;#8217;"), "&#8217;");
    }

    #[test]
    fn unescape_decodes_numeric_references() {
        let parser = FeedParser::new().unwrap();
        assert_eq!(parser.unescape("Delhi&#8217;s AQI &#x2014; worst"), "Delhi\u{2019}s AQI \u{2014} worst");
        assert_eq!(parser.unescape("&#X41;&#66;"), "AB");
        // Not a character: surrogate and out of range stay as written.
        assert_eq!(parser.unescape("&#xD800; &#99999999;"), "&#xD800; &#99999999;");
    }

    #[test]
    fn numeric_references_in_titles_are_matchable() {
        let parser = FeedParser::new().unwrap();
        let xml = "<rss><channel><item><title>Delhi&#8217;s smog &#x2014; worst in years</title></item></channel></rss>";
        let items = parser.parse(xml, 5, fetched_at()).unwrap();
        assert_eq!(items[0].title, "Delhi\u{2019}s smog \u{2014} worst in years");
        let hits = ecostream_core::explain::retrieve_relevant("delhi\u{2019}s", &items);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn source_from_config_keeps_url() {
        let config = NewsConfig::default();
        let source = RssNewsSource::from_config(&config).unwrap();
        assert_eq!(source.feed_url(), config.feed_url);
    }

    #[tokio::test]
    async fn unreachable_feed_is_a_fetch_error() {
        let source =
            RssNewsSource::new("http://127.0.0.1:9/feed", 5, Duration::from_millis(500)).unwrap();
        let err = source.fetch_news().await.unwrap_err();
        assert!(matches!(err, SourceError::Fetch { .. }));
    }
}
