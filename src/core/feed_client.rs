use crate::core::encoding::decode_body;
use crate::core::entities::{prepare_document, DEFAULT_MAX_ENTITY_CHARACTERS};
use crate::core::{ConfigProvider, FeedSource};
use crate::domain::model::FeedDocument;
use crate::utils::error::{FetchFailure, QuietusError, Result};
use crate::utils::validation::validate_feed_url;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::io::Cursor;
use std::time::Duration;

/// Agent string sent with every feed request; some hosts refuse anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "Quietus/1.0";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const ACCEPT_FEEDS: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

/// Fetches feeds over HTTP(S), one request per call, no caching or retries.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    max_entity_characters: usize,
}

impl HttpFeedClient {
    pub fn new(user_agent: &str, timeout: Duration, max_entity_characters: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| QuietusError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_entity_characters,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.user_agent(),
            config.request_timeout(),
            config.max_entity_characters(),
        )
    }

    async fn download(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, ACCEPT_FEEDS)
            .send()
            .await
            .map_err(request_failure)?;

        tracing::debug!("Feed response status for {}: {}", url, response.status());

        if !response.status().is_success() {
            return Err(FetchFailure::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(request_failure)?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

fn request_failure(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Request(error)
    }
}

/// Parses a feed body (RSS, Atom or RDF) into a [`FeedDocument`].
pub fn parse_feed(
    body: &str,
    max_entity_characters: usize,
) -> std::result::Result<FeedDocument, FetchFailure> {
    let prepared = prepare_document(body, max_entity_characters)?;
    let feed = feed_rs::parser::parse(Cursor::new(prepared.as_bytes()))?;
    Ok(FeedDocument::from(feed))
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self, url: &str) -> Result<FeedDocument> {
        let parsed = validate_feed_url(url)?;

        tracing::debug!("Fetching feed: {}", url);
        let body = self
            .download(parsed.as_str())
            .await
            .map_err(|e| QuietusError::feed_fetch(url, e))?;

        let feed = parse_feed(&body, self.max_entity_characters)
            .map_err(|e| QuietusError::feed_fetch(url, e))?;

        tracing::debug!("Parsed {} items from {}", feed.items.len(), url);
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn client() -> HttpFeedClient {
        HttpFeedClient::new(
            DEFAULT_USER_AGENT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            DEFAULT_MAX_ENTITY_CHARACTERS,
        )
        .unwrap()
    }

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Beta News</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-03-12T09:30:00Z</updated>
  <entry>
    <title>Quarterly results</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2024-03-12T09:30:00Z</updated>
  </entry>
</feed>"#;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Acme News</title>
    <link>http://a.test/</link>
    <description>Acme</description>
    <item>
      <title>Newest</title>
      <pubDate>Tue, 05 Mar 2024 08:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Older</title>
      <pubDate>Mon, 04 Mar 2024 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_keeps_item_order() {
        let feed = parse_feed(RSS, DEFAULT_MAX_ENTITY_CHARACTERS).unwrap();

        assert_eq!(feed.title.as_deref(), Some("Acme News"));
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].title.as_deref(), Some("Newest"));
        assert_eq!(
            feed.items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_atom_entry_with_only_updated() {
        let feed = parse_feed(ATOM, DEFAULT_MAX_ENTITY_CHARACTERS).unwrap();

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].published, None);
        assert_eq!(
            feed.items[0].updated,
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        assert!(matches!(
            parse_feed("this is not a feed", DEFAULT_MAX_ENTITY_CHARACTERS),
            Err(FetchFailure::Body(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_url_is_an_argument_error() {
        assert!(matches!(
            client().fetch("").await,
            Err(QuietusError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_relative_url_fails_the_fetch() {
        match client().fetch("test.me").await {
            Err(QuietusError::FeedFetch { url, .. }) => assert_eq!(url, "test.me"),
            other => panic!("expected feed fetch error, got {:?}", other),
        }
    }
}
