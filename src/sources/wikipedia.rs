//! Single-article Wikipedia source.
//!
//! Fetches one English Wikipedia article through the REST summary endpoint
//! (`/api/rest_v1/page/summary/{title}`) and turns it into one raw record.
//! The request has a bounded timeout and is never retried; any network
//! error, non-2xx status or non-object body fails the whole run.
//!
//! # URL Pattern
//!
//! Only `https://en.wikipedia.org/wiki/<Title>` (optionally `www.`) is
//! accepted. The title is percent-decoded from the path and re-encoded for
//! the API call.

use super::RecordSource;
use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::models::RawRecord;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary/";
const ALLOWED_HOSTS: &[&str] = &["en.wikipedia.org", "www.en.wikipedia.org"];
const ARTICLE_PREFIX: &str = "/wiki/";

/// The subset of the summary response we use.
#[derive(Debug, Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrls>,
}

#[derive(Debug, Deserialize)]
struct PageUrls {
    page: Option<String>,
}

/// Fetches one article summary as a one-record batch.
#[derive(Debug, Clone)]
pub struct WikipediaSource {
    article_url: String,
    title: String,
    client: Client,
}

impl WikipediaSource {
    /// Validate `article_url` and build an HTTP client from `config`.
    pub fn new(article_url: &str, config: &PipelineConfig) -> Result<Self, SourceError> {
        let title = article_title(article_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| SourceError::Fetch {
                url: article_url.to_string(),
                source,
            })?;
        Ok(Self {
            article_url: article_url.to_string(),
            title,
            client,
        })
    }

    fn summary_url(&self) -> String {
        format!("{SUMMARY_ENDPOINT}{}", urlencoding::encode(&self.title))
    }

    fn record_from_summary(&self, summary: PageSummary, scraped_at: DateTime<Utc>) -> RawRecord {
        let title = summary
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.title.replace('_', " "));
        let content = summary.extract.unwrap_or_default();
        let url = summary
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page)
            .filter(|page| !page.is_empty())
            .unwrap_or_else(|| self.article_url.clone());

        let mut record = RawRecord::new();
        record.insert("title".to_string(), Value::String(title));
        record.insert("content".to_string(), Value::String(content));
        record.insert("url".to_string(), Value::String(url));
        record.insert("source".to_string(), Value::String("wikipedia".to_string()));
        record.insert("scraped_at".to_string(), Value::String(scraped_at.to_rfc3339()));
        record.insert("lang".to_string(), Value::String("en".to_string()));
        record
    }
}

impl RecordSource for WikipediaSource {
    fn describe(&self) -> String {
        format!("wikipedia {}", self.article_url)
    }

    #[instrument(level = "info", skip_all, fields(title = %self.title))]
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.summary_url();
        let fetch_error = |source| SourceError::Fetch {
            url: url.clone(),
            source,
        };

        info!(%url, "Fetching article summary");
        let body = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)?;
        debug!(bytes = body.len(), "Received summary response");

        let summary: PageSummary =
            serde_json::from_str(&body).map_err(|source| SourceError::MalformedResponse {
                url: url.clone(),
                source,
            })?;
        Ok(vec![self.record_from_summary(summary, Utc::now())])
    }
}

/// Extract the article title from an en.wikipedia.org article URL.
fn article_title(article_url: &str) -> Result<String, SourceError> {
    let unsupported = |reason: &str| SourceError::UnsupportedUrl {
        url: article_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(article_url).map_err(|_| unsupported("not an absolute URL"))?;
    let host = parsed.host_str().unwrap_or_default();
    if !ALLOWED_HOSTS.contains(&host) {
        return Err(unsupported("only en.wikipedia.org articles are supported"));
    }
    let raw_title = parsed
        .path()
        .strip_prefix(ARTICLE_PREFIX)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unsupported("article path must start with /wiki/"))?;

    let title = urlencoding::decode(raw_title)
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| raw_title.to_string());
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn source(url: &str) -> WikipediaSource {
        WikipediaSource::new(url, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_article_title() {
        assert_eq!(article_title("https://en.wikipedia.org/wiki/Rust").unwrap(), "Rust");
        assert_eq!(
            article_title("https://www.en.wikipedia.org/wiki/C%2B%2B").unwrap(),
            "C++"
        );
        assert_eq!(
            article_title("https://en.wikipedia.org/wiki/Rust_(programming_language)").unwrap(),
            "Rust_(programming_language)"
        );
    }

    #[test]
    fn test_rejects_other_urls() {
        for url in [
            "https://de.wikipedia.org/wiki/Rust",
            "https://example.com/wiki/Rust",
            "https://en.wikipedia.org/w/index.php?title=Rust",
            "https://en.wikipedia.org/wiki/",
            "not a url",
        ] {
            let err = WikipediaSource::new(url, &PipelineConfig::default()).unwrap_err();
            assert!(matches!(err, SourceError::UnsupportedUrl { .. }), "{url} should be rejected");
        }
    }

    #[test]
    fn test_summary_url_is_encoded() {
        let src = source("https://en.wikipedia.org/wiki/C%2B%2B");
        assert_eq!(
            src.summary_url(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/C%2B%2B"
        );
        assert!(src.describe().starts_with("wikipedia https://en.wikipedia.org/wiki/"));
    }

    #[test]
    fn test_record_from_full_summary() {
        let src = source("https://en.wikipedia.org/wiki/Rust_(programming_language)");
        let summary: PageSummary = serde_json::from_value(json!({
            "title": "Rust (programming language)",
            "extract": "Rust is a general-purpose programming language.",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Rust_(programming_language)"}},
            "lang": "en",
            "pageid": 29414838
        }))
        .unwrap();
        let scraped_at = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        let record = src.record_from_summary(summary, scraped_at);

        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "content", "url", "source", "scraped_at", "lang"]);
        assert_eq!(record["title"], json!("Rust (programming language)"));
        assert_eq!(record["content"], json!("Rust is a general-purpose programming language."));
        assert_eq!(record["source"], json!("wikipedia"));
        assert_eq!(record["scraped_at"], json!("2025-05-06T12:00:00+00:00"));
    }

    #[test]
    fn test_record_from_sparse_summary_falls_back() {
        let src = source("https://en.wikipedia.org/wiki/Some_Page");
        let summary: PageSummary = serde_json::from_value(json!({"title": ""})).unwrap();
        let record = src.record_from_summary(summary, Utc::now());
        assert_eq!(record["title"], json!("Some Page"));
        assert_eq!(record["content"], json!(""));
        assert_eq!(record["url"], json!("https://en.wikipedia.org/wiki/Some_Page"));
    }

    #[test]
    fn test_non_object_summary_is_malformed() {
        assert!(serde_json::from_str::<PageSummary>("[1, 2]").is_err());
        assert!(serde_json::from_str::<PageSummary>("<html></html>").is_err());
    }
}
