/*
 * crossref.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Crossref REST API client
 */

//! Crossref REST API client.
//!
//! Two endpoints are used: `GET /works/{doi}` for a direct lookup and
//! `GET /works?query.title=..` for a title search. Responses wrap their
//! payload in a `message` object; titles arrive as arrays and only the
//! first element is kept.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use texaudit_core::RemoteConfig;
use tracing::debug;

use crate::error::{RemoteError, Result};
use crate::http::check_response;
use crate::source::{MetadataSource, RemoteWork};

const USER_AGENT: &str = concat!("texaudit/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: T,
}

#[derive(Debug, Deserialize)]
struct WorkRecord {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(default)]
    title: Vec<String>,
}

impl From<WorkRecord> for RemoteWork {
    fn from(record: WorkRecord) -> Self {
        Self {
            doi: record.doi.filter(|d| !d.is_empty()),
            title: record.title.into_iter().find(|t| !t.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    items: Vec<WorkRecord>,
}

/// Blocking Crossref client.
pub struct CrossrefClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl CrossrefClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(config.timeout.max(0.1))
            .map_err(|_| RemoteError::InvalidTimeout(config.timeout))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone().filter(|m| !m.is_empty()),
        })
    }

    fn work_url(&self, doi: &str) -> String {
        let mut url = format!("{}/works/{}", self.base_url, urlencoding::encode(doi));
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("?mailto={}", urlencoding::encode(mailto)));
        }
        url
    }

    fn search_url(&self, title: &str, rows: usize) -> String {
        let mut url = format!(
            "{}/works?query.title={}&rows={}&select=DOI,title",
            self.base_url,
            urlencoding::encode(title),
            rows.max(1)
        );
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("&mailto={}", urlencoding::encode(mailto)));
        }
        url
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let resp = self.client.get(url).header(ACCEPT, "application/json").send()?;
        let body = check_response(resp)?.text()?;
        parse_envelope(&body)
    }
}

fn parse_envelope<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.message)
        .map_err(|e| RemoteError::Parse(e.to_string()))
}

impl MetadataSource for CrossrefClient {
    fn lookup_doi(&self, doi: &str) -> Result<RemoteWork> {
        let record: WorkRecord = self.get(&self.work_url(doi))?;
        Ok(record.into())
    }

    fn search_title(&self, title: &str, rows: usize) -> Result<Vec<RemoteWork>> {
        let results: SearchResults = self.get(&self.search_url(title, rows))?;
        Ok(results.items.into_iter().map(RemoteWork::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(mailto: Option<&str>) -> CrossrefClient {
        let config = RemoteConfig {
            mailto: mailto.map(str::to_string),
            base_url: "https://api.example.org/".to_string(),
            ..RemoteConfig::default()
        };
        CrossrefClient::new(&config).unwrap()
    }

    #[test]
    fn work_url_encodes_doi() {
        let c = client(None);
        assert_eq!(c.work_url("10.1000/a b"), "https://api.example.org/works/10.1000%2Fa%20b");
    }

    #[test]
    fn search_url_with_mailto() {
        let c = client(Some("me@example.org"));
        assert_eq!(
            c.search_url("Deep Learning", 3),
            "https://api.example.org/works?query.title=Deep%20Learning&rows=3&select=DOI,title&mailto=me%40example.org"
        );
    }

    #[test]
    fn rejects_unrepresentable_timeout() {
        for timeout in [f64::INFINITY, 1e30] {
            let config = RemoteConfig {
                timeout,
                ..RemoteConfig::default()
            };
            let err = CrossrefClient::new(&config).err().unwrap();
            assert!(matches!(err, RemoteError::InvalidTimeout(t) if t == timeout));
        }
    }

    #[test]
    fn clamps_small_timeout() {
        let config = RemoteConfig {
            timeout: 0.0,
            ..RemoteConfig::default()
        };
        assert!(CrossrefClient::new(&config).is_ok());
    }

    #[test]
    fn parse_work_envelope() {
        let body = r#"{"status":"ok","message":{"DOI":"10.1/x","title":["Deep Learning"],"publisher":"P"}}"#;
        let record: WorkRecord = parse_envelope(body).unwrap();
        let work = RemoteWork::from(record);
        assert_eq!(work.doi.as_deref(), Some("10.1/x"));
        assert_eq!(work.title.as_deref(), Some("Deep Learning"));
    }

    #[test]
    fn parse_search_envelope() {
        let body = r#"{"message":{"items":[{"DOI":"10.1/a","title":["A"]},{"title":[]}]}}"#;
        let results: SearchResults = parse_envelope(body).unwrap();
        let works: Vec<RemoteWork> = results.items.into_iter().map(RemoteWork::from).collect();
        assert_eq!(works.len(), 2);
        assert_eq!(works[1], RemoteWork::default());
    }

    #[test]
    fn parse_error_on_unexpected_shape() {
        let err = parse_envelope::<SearchResults>(r#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Parse(_)));
    }
}
