use anyhow::{Context, Result, bail};
use regex::Regex;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::RawListing;

/// The board renders listings into a script tag; DOTALL because the blob
/// spans lines.
const APP_DATA_PATTERN: &str = r"(?s)window\.__appData\s*=\s*(\{.*?\});";

/// Retrieves raw job postings for one company from the public board page.
pub struct BoardClient {
    http: reqwest::blocking::Client,
    base_url: String,
    app_data: Regex,
}

impl BoardClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build board HTTP client")?;
        let app_data = Regex::new(APP_DATA_PATTERN).context("Invalid app data pattern")?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            app_data,
        })
    }

    /// Fetches the board page and extracts the postings embedded in its
    /// `window.__appData` blob.
    ///
    /// Transport failures and non-success statuses are errors (transient;
    /// the cycle is retried next run). A page without a parseable blob is
    /// `Ok(None)`: no data, skip the cycle without touching the snapshot.
    /// A valid blob with an empty posting list is `Ok(Some(vec![]))` and
    /// flows through the pipeline.
    pub fn fetch_listings(&self, company: &str) -> Result<Option<Vec<RawListing>>> {
        let url = format!("{}{}", self.base_url, company);
        let response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch board page for company: {company}"))?;

        if !response.status().is_success() {
            bail!(
                "Board page request failed for company: {company} | Status: {}",
                response.status()
            );
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read board page body for company: {company}"))?;

        Ok(self.extract_postings(company, &body))
    }

    fn extract_postings(&self, company: &str, body: &str) -> Option<Vec<RawListing>> {
        let Some(captures) = self.app_data.captures(body) else {
            warn!(company, "app data not found in page");
            return None;
        };
        let blob = captures.get(1)?.as_str();

        let app_data: serde_json::Value = match serde_json::from_str(blob) {
            Ok(value) => value,
            Err(err) => {
                warn!(company, %err, "failed to parse app data JSON");
                return None;
            }
        };

        let Some(postings) = app_data.pointer("/jobBoard/jobPostings") else {
            warn!(company, "unexpected app data structure");
            return None;
        };

        match serde_json::from_value::<Vec<RawListing>>(postings.clone()) {
            Ok(listings) => {
                info!(company, total = listings.len(), "extracted job postings");
                Some(listings)
            }
            Err(err) => {
                warn!(company, %err, "job postings have unexpected shape");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BoardClient {
        BoardClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn page(postings_json: &str) -> String {
        format!(
            "<html><script>window.__appData = {{\"jobBoard\": {{\"jobPostings\": {postings_json}}}}};</script></html>"
        )
    }

    #[test]
    fn test_fetch_listings_extracts_postings() {
        let mut server = mockito::Server::new();
        let body = page(
            r#"[{"id": "j1", "title": "Engineer", "locationName": "Remote"},
               {"id": "j2", "title": "Designer"}]"#,
        );
        let _mock = server
            .mock("GET", "/acme")
            .with_status(200)
            .with_body(body)
            .create();

        let listings = client(&format!("{}/", server.url()))
            .fetch_listings("acme")
            .unwrap()
            .unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, "j1");
        assert_eq!(listings[0].location_name.as_deref(), Some("Remote"));
    }

    #[test]
    fn test_fetch_listings_empty_board_is_some_empty() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/acme")
            .with_status(200)
            .with_body(page("[]"))
            .create();

        let listings = client(&format!("{}/", server.url()))
            .fetch_listings("acme")
            .unwrap();
        assert_eq!(listings.map(|l| l.len()), Some(0));
    }

    #[test]
    fn test_fetch_listings_non_success_status_is_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/acme").with_status(502).create();

        let result = client(&format!("{}/", server.url())).fetch_listings("acme");
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_listings_page_without_blob_is_none() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/acme")
            .with_status(200)
            .with_body("<html><body>no jobs here</body></html>")
            .create();

        let result = client(&format!("{}/", server.url()))
            .fetch_listings("acme")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_fetch_listings_malformed_blob_is_none() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/acme")
            .with_status(200)
            .with_body("<script>window.__appData = {\"jobBoard\": \"oops\"};</script>")
            .create();

        let result = client(&format!("{}/", server.url()))
            .fetch_listings("acme")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_extract_postings_spans_multiple_lines() {
        let board = client("http://unused/");
        let body = "window.__appData = {\n  \"jobBoard\": {\n    \"jobPostings\": [\n      {\"id\": \"j1\", \"title\": \"Engineer\"}\n    ]\n  }\n};";
        let listings = board.extract_postings("acme", body).unwrap();
        assert_eq!(listings.len(), 1);
    }
}
