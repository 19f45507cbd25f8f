use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{ChangeAction, ChangeRecord, NormalizedListing};

/// Per-company snapshot files, one `last_<company>.json` each. The file
/// always reflects the last fully processed run: the pipeline only calls
/// `replace` after every change persisted.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(Self::default_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn default_dir() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "ashwatch") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    fn snapshot_path(&self, company: &str) -> PathBuf {
        self.dir.join(format!("last_{company}.json"))
    }

    /// Loads the previous snapshot. Missing, empty, or unparsable files all
    /// degrade to an empty collection: first run and recovery from a
    /// corrupt snapshot both become "everything is an insert".
    pub fn load(&self, company: &str) -> Vec<NormalizedListing> {
        let path = self.snapshot_path(company);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };
        if contents.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&contents) {
            Ok(listings) => listings,
            Err(err) => {
                warn!(company, %err, "snapshot unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn replace(&self, company: &str, listings: &[NormalizedListing]) -> Result<()> {
        let path = self.snapshot_path(company);
        let json = serde_json::to_string(listings)
            .with_context(|| format!("Failed to serialize snapshot for company: {company}"))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))
    }
}

/// Client for the remote persistence API. Insert treats "already exists"
/// (304) as success, update and delete treat "not found" (404) as success:
/// the pipeline re-sends the same batch after a partial failure, so every
/// operation has to tolerate a duplicate delivery.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build API HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn apply(&self, change: &ChangeRecord) -> Result<()> {
        match change.action {
            ChangeAction::Insert => self.insert(&change.listing),
            ChangeAction::Update => self.update(&change.listing),
            ChangeAction::Delete => self.delete(&change.listing),
        }
    }

    fn insert(&self, listing: &NormalizedListing) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/jobs", self.base_url))
            .json(listing)
            .send()
            .with_context(|| format!("Failed to insert job: {}", listing.url))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            info!(url = %listing.url, "job already exists in database");
            return Ok(());
        }
        if !response.status().is_success() {
            bail!(
                "Error inserting job: {} | Status: {}",
                listing.url,
                response.status()
            );
        }
        info!(url = %listing.url, "job inserted in database");
        Ok(())
    }

    fn update(&self, listing: &NormalizedListing) -> Result<()> {
        let response = self
            .http
            .put(format!("{}/jobs", self.base_url))
            .json(listing)
            .send()
            .with_context(|| format!("Failed to update job: {}", listing.url))?;

        if response.status() == StatusCode::NOT_FOUND {
            info!(url = %listing.url, "job does not exist in database");
            return Ok(());
        }
        if !response.status().is_success() {
            bail!(
                "Error updating job: {} | Status: {}",
                listing.url,
                response.status()
            );
        }
        info!(url = %listing.url, "job updated in database");
        Ok(())
    }

    fn delete(&self, listing: &NormalizedListing) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/jobs", self.base_url))
            .query(&[("url", listing.url.as_str())])
            .send()
            .with_context(|| format!("Failed to delete job: {}", listing.url))?;

        if response.status() == StatusCode::NOT_FOUND {
            info!(url = %listing.url, "job does not exist in database");
            return Ok(());
        }
        if !response.status().is_success() {
            bail!(
                "Error deleting job: {} | Status: {}",
                listing.url,
                response.status()
            );
        }
        info!(url = %listing.url, "job deleted from database");
        Ok(())
    }
}
