use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::diff::diff;
use crate::fetch::BoardClient;
use crate::filter::RelevanceFilter;
use crate::models::{ChangeAction, NormalizedListing};
use crate::normalize::Normalizer;
use crate::store::{ApiClient, SnapshotStore};

/// Per-company result of one cycle, reported independently so one company's
/// failure never hides another's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The board page yielded nothing parseable; cycle skipped.
    NoData,
    Unchanged,
    Changed {
        inserted: usize,
        updated: usize,
        deleted: usize,
    },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::NoData => f.write_str("no data"),
            CycleOutcome::Unchanged => f.write_str("no changes"),
            CycleOutcome::Changed {
                inserted,
                updated,
                deleted,
            } => write!(f, "{inserted} inserted, {updated} updated, {deleted} deleted"),
        }
    }
}

/// Sequential fetch → filter → normalize → diff → persist pipeline. One
/// company at a time, no shared state between companies.
pub struct Pipeline {
    board: BoardClient,
    filter: RelevanceFilter,
    normalizer: Normalizer,
    store: SnapshotStore,
    api: ApiClient,
}

impl Pipeline {
    pub fn new(
        board: BoardClient,
        filter: RelevanceFilter,
        normalizer: Normalizer,
        store: SnapshotStore,
        api: ApiClient,
    ) -> Self {
        Self {
            board,
            filter,
            normalizer,
            store,
            api,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BoardClient::new(&config.board_url, config.timeout)?,
            RelevanceFilter::new(&config.country),
            Normalizer::new(&config.board_url),
            SnapshotStore::open(config.data_dir.clone())?,
            ApiClient::new(&config.api_url, config.timeout)?,
        ))
    }

    /// One cycle for one company. The snapshot only advances after every
    /// emitted change persisted; a partial failure leaves the previous
    /// snapshot in place so the next cycle recomputes and re-sends the same
    /// diff (at-least-once delivery, the API tolerates duplicates).
    pub fn run_company(&self, company: &str) -> Result<CycleOutcome> {
        let Some(raw_listings) = self.board.fetch_listings(company)? else {
            return Ok(CycleOutcome::NoData);
        };

        let current: Vec<NormalizedListing> = raw_listings
            .iter()
            .map(|raw| self.filter.classify(raw, company))
            .filter(|classified| classified.verdict.is_relevant)
            .map(|classified| self.normalizer.normalize(&classified, company))
            .collect();
        info!(
            company,
            total = raw_listings.len(),
            relevant = current.len(),
            "filtered and normalized listings"
        );

        let previous = self.store.load(company);
        let result = diff(&previous, &current);
        if result.is_unchanged {
            info!(company, "no new jobs");
            return Ok(CycleOutcome::Unchanged);
        }
        info!(company, differences = result.changes.len(), "differences found");

        for change in &result.changes {
            self.api
                .apply(change)
                .with_context(|| format!("Persisting changes failed for company: {company}"))?;
        }

        self.store.replace(company, &current)?;

        let count =
            |action: ChangeAction| result.changes.iter().filter(|c| c.action == action).count();
        Ok(CycleOutcome::Changed {
            inserted: count(ChangeAction::Insert),
            updated: count(ChangeAction::Update),
            deleted: count(ChangeAction::Delete),
        })
    }

    /// Processes every configured company in order, pausing between them.
    /// Failures are logged and reported per company; the loop always runs
    /// to the end.
    pub fn run_all(
        &self,
        companies: &[String],
        pause: Duration,
    ) -> Vec<(String, Result<CycleOutcome>)> {
        let mut report = Vec::with_capacity(companies.len());
        for (i, company) in companies.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                std::thread::sleep(pause);
            }
            info!(company, "processing company");
            let outcome = self.run_company(company);
            if let Err(err) = &outcome {
                error!(company, %err, "cycle failed");
            }
            report.push((company.clone(), outcome));
        }
        report
    }
}
