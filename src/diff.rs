use indexmap::IndexMap;
use tracing::debug;

use crate::models::{ChangeAction, ChangeRecord, NormalizedListing};

#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    pub is_unchanged: bool,
    pub changes: Vec<ChangeRecord>,
}

/// Reconciles the previous snapshot against the current run, keyed by the
/// canonical url. Emits Inserts, then Deletes, then Updates; within a
/// category the order follows the source collection, which the order
/// preserving maps keep stable.
///
/// Equality for the update check is structural over every field including
/// the relevance verdict: a reclassification alone is a change worth
/// re-persisting.
pub fn diff(previous: &[NormalizedListing], current: &[NormalizedListing]) -> DiffResult {
    let previous_by_url: IndexMap<&str, &NormalizedListing> =
        previous.iter().map(|j| (j.url.as_str(), j)).collect();
    let current_by_url: IndexMap<&str, &NormalizedListing> =
        current.iter().map(|j| (j.url.as_str(), j)).collect();

    let mut changes = Vec::new();

    for (&url, &listing) in &current_by_url {
        if !previous_by_url.contains_key(url) {
            debug!(url, "INSERT");
            changes.push(ChangeRecord {
                action: ChangeAction::Insert,
                listing: listing.clone(),
            });
        }
    }

    for (&url, &listing) in &previous_by_url {
        if !current_by_url.contains_key(url) {
            debug!(url, "DELETE");
            changes.push(ChangeRecord {
                action: ChangeAction::Delete,
                listing: listing.clone(),
            });
        }
    }

    for (&url, &old) in &previous_by_url {
        if let Some(&new) = current_by_url.get(url) {
            if new != old {
                debug!(url, "UPDATE");
                changes.push(ChangeRecord {
                    action: ChangeAction::Update,
                    listing: new.clone(),
                });
            }
        }
    }

    DiffResult {
        is_unchanged: changes.is_empty(),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Seniority, Verdict};

    fn listing(url: &str, title: &str) -> NormalizedListing {
        NormalizedListing {
            id: url.to_string(),
            title: title.to_string(),
            updated_at: None,
            employment_type: None,
            published_date: None,
            deadline: None,
            compensation: None,
            workplace_type: None,
            seniority_level: Seniority::MidLevel,
            field: Field::Engineering,
            company: "acme".to_string(),
            url: url.to_string(),
            relevance: Verdict {
                is_relevant: true,
                reason: "global_filter".to_string(),
            },
        }
    }

    #[test]
    fn test_diff_identical_collections_is_unchanged() {
        let snapshot = vec![listing("a", "X"), listing("b", "Y")];
        let result = diff(&snapshot, &snapshot);
        assert!(result.is_unchanged);
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_diff_both_empty_is_unchanged() {
        let result = diff(&[], &[]);
        assert!(result.is_unchanged);
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_diff_new_url_emits_insert() {
        let previous = vec![listing("a", "X")];
        let current = vec![listing("a", "X"), listing("b", "Y")];
        let result = diff(&previous, &current);

        assert!(!result.is_unchanged);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].action, ChangeAction::Insert);
        assert_eq!(result.changes[0].listing.url, "b");
    }

    #[test]
    fn test_diff_missing_url_emits_delete_with_previous_record() {
        let previous = vec![listing("a", "X")];
        let result = diff(&previous, &[]);

        assert!(!result.is_unchanged);
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].action, ChangeAction::Delete);
        assert_eq!(result.changes[0].listing.title, "X");
    }

    #[test]
    fn test_diff_changed_record_emits_update_with_current_record() {
        let previous = vec![listing("a", "X")];
        let current = vec![listing("a", "X2")];
        let result = diff(&previous, &current);

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].action, ChangeAction::Update);
        assert_eq!(result.changes[0].listing.title, "X2");
    }

    #[test]
    fn test_diff_verdict_drift_counts_as_update() {
        let previous = vec![listing("a", "X")];
        let mut reclassified = listing("a", "X");
        reclassified.relevance.reason = "[eightsleep_filter] LATAM in location".to_string();
        let result = diff(&previous, &[reclassified]);

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].action, ChangeAction::Update);
    }

    #[test]
    fn test_diff_emits_inserts_then_deletes_then_updates() {
        let previous = vec![listing("gone", "old"), listing("kept", "before")];
        let current = vec![listing("kept", "after"), listing("new", "fresh")];
        let result = diff(&previous, &current);

        let actions: Vec<ChangeAction> = result.changes.iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![
                ChangeAction::Insert,
                ChangeAction::Delete,
                ChangeAction::Update
            ]
        );
        assert_eq!(result.changes[0].listing.url, "new");
        assert_eq!(result.changes[1].listing.url, "gone");
        assert_eq!(result.changes[2].listing.url, "kept");
        assert_eq!(result.changes[2].listing.title, "after");
    }

    #[test]
    fn test_diff_category_order_follows_source_collections() {
        let previous = vec![listing("p1", "a"), listing("p2", "b"), listing("p3", "c")];
        let current = vec![listing("c1", "x"), listing("c2", "y")];
        let result = diff(&previous, &current);

        let urls: Vec<&str> = result
            .changes
            .iter()
            .map(|c| c.listing.url.as_str())
            .collect();
        assert_eq!(urls, vec!["c1", "c2", "p1", "p2", "p3"]);
    }

    #[test]
    fn test_diff_disjoint_collections_cover_every_url_once() {
        let previous: Vec<_> = (0..4).map(|i| listing(&format!("old-{i}"), "t")).collect();
        let current: Vec<_> = (0..3).map(|i| listing(&format!("new-{i}"), "t")).collect();
        let result = diff(&previous, &current);

        assert_eq!(result.changes.len(), previous.len() + current.len());
        let inserts = result
            .changes
            .iter()
            .filter(|c| c.action == ChangeAction::Insert)
            .count();
        let deletes = result
            .changes
            .iter()
            .filter(|c| c.action == ChangeAction::Delete)
            .count();
        assert_eq!(inserts, current.len());
        assert_eq!(deletes, previous.len());
    }
}
