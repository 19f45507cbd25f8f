use serde::{Deserialize, Serialize};
use std::fmt;

/// One job posting exactly as the board's embedded app data delivers it.
/// Unknown keys are ignored; missing keys fall back to defaults so a
/// half-filled posting never fails deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawListing {
    pub id: String,
    pub title: String,
    pub updated_at: Option<String>,
    pub department_name: Option<String>,
    pub location_name: Option<String>,
    pub workplace_type: Option<String>,
    pub employment_type: Option<String>,
    pub is_listed: Option<bool>,
    pub published_date: Option<String>,
    pub application_deadline: Option<String>,
    pub compensation_tier_summary: Option<String>,
    pub secondary_locations: Vec<SecondaryLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecondaryLocation {
    pub location_name: Option<String>,
}

/// Outcome of the relevance evaluation. The reason is a machine-checkable
/// tag identifying which rule fired, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_relevant: bool,
    pub reason: String,
}

/// A raw listing plus its relevance verdict. Built once by the filter,
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClassifiedListing {
    pub listing: RawListing,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    Intern,
    Junior,
    #[serde(rename = "Mid Level")]
    MidLevel,
    Senior,
    Staff,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Intern => "Intern",
            Seniority::Junior => "Junior",
            Seniority::MidLevel => "Mid Level",
            Seniority::Senior => "Senior",
            Seniority::Staff => "Staff",
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Engineering,
    Data,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    Design,
    Product,
    Support,
    #[serde(rename = "QA")]
    Qa,
    Other,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Engineering => "Engineering",
            Field::Data => "Data",
            Field::MachineLearning => "Machine Learning",
            Field::Design => "Design",
            Field::Product => "Product",
            Field::Support => "Support",
            Field::Qa => "QA",
            Field::Other => "Other",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical, persisted shape of a listing. Field-for-field equality
/// (including the verdict) is what the differencer uses to detect updates,
/// so any drift in classification shows up as an UPDATE downstream.
///
/// The reconciliation key is `url`, not `id`: the platform-side `id` has
/// changed across board revisions while the public posting URL stays stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedListing {
    pub id: String,
    pub title: String,
    pub updated_at: Option<String>,
    pub employment_type: Option<String>,
    pub published_date: Option<String>,
    pub deadline: Option<String>,
    pub compensation: Option<String>,
    pub workplace_type: Option<String>,
    pub seniority_level: Seniority,
    pub field: Field,
    pub company: String,
    pub url: String,
    pub relevance: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeAction::Insert => "INSERT",
            ChangeAction::Update => "UPDATE",
            ChangeAction::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// One unit of insert/update/delete work destined for the persistence API.
/// Transient: produced by the differencer, consumed downstream, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub action: ChangeAction,
    #[serde(flatten)]
    pub listing: NormalizedListing,
}
