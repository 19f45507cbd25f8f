use crate::models::{ClassifiedListing, Field, NormalizedListing, Seniority};

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Seniority from the lower-cased title, first match wins. The ordering is
/// deliberate: management language ("manager", bare "lead") pushes a title
/// to Staff unless an explicit IC qualifier ("senior", "tech lead",
/// "team lead") pulls it back down to Senior.
pub fn classify_seniority(title: &str) -> Seniority {
    let title = title.to_lowercase();
    let has = |needle: &str| title.contains(needle);

    if has("staff")
        || has("director")
        || has("head")
        || (has("manager") && !has("senior"))
        || (has("lead") && !has("tech lead") && !has("team lead"))
    {
        Seniority::Staff
    } else if has("senior") || has("sr.") || has("lead") || has("architect") || has("expert") {
        Seniority::Senior
    } else if has("junior") || has("entry_level") || has("associate") {
        Seniority::Junior
    } else if has("intern") {
        Seniority::Intern
    } else {
        Seniority::MidLevel
    }
}

/// Functional area from the lower-cased department and title, first match
/// wins. Engineering sits near the bottom as the catch-most bucket, guarded
/// against "growth engineer" marketing roles and hardware departments.
pub fn classify_field(department: Option<&str>, title: &str) -> Field {
    let department = department.unwrap_or("").to_lowercase();
    let title = title.to_lowercase();

    if department.contains("data") || department.contains("s&m") || title.contains("data scientist")
    {
        Field::Data
    } else if title.contains("ml") || title.contains("machine learning") || title.contains("ai") {
        Field::MachineLearning
    } else if department.contains("design")
        || title.contains("ux")
        || title.contains("ui")
        || title.contains("design")
    {
        Field::Design
    } else if department.contains("product") {
        Field::Product
    } else if department.contains("support") || title.contains("it ") || title.contains("support") {
        Field::Support
    } else if title.contains("qa") {
        Field::Qa
    } else if (department.contains("engineering") && !department.contains("hardware"))
        || (title.contains("engineer") && !title.contains("growth"))
    {
        Field::Engineering
    } else {
        Field::Other
    }
}

/// Maps classified listings into the canonical persisted shape: trims text
/// fields, derives seniority and field, and builds the public posting URL.
pub struct Normalizer {
    base_url: String,
}

impl Normalizer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    pub fn normalize(&self, classified: &ClassifiedListing, company: &str) -> NormalizedListing {
        let listing = &classified.listing;
        NormalizedListing {
            id: listing.id.trim().to_string(),
            title: listing.title.trim().to_string(),
            updated_at: trimmed(listing.updated_at.as_deref()),
            employment_type: trimmed(listing.employment_type.as_deref()),
            published_date: trimmed(listing.published_date.as_deref()),
            deadline: trimmed(listing.application_deadline.as_deref()),
            compensation: trimmed(listing.compensation_tier_summary.as_deref()),
            workplace_type: trimmed(listing.workplace_type.as_deref()),
            seniority_level: classify_seniority(&listing.title),
            field: classify_field(listing.department_name.as_deref(), &listing.title),
            company: company.trim().to_string(),
            url: self.listing_url(company, &listing.id),
            relevance: classified.verdict.clone(),
        }
    }

    /// `base_url` + company (spaces as %20) + "/" + raw listing id. The id
    /// is the identity component and is passed through untouched.
    fn listing_url(&self, company: &str, listing_id: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            company.replace(' ', "%20"),
            listing_id
        )
    }
}
