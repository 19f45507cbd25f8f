use std::collections::HashMap;

use crate::models::{ClassifiedListing, RawListing, Verdict};

pub const REASON_GLOBAL_DEFAULT: &str = "global_filter";

pub const REASON_EIGHTSLEEP_MATCH: &str = "[eightsleep_filter] LATAM in location";
pub const REASON_EIGHTSLEEP_DEFAULT: &str = "eightsleep_filter";

pub const REASON_SUPABASE_MATCH: &str =
    "[supabase_filter] Location remote and specific to americas or global";
pub const REASON_SUPABASE_DEFAULT: &str = "supabase_filter";

pub const REASON_DEEL_MATCH: &str = "[deel_filter] Anywhere (LATAM) in location";
pub const REASON_DEEL_DEFAULT: &str = "deel_filter";

pub const REASON_POSTHOG_MATCH: &str = "[posthog_filter] Americas in location";
pub const REASON_POSTHOG_DEFAULT: &str = "posthog_filter";

fn lower(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

/// One company-specific relevance rule. Pure predicate over listing fields;
/// returns whether it matched plus the reason tag to record either way.
pub trait CompanyRule {
    fn evaluate(&self, listing: &RawListing) -> (bool, &'static str);
}

/// Matches when the primary location mentions LATAM.
struct LatamInLocation;

impl CompanyRule for LatamInLocation {
    fn evaluate(&self, listing: &RawListing) -> (bool, &'static str) {
        if lower(listing.location_name.as_deref()).contains("latam") {
            (true, REASON_EIGHTSLEEP_MATCH)
        } else {
            (false, REASON_EIGHTSLEEP_DEFAULT)
        }
    }
}

/// Matches Americas/US-time-zone roles, or fully-global remote roles.
/// A parenthesis in the title signals a region restriction (e.g. "(EMEA)"),
/// which disqualifies the plain-"Remote" path.
struct AmericasOrGlobalRemote;

impl CompanyRule for AmericasOrGlobalRemote {
    fn evaluate(&self, listing: &RawListing) -> (bool, &'static str) {
        let title = lower(Some(listing.title.as_str()));
        let location = lower(listing.location_name.as_deref());

        let is_americas = title.contains("americas") || title.contains("us time zones");
        let is_global_remote = !title.contains('(') && location == "remote";

        if is_americas || is_global_remote {
            (true, REASON_SUPABASE_MATCH)
        } else {
            (false, REASON_SUPABASE_DEFAULT)
        }
    }
}

/// Matches the literal "Anywhere (LATAM)" location the board uses for
/// region-open postings.
struct AnywhereLatam;

impl CompanyRule for AnywhereLatam {
    fn evaluate(&self, listing: &RawListing) -> (bool, &'static str) {
        if lower(listing.location_name.as_deref()).contains("anywhere (latam)") {
            (true, REASON_DEEL_MATCH)
        } else {
            (false, REASON_DEEL_DEFAULT)
        }
    }
}

/// Matches when the primary location mentions the Americas.
struct AmericasInLocation;

impl CompanyRule for AmericasInLocation {
    fn evaluate(&self, listing: &RawListing) -> (bool, &'static str) {
        if lower(listing.location_name.as_deref()).contains("americas") {
            (true, REASON_POSTHOG_MATCH)
        } else {
            (false, REASON_POSTHOG_DEFAULT)
        }
    }
}

/// Two-tier relevance evaluation: the global country rule always runs first
/// and short-circuits the company rule. Every evaluation produces a verdict,
/// match or not, so the outcome is auditable on every listing.
///
/// Adding a company is a `register` call, not a new branch.
pub struct RelevanceFilter {
    country: String,
    reason_title_or_location: String,
    reason_secondary_location: String,
    rules: HashMap<String, Box<dyn CompanyRule>>,
}

impl RelevanceFilter {
    pub fn new(country: &str) -> Self {
        let label = country.trim();
        let mut filter = Self {
            country: label.to_lowercase(),
            reason_title_or_location: format!("[global_filter] {label} in title or location"),
            reason_secondary_location: format!("[global_filter] {label} in secondary location"),
            rules: HashMap::new(),
        };
        filter.register("eightsleep", Box::new(LatamInLocation));
        filter.register("supabase", Box::new(AmericasOrGlobalRemote));
        filter.register("deel", Box::new(AnywhereLatam));
        filter.register("posthog", Box::new(AmericasInLocation));
        filter
    }

    pub fn register(&mut self, company: &str, rule: Box<dyn CompanyRule>) {
        self.rules.insert(company.to_string(), rule);
    }

    /// Evaluates one listing for one company. Pure: same inputs always give
    /// the same classified output.
    pub fn classify(&self, listing: &RawListing, company: &str) -> ClassifiedListing {
        let verdict = self.evaluate(listing, company);
        ClassifiedListing {
            listing: listing.clone(),
            verdict,
        }
    }

    fn evaluate(&self, listing: &RawListing, company: &str) -> Verdict {
        if let Some(verdict) = self.global_rule(listing) {
            return verdict;
        }

        match self.rules.get(company) {
            Some(rule) => {
                let (matched, reason) = rule.evaluate(listing);
                Verdict {
                    is_relevant: matched,
                    reason: reason.to_string(),
                }
            }
            None => Verdict {
                is_relevant: false,
                reason: REASON_GLOBAL_DEFAULT.to_string(),
            },
        }
    }

    /// Country match against title, primary location, then secondary
    /// locations, in that priority order. None means "fall through to the
    /// company rule".
    fn global_rule(&self, listing: &RawListing) -> Option<Verdict> {
        let title = lower(Some(listing.title.as_str()));
        let location = lower(listing.location_name.as_deref());

        if title.contains(&self.country) || location.contains(&self.country) {
            return Some(Verdict {
                is_relevant: true,
                reason: self.reason_title_or_location.clone(),
            });
        }

        for secondary in &listing.secondary_locations {
            if lower(secondary.location_name.as_deref()).contains(&self.country) {
                return Some(Verdict {
                    is_relevant: true,
                    reason: self.reason_secondary_location.clone(),
                });
            }
        }

        None
    }
}
