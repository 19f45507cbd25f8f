use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

/// Startup configuration, read from the environment exactly once and
/// threaded into the components that need it. Nothing below `main` touches
/// env vars.
#[derive(Debug, Clone)]
pub struct Config {
    pub companies: Vec<String>,
    /// Public board base URL, normalized to end with a slash. Used both to
    /// fetch listings and to build canonical posting URLs.
    pub board_url: String,
    pub api_url: String,
    pub country: String,
    pub timeout: Duration,
    pub interval: Duration,
    /// Delay between companies within one run.
    pub pause: Duration,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Missing or malformed required keys are fatal here, at startup; they
    /// never surface as per-cycle errors.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            companies: parse_companies(&require("ASHWATCH_COMPANIES")?)?,
            board_url: with_trailing_slash(&require("ASHWATCH_BOARD_URL")?),
            api_url: require("ASHWATCH_API_URL")?
                .trim()
                .trim_end_matches('/')
                .to_string(),
            country: std::env::var("ASHWATCH_COUNTRY").unwrap_or_else(|_| "Brazil".to_string()),
            timeout: Duration::from_secs(secs_or("ASHWATCH_TIMEOUT_SECS", 10)?),
            interval: Duration::from_secs(secs_or("ASHWATCH_INTERVAL_SECS", 3600)?),
            pause: Duration::from_secs(secs_or("ASHWATCH_PAUSE_SECS", 3)?),
            data_dir: std::env::var("ASHWATCH_DATA_DIR").ok().map(PathBuf::from),
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} environment variable not set"))
}

fn secs_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}

fn parse_companies(raw: &str) -> Result<Vec<String>> {
    let companies: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if companies.is_empty() {
        bail!("ASHWATCH_COMPANIES does not name any company");
    }
    Ok(companies)
}

fn with_trailing_slash(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_companies_splits_and_trims() {
        let companies = parse_companies(" eightsleep, supabase ,deel,,").unwrap();
        assert_eq!(companies, vec!["eightsleep", "supabase", "deel"]);
    }

    #[test]
    fn test_parse_companies_rejects_empty_list() {
        assert!(parse_companies(" , ,").is_err());
        assert!(parse_companies("").is_err());
    }

    #[test]
    fn test_with_trailing_slash() {
        assert_eq!(
            with_trailing_slash("https://jobs.ashbyhq.com"),
            "https://jobs.ashbyhq.com/"
        );
        assert_eq!(
            with_trailing_slash("https://jobs.ashbyhq.com/ "),
            "https://jobs.ashbyhq.com/"
        );
    }
}
