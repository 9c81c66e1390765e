// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use crate::{error::ScrapeError, process::states::StateAllowList};

/// Year whose archives are pulled when nothing else is configured.
pub const DEFAULT_YEAR: u16 = 2016;

/// Cornell/USDA listing page for the weekly Crop Progress release.
pub const DEFAULT_LISTING_URL: &str =
    "http://usda.mannlib.cornell.edu/MannUsda/viewDocumentInfo.do?documentID=1048";

/// The all-tables dump shipped inside every weekly archive.
pub const DEFAULT_ARCHIVE_MEMBER: &str = "prog_all_tables.csv";

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_OUTPUT_NAME: &str = "soybean_condition";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Run configuration, handed to [`crate::pipeline::run`].
#[derive(Debug, Clone)]
pub struct Config {
    pub year: u16,
    pub listing_url: String,
    pub states: StateAllowList,
    pub archive_member: String,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            states: StateAllowList::default(),
            archive_member: DEFAULT_ARCHIVE_MEMBER.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Defaults, overridden by any `SOYBEAN_*` variables in the environment.
    pub fn from_env() -> Result<Self, ScrapeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScrapeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(year) = get("SOYBEAN_YEAR") {
            cfg.year = year
                .trim()
                .parse()
                .map_err(|_| ScrapeError::Config(format!("SOYBEAN_YEAR={year:?} is not a year")))?;
        }
        if let Some(url) = get("SOYBEAN_LISTING_URL") {
            cfg.listing_url = url;
        }
        if let Some(member) = get("SOYBEAN_ARCHIVE_MEMBER") {
            cfg.archive_member = member;
        }
        if let Some(dir) = get("SOYBEAN_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = get("SOYBEAN_OUTPUT_NAME") {
            cfg.output_name = name;
        }
        if let Some(states) = get("SOYBEAN_STATES") {
            cfg.states = StateAllowList::new(states.split(','));
            if cfg.states.is_empty() {
                return Err(ScrapeError::Config(format!(
                    "SOYBEAN_STATES={states:?} names no states"
                )));
            }
        }
        if let Some(secs) = get("SOYBEAN_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ScrapeError::Config(format!("SOYBEAN_TIMEOUT_SECS={secs:?} is not a number"))
            })?;
            cfg.request_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }
}
