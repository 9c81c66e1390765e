use std::str::FromStr;

use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScrapeError;

static WEEK_ENDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\d{1,2}),\s*(\d{4})$").expect("week-ending pattern should compile")
});

/// `"November 6, 2012"` → `"2012-11-06"`
pub fn normalize_week_ending(s: &str) -> Result<String, ScrapeError> {
    let s = s.trim();
    let bad = || ScrapeError::Format(format!("unrecognised week-ending date {:?}", s));

    let caps = WEEK_ENDING.captures(s).ok_or_else(bad)?;
    let month = Month::from_str(&caps[1]).map_err(|_| bad())?;
    let day: u32 = caps[2].parse().map_err(|_| bad())?;
    let year: i32 = caps[3].parse().map_err(|_| bad())?;

    let date = NaiveDate::from_ymd_opt(year, month.number_from_month(), day).ok_or_else(bad)?;
    Ok(date.format("%Y-%m-%d").to_string())
}
