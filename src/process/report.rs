// src/process/report.rs
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, trace, warn};

use super::{date_parser::normalize_week_ending, Condition, ConditionEntry};
use crate::error::ScrapeError;

/// Table id of the condition tables in `prog_all_tables.csv`.
pub const CONDITION_TABLE_ID: &str = "35";
/// Row tag of a table title line.
pub const TITLE_TAG: &str = "t";
/// Row tag of a table data line.
pub const DATA_TAG: &str = "d";

const SOYBEAN_MARKER: &str = "Soybean Condition";
const WEEK_ENDING_MARKER: &str = "Week Ending";

const LABEL_FIELD: usize = 2;
const FIRST_BUCKET_FIELD: usize = 3;
const ABSENT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Title,
    Data,
    Other,
}

/// Classify a report row by its table id and row tag.
pub fn classify(record: &StringRecord) -> RowKind {
    match (record.get(0), record.get(1)) {
        (Some(CONDITION_TABLE_ID), Some(TITLE_TAG)) => RowKind::Title,
        (Some(CONDITION_TABLE_ID), Some(DATA_TAG)) => RowKind::Data,
        _ => RowKind::Other,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub entries: Vec<ConditionEntry>,
    /// Whether a "Soybean Condition" title was seen. This, not an empty
    /// `entries`, decides whether the archive held the table.
    pub soybean_table_found: bool,
    /// Data rows dropped because no week-ending title preceded them.
    pub skipped_rows: usize,
}

/// Decode the ISO-8859-1 report and extract the condition rows.
pub fn parse_report(raw: &[u8]) -> Result<ParsedReport, ScrapeError> {
    // encoding_rs maps the ISO-8859-1 label onto windows-1252
    let (text, _, had_errors) = WINDOWS_1252.decode(raw);
    if had_errors {
        debug!("report contained undecodable bytes");
    }
    parse_report_text(&text)
}

/// Walk the report rows, tracking the latest week-ending label and whether
/// the soybean table has been seen. Every data row of the condition table
/// yields one entry per bucket that is not `-`.
pub fn parse_report_text(text: &str) -> Result<ParsedReport, ScrapeError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut report = ParsedReport::default();
    let mut week_ending: Option<String> = None;

    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| ScrapeError::Format(format!("report record {}: {}", idx, e)))?;

        match classify(&record) {
            RowKind::Title => {
                let title = record.get(LABEL_FIELD).unwrap_or_default();
                if title.contains(SOYBEAN_MARKER) {
                    debug!(row = idx, title, "found soybean condition table");
                    report.soybean_table_found = true;
                }
                if let Some((_, date)) = title.split_once(WEEK_ENDING_MARKER) {
                    let date = normalize_week_ending(date)?;
                    trace!(row = idx, week_ending = %date, "week ending");
                    week_ending = Some(date);
                }
            }
            RowKind::Data => {
                let Some(week) = week_ending.as_deref() else {
                    warn!(row = idx, "data row before any week-ending title; dropped");
                    report.skipped_rows += 1;
                    continue;
                };
                let state = record.get(LABEL_FIELD).unwrap_or_default();
                for (offset, condition) in Condition::ALL.into_iter().enumerate() {
                    match record.get(FIRST_BUCKET_FIELD + offset) {
                        Some(percent) if !percent.is_empty() && percent != ABSENT => {
                            report.entries.push(ConditionEntry {
                                week_ending: week.to_string(),
                                state: state.to_string(),
                                condition,
                                percent: percent.to_string(),
                            });
                        }
                        _ => {}
                    }
                }
            }
            RowKind::Other => {}
        }
    }

    info!(
        entries = report.entries.len(),
        found = report.soybean_table_found,
        skipped = report.skipped_rows,
        "parsed report"
    );
    Ok(report)
}
