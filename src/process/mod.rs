// src/process/mod.rs
use serde::{Serialize, Serializer};

pub mod date_parser;
pub mod report;
pub mod states;

pub use date_parser::normalize_week_ending;
pub use report::{classify, parse_report, parse_report_text, ParsedReport, RowKind};
pub use states::{filter_states, StateAllowList};

/// Crop condition buckets, in the column order the report prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::VeryPoor,
        Condition::Poor,
        Condition::Fair,
        Condition::Good,
        Condition::Excellent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Condition::VeryPoor => "Very poor",
            Condition::Poor => "Poor",
            Condition::Fair => "Fair",
            Condition::Good => "Good",
            Condition::Excellent => "Excellent",
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One (state, bucket) observation for a survey week. Field order matches
/// the output header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionEntry {
    #[serde(rename = "Week ending")]
    pub week_ending: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Condition")]
    pub condition: Condition,
    #[serde(rename = "Percent")]
    pub percent: String,
}
