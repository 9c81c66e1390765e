use std::collections::HashSet;

use super::ConditionEntry;

/// The fifty US states, one correctly spelled name per entry.
pub const US_STATES: [&str; 50] = [
    "alabama",
    "alaska",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "florida",
    "georgia",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
];

/// Case-insensitive set of state names to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAllowList {
    names: HashSet<String>,
}

impl StateAllowList {
    /// Names are trimmed and lower-cased; blanks are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, state: &str) -> bool {
        self.names.contains(&state.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for StateAllowList {
    fn default() -> Self {
        Self::new(US_STATES)
    }
}

/// Keep only entries for allow-listed states, in their original order.
pub fn filter_states(entries: Vec<ConditionEntry>, allow: &StateAllowList) -> Vec<ConditionEntry> {
    entries
        .into_iter()
        .filter(|e| allow.contains(&e.state))
        .collect()
}
