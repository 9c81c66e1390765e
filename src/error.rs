// src/error.rs

use std::path::PathBuf;

use reqwest::StatusCode;

/// Everything that can go wrong between the listing page and the output table.
///
/// `Retrieval` and `Transport` cover the network side, `Archive` a bad ZIP or a
/// missing member, `Format` a report we cannot read, and `Write` the output
/// table. The orchestrator decides which of these abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("GET {url} returned {status}")]
    Retrieval { url: String, status: StatusCode },

    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("format error: {0}")]
    Format(String),

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> ScrapeError {
        let path = path.into();
        move |source| ScrapeError::Write { path, source }
    }
}
