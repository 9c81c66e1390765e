// src/fetch/mod.rs

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::ScrapeError;

pub mod urls;
pub mod zips;

/// Status and body of a single GET.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn error_for_status(self, url: &str) -> Result<Self, ScrapeError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ScrapeError::Retrieval {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

/// Anything that can answer a GET. Implemented for `reqwest::Client`; tests
/// swap in canned responses.
#[allow(async_fn_in_trait)]
pub trait Source {
    async fn get(&self, url: &str) -> Result<Fetched, ScrapeError>;
}

impl Source for Client {
    async fn get(&self, url: &str) -> Result<Fetched, ScrapeError> {
        debug!("Fetching {}", url);
        let resp = Client::get(self, url).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        debug!(%url, %status, bytes = body.len(), "fetched");
        Ok(Fetched { status, body })
    }
}

/// HTTP client with a per-request timeout. A timed-out request surfaces as
/// `ScrapeError::Transport`.
pub fn build_client(timeout: Duration) -> Result<Client, ScrapeError> {
    Ok(Client::builder().timeout(timeout).build()?)
}
