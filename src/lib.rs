pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;

pub use config::Config;
pub use error::ScrapeError;
pub use pipeline::{run, RunSummary};
