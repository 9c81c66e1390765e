use anyhow::{Context, Result};
use soyscraper::{fetch, pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration + client ───────────────────────────────────
    let config = Config::from_env().context("loading configuration")?;
    info!(
        year = config.year,
        states = config.states.len(),
        member = %config.archive_member,
        output = %config.output_dir.display(),
        "configured"
    );
    let client = fetch::build_client(config.request_timeout).context("building HTTP client")?;

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = pipeline::run(&client, &config)
        .await
        .with_context(|| format!("scraping {}", config.listing_url))?;

    println!("{}", summary);
    info!("all done");
    Ok(())
}
