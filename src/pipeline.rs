// src/pipeline.rs

use std::{fmt, path::PathBuf};

use chrono::Local;
use tracing::{error, info, instrument, warn};

use crate::{
    config::Config,
    error::ScrapeError,
    fetch::{urls::discover_links, zips::fetch_report, Source},
    output::OutputTable,
    process::{filter_states, parse_report, ConditionEntry},
};

/// Tallies for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Archive links considered.
    pub files: usize,
    /// Archives that contained the soybean condition table.
    pub found: usize,
    /// Found tables appended to the output without error.
    pub written: usize,
    pub entries_written: usize,
    pub output: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} files contained the soybean condition table, {}/{} written ({} rows) to {}",
            self.found,
            self.files,
            self.written,
            self.found,
            self.entries_written,
            self.output.display()
        )
    }
}

/// Discover → create output → per link: extract, parse, filter, append.
///
/// Only a failed listing fetch or a failure to create the output table
/// aborts the run; anything that goes wrong for a single archive is logged
/// and that archive is skipped.
pub async fn run<S: Source>(source: &S, config: &Config) -> Result<RunSummary, ScrapeError> {
    info!(year = config.year, url = %config.listing_url, "starting run");
    let links = discover_links(source, &config.listing_url, config.year).await?;

    let mut table = OutputTable::create(
        &config.output_dir,
        &config.output_name,
        Local::now().naive_local(),
    )?;

    let mut found = 0;
    let mut written = 0;

    for link in &links {
        let entries = match process_link(source, link, config).await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                info!(url = %link, "no soybean condition table");
                continue;
            }
            Err(e) => {
                error!(url = %link, error = %e, "skipping archive");
                continue;
            }
        };
        found += 1;

        match table.append(&entries) {
            Ok(n) => {
                written += 1;
                info!(url = %link, rows = n, "appended");
            }
            Err(e) => error!(url = %link, error = %e, "write failed"),
        }
    }

    let summary = RunSummary {
        files: links.len(),
        found,
        written,
        entries_written: table.rows(),
        output: table.path().to_path_buf(),
    };
    info!(
        files = summary.files,
        found = summary.found,
        written = summary.written,
        rows = summary.entries_written,
        "run complete"
    );
    Ok(summary)
}

/// `Ok(None)` when the archive parsed fine but held no soybean table.
#[instrument(level = "info", skip(source, config))]
async fn process_link<S: Source>(
    source: &S,
    link: &str,
    config: &Config,
) -> Result<Option<Vec<ConditionEntry>>, ScrapeError> {
    let raw = fetch_report(source, link, &config.archive_member).await?;
    let report = parse_report(&raw)?;
    if !report.soybean_table_found {
        return Ok(None);
    }

    let total = report.entries.len();
    let kept = filter_states(report.entries, &config.states);
    if kept.len() < total {
        warn!(dropped = total - kept.len(), "entries outside the state allow-list");
    }
    Ok(Some(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetched;
    use crate::process::StateAllowList;
    use anyhow::Result;
    use reqwest::StatusCode;
    use std::{collections::HashMap, fs, io::Cursor, io::Write};
    use tempfile::tempdir;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    const LISTING: &str = "http://listing.test/crop-progress";
    const MEMBER: &str = "prog_all_tables.csv";

    /// Canned responses by URL; anything else is a 404.
    #[derive(Default)]
    struct Canned(HashMap<String, Fetched>);

    impl Canned {
        fn ok(mut self, url: &str, body: Vec<u8>) -> Self {
            self.0.insert(
                url.to_string(),
                Fetched {
                    status: StatusCode::OK,
                    body,
                },
            );
            self
        }
    }

    impl Source for Canned {
        async fn get(&self, url: &str) -> Result<Fetched, ScrapeError> {
            Ok(self.0.get(url).cloned().unwrap_or(Fetched {
                status: StatusCode::NOT_FOUND,
                body: Vec::new(),
            }))
        }
    }

    fn zip_with(name: &str, content: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
            zip.finish()?;
        }
        Ok(buf)
    }

    fn listing(year: u16, links: &[&str]) -> Vec<u8> {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">zip</a>"#, l))
            .collect();
        format!(r#"<html><body><div id="n{}">{}</div></body></html>"#, year, anchors).into_bytes()
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            year: 2001,
            listing_url: LISTING.to_string(),
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    const SOYBEANS: &str = "35,t,\"Soybean Condition Week Ending November 30, 2001\",\n\
                            35,d,Texas,35,34,12,8,10\n\
                            35,d,United States,1,2,3,4,5\n";
    const CORN: &str = "35,t,\"Corn Condition Week Ending November 30, 2001\",\n\
                        35,d,Texas,1,2,3,4,5\n";

    #[tokio::test]
    async fn counts_found_and_written_per_archive() -> Result<()> {
        let dir = tempdir()?;
        let source = Canned::default()
            .ok(LISTING, listing(2001, &["http://a.test/1.zip", "http://a.test/2.zip"]))
            .ok("http://a.test/1.zip", zip_with(MEMBER, SOYBEANS)?)
            .ok("http://a.test/2.zip", zip_with(MEMBER, CORN)?);

        let summary = run(&source, &config(dir.path())).await?;
        assert_eq!(summary.files, 2);
        assert_eq!(summary.found, 1);
        assert!(summary.written <= summary.found);
        assert_eq!(summary.written, 1);
        // "United States" is not an allow-listed state
        assert_eq!(summary.entries_written, 5);

        let text = fs::read_to_string(&summary.output)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Week ending,State,Condition,Percent");
        assert_eq!(lines[1], "2001-11-30,Texas,Very poor,35");
        assert_eq!(lines[5], "2001-11-30,Texas,Excellent,10");
        Ok(())
    }

    #[tokio::test]
    async fn broken_archives_are_skipped() -> Result<()> {
        let dir = tempdir()?;
        let source = Canned::default()
            .ok(
                LISTING,
                listing(
                    2001,
                    &[
                        "http://a.test/missing.zip",
                        "http://a.test/garbage.zip",
                        "http://a.test/wrong-member.zip",
                        "http://a.test/bad-date.zip",
                        "http://a.test/good.zip",
                    ],
                ),
            )
            .ok("http://a.test/garbage.zip", b"not a zip".to_vec())
            .ok("http://a.test/wrong-member.zip", zip_with("other.csv", SOYBEANS)?)
            .ok(
                "http://a.test/bad-date.zip",
                zip_with(MEMBER, "35,t,\"Soybean Condition Week Ending Nov 31 2001\"\n")?,
            )
            .ok("http://a.test/good.zip", zip_with(MEMBER, SOYBEANS)?);

        let summary = run(&source, &config(dir.path())).await?;
        assert_eq!(summary.files, 5);
        assert_eq!(summary.found, 1);
        assert_eq!(summary.written, 1);
        Ok(())
    }

    #[tokio::test]
    async fn state_filter_comes_from_config() -> Result<()> {
        let dir = tempdir()?;
        let source = Canned::default()
            .ok(LISTING, listing(2001, &["http://a.test/1.zip"]))
            .ok("http://a.test/1.zip", zip_with(MEMBER, SOYBEANS)?);
        let cfg = Config {
            states: StateAllowList::new(["iowa"]),
            ..config(dir.path())
        };

        let summary = run(&source, &cfg).await?;
        // table found and written, just with nothing in it
        assert_eq!((summary.found, summary.written, summary.entries_written), (1, 1, 0));
        Ok(())
    }

    #[tokio::test]
    async fn empty_year_still_creates_output() -> Result<()> {
        let dir = tempdir()?;
        let source = Canned::default().ok(LISTING, listing(1999, &["http://a.test/1.zip"]));

        let summary = run(&source, &config(dir.path())).await?;
        assert_eq!((summary.files, summary.found, summary.written), (0, 0, 0));
        assert!(summary.output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn listing_failure_aborts_run() {
        let dir = tempdir().unwrap();
        let err = run(&Canned::default(), &config(dir.path())).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Retrieval { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Removes every file under `dir` when `trigger` is fetched.
    struct Wiping {
        inner: Canned,
        trigger: &'static str,
        dir: std::path::PathBuf,
    }

    impl Source for Wiping {
        async fn get(&self, url: &str) -> Result<Fetched, ScrapeError> {
            if url == self.trigger {
                for entry in fs::read_dir(&self.dir).expect("output dir readable") {
                    fs::remove_file(entry.expect("dir entry").path()).expect("output removable");
                }
            }
            self.inner.get(url).await
        }
    }

    #[tokio::test]
    async fn write_failure_counts_as_found_but_not_written() -> Result<()> {
        let dir = tempdir()?;
        let links = ["http://a.test/1.zip", "http://a.test/2.zip", "http://a.test/3.zip"];
        let mut inner = Canned::default().ok(LISTING, listing(2001, &links));
        for link in links {
            inner = inner.ok(link, zip_with(MEMBER, SOYBEANS)?);
        }
        let source = Wiping {
            inner,
            trigger: "http://a.test/2.zip",
            dir: dir.path().to_path_buf(),
        };

        let summary = run(&source, &config(dir.path())).await?;
        assert_eq!(summary.files, 3);
        // the third archive was still fetched and parsed after the failed write
        assert_eq!(summary.found, 3);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.entries_written, 5);
        Ok(())
    }

    /// Fails with a transport error on `url`, otherwise defers to `inner`.
    struct Unreachable {
        inner: Canned,
        url: &'static str,
    }

    impl Source for Unreachable {
        async fn get(&self, url: &str) -> Result<Fetched, ScrapeError> {
            if url == self.url {
                // an unparseable URL fails in reqwest before any network I/O
                let err = reqwest::Client::new()
                    .get("not a url")
                    .send()
                    .await
                    .expect_err("invalid URL must not send");
                return Err(ScrapeError::Transport(err));
            }
            self.inner.get(url).await
        }
    }

    #[tokio::test]
    async fn transport_failure_on_archive_is_isolated() -> Result<()> {
        let dir = tempdir()?;
        let source = Unreachable {
            inner: Canned::default()
                .ok(LISTING, listing(2001, &["http://a.test/1.zip", "http://a.test/2.zip"]))
                .ok("http://a.test/2.zip", zip_with(MEMBER, SOYBEANS)?),
            url: "http://a.test/1.zip",
        };

        let summary = run(&source, &config(dir.path())).await?;
        assert_eq!((summary.files, summary.found, summary.written), (2, 1, 1));
        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_on_listing_aborts_run() {
        let dir = tempdir().unwrap();
        let source = Unreachable {
            inner: Canned::default(),
            url: LISTING,
        };
        let err = run(&source, &config(dir.path())).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Transport(_)));
    }
}
