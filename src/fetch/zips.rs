use std::io::{Cursor, Read, Seek};

use tracing::{debug, instrument};
use zip::ZipArchive;

use super::Source;
use crate::error::ScrapeError;

/// Download the archive at `url` and return the raw bytes of `member`.
/// Nothing is cached; every call goes back to the network.
#[instrument(level = "debug", skip(source))]
pub async fn fetch_report<S: Source>(
    source: &S,
    url: &str,
    member: &str,
) -> Result<Vec<u8>, ScrapeError> {
    let resp = source.get(url).await?.error_for_status(url)?;
    debug!(bytes = resp.body.len(), "downloaded archive");
    extract_member(&resp.body, member)
}

/// Open `bytes` as a ZIP and read `member` into memory.
///
/// Falls back to a case-insensitive match on the file name, ignoring any
/// directory prefix, when the exact name is absent.
pub fn extract_member(bytes: &[u8], member: &str) -> Result<Vec<u8>, ScrapeError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ScrapeError::Archive(format!("cannot open archive: {}", e)))?;

    let name = resolve_member(&archive, member)
        .ok_or_else(|| ScrapeError::Archive(format!("{} not found in archive", member)))?;

    let mut entry = archive
        .by_name(&name)
        .map_err(|e| ScrapeError::Archive(format!("cannot open {}: {}", name, e)))?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut buf)
        .map_err(|e| ScrapeError::Archive(format!("failed to read {}: {}", name, e)))?;

    debug!(member = %name, bytes = buf.len(), "extracted archive member");
    Ok(buf)
}

fn resolve_member<R: Read + Seek>(archive: &ZipArchive<R>, member: &str) -> Option<String> {
    if archive.file_names().any(|n| n == member) {
        return Some(member.to_string());
    }
    let wanted = member.to_lowercase();
    archive
        .file_names()
        .find(|n| n.rsplit('/').next().is_some_and(|f| f.to_lowercase() == wanted))
        .map(str::to_string)
}
