//! Extract a zip archive into a directory with progress reporting.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::io::LocalFileReader;
use crate::progress::Reporter;
use crate::zip::{ArchiveEntry, ZipExtractor};

/// Map an archive path onto `dest_dir`.
///
/// Root, drive prefixes, `.` and `..` components are dropped so an entry can
/// never land outside `dest_dir`. `None` when nothing is left.
pub fn entry_output_path(dest_dir: &Path, relative_path: &str) -> Option<PathBuf> {
    let mut out = dest_dir.to_path_buf();
    let mut pushed = false;

    // Archives from Windows tools sometimes use backslashes
    for part in relative_path.split(['/', '\\']) {
        let mut components = Path::new(part).components();
        if let (Some(Component::Normal(name)), None) = (components.next(), components.next()) {
            out.push(name);
            pushed = true;
        }
    }

    pushed.then_some(out)
}

/// Extract every entry of `archive_path` under `dest_dir`.
///
/// Progress is reported before each entry from the sizes of the entries
/// already extracted, so a single huge entry holds the bar still until it is
/// done. Existing files are overwritten; nothing is rolled back on failure.
pub async fn unpack<R: Reporter>(
    archive_path: &Path,
    dest_dir: &Path,
    mut reporter: R,
) -> Result<(), ExtractionError> {
    debug!(
        "Extracting zip: {} to path: {}",
        archive_path.display(),
        dest_dir.display()
    );

    fs::create_dir_all(dest_dir).await?;

    let reader = Arc::new(LocalFileReader::new(archive_path)?);
    let extractor = ZipExtractor::new(reader);
    let entries = extractor.list_files().await?;

    let total_bytes = entries
        .iter()
        .try_fold(0u64, |sum, e| sum.checked_add(e.uncompressed_size))
        .ok_or_else(|| ExtractionError::malformed("total uncompressed size overflows"))?;
    let mut extracted_bytes = 0u64;

    for entry in &entries {
        if total_bytes > 0 {
            reporter.report(extracted_bytes, total_bytes);
        }

        extract_entry(&extractor, entry, dest_dir).await?;
        extracted_bytes = extracted_bytes.saturating_add(entry.uncompressed_size);
    }

    reporter.finish();

    info!(
        "{} extracted ({} entries, {} bytes)",
        archive_path.display(),
        entries.len(),
        total_bytes
    );
    Ok(())
}

async fn extract_entry(
    extractor: &ZipExtractor<LocalFileReader>,
    entry: &ArchiveEntry,
    dest_dir: &Path,
) -> Result<(), ExtractionError> {
    let Some(output_path) = entry_output_path(dest_dir, &entry.relative_path) else {
        warn!("skipping entry with unusable path: {:?}", entry.relative_path);
        return Ok(());
    };

    if entry.is_directory {
        fs::create_dir_all(&output_path).await?;
        return Ok(());
    }

    debug!("  extracting: {}", entry.relative_path);
    extractor.extract_to_file(entry, &output_path).await?;
    Ok(())
}
