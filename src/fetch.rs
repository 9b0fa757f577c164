//! Download a remote file to disk with progress reporting.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::TransferError;
use crate::io::{ChunkSource, HttpSource};
use crate::progress::Reporter;
use crate::util::format_size;

/// Largest piece written and reported at once
pub const CHUNK_SIZE: usize = 4096;

/// Bytes moved so far and the advertised total, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferState {
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

/// Downloads files over HTTP(S)
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, TransferError> {
        Ok(Self {
            client: HttpSource::client()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` to `dest`, returning `dest` unchanged
    pub async fn fetch<R: Reporter>(
        &self,
        url: &str,
        dest: &Path,
        reporter: R,
    ) -> Result<PathBuf, TransferError> {
        debug!("Download url: {} to path: {}", url, dest.display());

        let mut source = HttpSource::open(&self.client, url).await?;
        let path = fetch_from(&mut source, dest, reporter).await?;

        info!(
            "{} downloaded ({})",
            url,
            format_size(source.transferred_bytes())
        );
        Ok(path)
    }
}

/// Stream every chunk of `source` into `dest`.
///
/// Parent directories are created first. The file is truncated if it already
/// exists and is not removed when the transfer fails halfway.
pub async fn fetch_from<S, R>(
    source: &mut S,
    dest: &Path,
    mut reporter: R,
) -> Result<PathBuf, TransferError>
where
    S: ChunkSource + ?Sized,
    R: Reporter,
{
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut state = TransferState {
        bytes_transferred: 0,
        total_bytes: source.content_length(),
    };

    let mut file = fs::File::create(dest).await?;

    while let Some(chunk) = source.next_chunk().await? {
        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece).await?;
            state.bytes_transferred += piece.len() as u64;

            if let Some(total) = state.total_bytes {
                reporter.report(state.bytes_transferred, total);
            }
        }
    }

    file.flush().await?;
    reporter.finish();

    debug!(
        bytes = state.bytes_transferred,
        total = ?state.total_bytes,
        "transfer complete"
    );
    Ok(dest.to_path_buf())
}
