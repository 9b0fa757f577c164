//! # prepkit
//!
//! Helpers for the input side of an image processing pipeline.
//!
//! - Download files over HTTP(S) with a progress bar ([`Fetcher`])
//! - Extract ZIP archives with a progress bar ([`unpack`])
//! - Read, write and validate images ([`imaging`])
//! - Small formatting helpers ([`util`]) and logging setup ([`logging`])
//!
//! Progress is reported through the [`Reporter`] trait, so the terminal bar
//! can be swapped for [`NoopReporter`] or any custom sink.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use prepkit::{ConsoleBar, Fetcher, unpack};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Fetcher::new()?;
//!     let archive = fetcher
//!         .fetch(
//!             "https://example.com/checkpoints.zip",
//!             Path::new("models/checkpoints.zip"),
//!             ConsoleBar::stdout(),
//!         )
//!         .await?;
//!
//!     unpack(&archive, Path::new("models"), ConsoleBar::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod imaging;
pub mod io;
pub mod logging;
pub mod progress;
pub mod unpack;
pub mod util;
pub mod zip;

pub use cli::Cli;
pub use config::{Config, Shape};
pub use error::{Error, ExtractionError, Result, TransferError, ValidationError};
pub use fetch::{Fetcher, TransferState, fetch_from};
pub use io::{ChunkSource, HttpSource, LocalFileReader, MemorySource, ReadAt};
pub use progress::{ConsoleBar, NoopReporter, Reporter};
pub use unpack::unpack;
pub use crate::zip::{ArchiveEntry, ZipExtractor};
