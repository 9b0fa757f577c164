//! ZIP archive parsing and extraction.
//!
//! - [`structures`]: the fixed-layout records (EOCD, ZIP64 records, header constants)
//!   and the parsed [`ArchiveEntry`]
//! - [`parser`]: locating and decoding the central directory through [`ReadAt`](crate::io::ReadAt)
//! - [`extractor`]: decoding entry data to memory or disk
//!
//! The central directory at the end of the archive is read first, so the full
//! entry list (with uncompressed sizes) is known before anything is extracted.
//!
//! Supported: standard ZIP, ZIP64 sizes and offsets, STORED and DEFLATE.
//! Not supported: encryption, multi-disk archives, other compression methods.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
