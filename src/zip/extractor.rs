use flate2::Crc;
use flate2::write::DeflateDecoder;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::ExtractionError;
use crate::io::ReadAt;

use super::parser::ZipParser;
use super::structures::{ArchiveEntry, CompressionMethod};

type Result<T> = std::result::Result<T, ExtractionError>;

/// Bytes read from the archive per step
const BLOCK_SIZE: u64 = 64 * 1024;

/// Writes decoded bytes out while tracking their checksum and length
struct Sink<'a, W> {
    out: &'a mut W,
    crc: Crc,
    written: u64,
}

impl<W: AsyncWrite + Unpin> Sink<'_, W> {
    async fn put(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.crc.update(data);
        self.written += data.len() as u64;
        self.out.write_all(data).await?;
        Ok(())
    }
}

fn corrupt_stream(entry: &ArchiveEntry, err: std::io::Error) -> ExtractionError {
    ExtractionError::malformed(format!(
        "corrupt deflate stream in {}: {}",
        entry.relative_path, err
    ))
}

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive
    pub async fn list_files(&self) -> Result<Vec<ArchiveEntry>> {
        self.parser.list_files().await
    }

    /// Decode an entry into `out`, checking its size and CRC-32.
    ///
    /// Returns the number of bytes written.
    pub async fn copy_entry<W>(&self, entry: &ArchiveEntry, out: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            return Err(ExtractionError::UnsupportedCompression {
                name: entry.relative_path.clone(),
                method,
            });
        }

        let reader = self.parser.reader();
        let mut offset = self.parser.get_data_offset(entry).await?;
        let mut remaining = entry.compressed_size;

        if offset.saturating_add(remaining) > reader.size() {
            return Err(ExtractionError::malformed(format!(
                "data of {} extends past the end of the archive",
                entry.relative_path
            )));
        }

        let mut sink = Sink {
            out,
            crc: Crc::new(),
            written: 0,
        };
        let mut block = vec![0u8; BLOCK_SIZE.min(remaining) as usize];
        let mut inflater = match entry.compression_method {
            CompressionMethod::Deflate => Some(DeflateDecoder::new(Vec::new())),
            _ => None,
        };

        while remaining > 0 {
            let n = BLOCK_SIZE.min(remaining) as usize;
            reader.read_exact_at(offset, &mut block[..n]).await?;
            offset += n as u64;
            remaining -= n as u64;

            match inflater.as_mut() {
                Some(inflater) => {
                    inflater
                        .write_all(&block[..n])
                        .map_err(|e| corrupt_stream(entry, e))?;
                    let decoded = std::mem::take(inflater.get_mut());
                    sink.put(&decoded).await?;
                }
                None => sink.put(&block[..n]).await?,
            }
        }

        if let Some(mut inflater) = inflater {
            inflater.try_finish().map_err(|e| corrupt_stream(entry, e))?;
            let decoded = std::mem::take(inflater.get_mut());
            sink.put(&decoded).await?;
        }

        if sink.written != entry.uncompressed_size {
            return Err(ExtractionError::SizeMismatch {
                name: entry.relative_path.clone(),
                expected: entry.uncompressed_size,
                actual: sink.written,
            });
        }

        let actual = sink.crc.sum();
        if actual != entry.crc32 {
            return Err(ExtractionError::ChecksumMismatch {
                name: entry.relative_path.clone(),
                expected: entry.crc32,
                actual,
            });
        }

        Ok(sink.written)
    }

    /// Extract file data to memory
    pub async fn extract_to_memory(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(entry.uncompressed_size.min(BLOCK_SIZE) as usize);
        self.copy_entry(entry, &mut buf).await?;
        Ok(buf)
    }

    /// Extract file to disk, replacing whatever is at `output_path`
    pub async fn extract_to_file(&self, entry: &ArchiveEntry, output_path: &Path) -> Result<u64> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(output_path).await?;
        let written = self.copy_entry(entry, &mut file).await?;
        file.flush().await?;

        Ok(written)
    }
}
