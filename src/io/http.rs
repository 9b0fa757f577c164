use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::TransferError;

/// A streamed body delivered as a sequence of byte chunks
#[async_trait]
pub trait ChunkSource: Send {
    /// Total body size, when the source advertises one
    fn content_length(&self) -> Option<u64>;

    /// Next chunk of the body, or `None` once the body is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError>;
}

/// Streaming HTTP GET body
pub struct HttpSource {
    response: Response,
    content_length: Option<u64>,
    transferred_bytes: u64,
}

impl HttpSource {
    /// Build the client used for downloads.
    ///
    /// Only connecting is bounded; large bodies may take as long as they need.
    pub fn client() -> Result<Client, TransferError> {
        Ok(Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?)
    }

    /// Parse and check a source locator
    pub fn parse_url(url: &str) -> Result<Url, TransferError> {
        let parsed = Url::parse(url).map_err(|e| TransferError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(TransferError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }

    /// Send a GET request and wait for the response headers
    pub async fn open(client: &Client, url: &str) -> Result<Self, TransferError> {
        let url = Self::parse_url(url)?;
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status()));
        }

        let content_length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        Ok(Self {
            response,
            content_length,
            transferred_bytes: 0,
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }
}

#[async_trait]
impl ChunkSource for HttpSource {
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
        let chunk = self.response.chunk().await?;
        if let Some(bytes) = &chunk {
            self.transferred_bytes += bytes.len() as u64;
        }
        Ok(chunk.map(|b| b.to_vec()))
    }
}

/// Chunk source backed by buffers already in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Vec<u8>>,
    content_length: Option<u64>,
}

impl MemorySource {
    pub fn new<I>(chunks: I, content_length: Option<u64>) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().collect(),
            content_length,
        }
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
        Ok(self.chunks.pop_front())
    }
}
