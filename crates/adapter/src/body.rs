//! Body acquisition.
//!
//! The reader is injected when a handler is constructed; the request handler
//! calls it at most once per request, and only when the host did not already
//! decode the body.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::RawBody;

/// Failure to read or decode a raw request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Request body exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Failed to read request body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request payload JSON format: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and decodes a raw request body.
#[async_trait]
pub trait BodyReader: Send + Sync {
    /// Reads `raw` to the end and decodes it as JSON.
    async fn read_json(&self, raw: RawBody) -> Result<Value, BodyError>;
}

/// Default [`BodyReader`]: buffers up to `max_bytes` and decodes with `serde_json`.
///
/// An empty (or whitespace-only) body decodes to `null`.
#[derive(Debug, Clone, Copy)]
pub struct JsonBodyReader {
    max_bytes: usize,
}

impl JsonBodyReader {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl BodyReader for JsonBodyReader {
    async fn read_json(&self, raw: RawBody) -> Result<Value, BodyError> {
        let mut buffer = Vec::new();
        let limit = u64::try_from(self.max_bytes)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        raw.take(limit).read_to_end(&mut buffer).await?;

        if buffer.len() > self.max_bytes {
            return Err(BodyError::TooLarge {
                limit: self.max_bytes,
            });
        }
        if buffer.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&buffer)?)
    }
}
