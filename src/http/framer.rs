use std::collections::HashMap;

use bytes::{Buf, Bytes, BytesMut};

use crate::http::error::FrameError;
use crate::http::request::ParsedRequest;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Outcome of feeding bytes to a [`HeaderFramer`].
#[derive(Debug)]
pub enum Framed {
    /// The terminator has not been seen yet; feed more bytes.
    Incomplete,
    /// The head is complete. `remainder` holds every byte received after
    /// the terminator and must be handed back to the connection.
    Complete {
        request: ParsedRequest,
        remainder: Bytes,
    },
}

/// Accumulates inbound chunks until a full request head is available.
///
/// Chunks may be split anywhere, including inside the terminator itself.
pub struct HeaderFramer {
    buffer: BytesMut,
    // bytes of `buffer` already searched for the terminator
    scanned: usize,
    max_header_bytes: usize,
}

impl HeaderFramer {
    pub fn new(max_header_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            scanned: 0,
            max_header_bytes,
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<Framed, FrameError> {
        self.buffer.extend_from_slice(chunk);

        // The terminator may straddle the previous chunk boundary.
        let from = self.scanned.saturating_sub(HEADER_TERMINATOR.len() - 1);
        let found = find_terminator(&self.buffer[from..]).map(|pos| from + pos);

        let Some(head_len) = found else {
            // Up to three trailing bytes may be the start of a terminator.
            if self.buffer.len() > self.max_header_bytes + HEADER_TERMINATOR.len() - 1 {
                return Err(FrameError::HeaderTooLarge {
                    limit: self.max_header_bytes,
                });
            }
            self.scanned = self.buffer.len();
            return Ok(Framed::Incomplete);
        };

        if head_len > self.max_header_bytes {
            return Err(FrameError::HeaderTooLarge {
                limit: self.max_header_bytes,
            });
        }

        let head = self.buffer.split_to(head_len);
        self.buffer.advance(HEADER_TERMINATOR.len());
        let remainder = self.buffer.split().freeze();
        self.scanned = 0;

        let request = parse_head(&head)?;
        Ok(Framed::Complete { request, remainder })
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Parses a header block (everything before the terminator).
pub fn parse_head(block: &[u8]) -> Result<ParsedRequest, FrameError> {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.split("\r\n");

    // Request line
    let request_line = lines.next().unwrap_or_default();
    let parts: Vec<&str> = request_line.split(' ').collect();
    if parts.len() < 3 {
        return Err(FrameError::InvalidRequestLine(request_line.to_string()));
    }

    let http_version = parts[2].split('/').nth(1).unwrap_or_default();

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            tracing::trace!(line, "skipping header line without a colon");
            continue;
        };

        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(ParsedRequest {
        method: parts[0].to_string(),
        target: parts[1].to_string(),
        http_version: http_version.to_string(),
        headers,
    })
}
