use std::collections::HashMap;

use tokio::io::AsyncReadExt;

use crate::http::connection::Inbound;

/// The framed head of an HTTP request.
///
/// Built once per connection as soon as the header terminator is seen and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Method token exactly as received (e.g. "GET")
    pub method: String,
    /// Raw request target, not decoded (e.g. "/search?q=rust")
    pub target: String,
    /// Version digits after the slash (e.g. "1.1")
    pub http_version: String,
    /// Header fields keyed by lowercase name, values trimmed
    pub headers: HashMap<String, String>,
}

impl ParsedRequest {
    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Declared body length, if the client sent a usable `Content-Length`.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }
}

/// A request handed to a handler: the parsed head plus the connection's
/// inbound stream, positioned at the first body byte.
pub struct Request {
    parsed: ParsedRequest,
    body: Inbound,
}

impl Request {
    pub fn new(parsed: ParsedRequest, body: Inbound) -> Self {
        Self { parsed, body }
    }

    pub fn parsed(&self) -> &ParsedRequest {
        &self.parsed
    }

    pub fn method(&self) -> &str {
        &self.parsed.method
    }

    pub fn target(&self) -> &str {
        &self.parsed.target
    }

    pub fn http_version(&self) -> &str {
        &self.parsed.http_version
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.parsed.header(name)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.parsed.headers
    }

    /// Raw access to the connection's inbound bytes. Nothing past the head
    /// has been consumed, so this yields the body as the client sent it.
    pub fn body_mut(&mut self) -> &mut Inbound {
        &mut self.body
    }

    /// Reads body bytes until EOF or until `limit` bytes are collected.
    ///
    /// No framing is interpreted; callers that know the length should read
    /// exactly that much from [`Request::body_mut`] instead.
    pub async fn read_body(&mut self, limit: usize) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        (&mut self.body).take(limit as u64).read_to_end(&mut out).await?;
        Ok(out)
    }
}
