use std::io;

use bytes::{Buf, BufMut, BytesMut};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::ResponseError;
use crate::http::headers::{HeaderMap, HeaderValue};
use crate::http::response::{Framing, Phase, ResponseState, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";
const CHUNKED_TERMINATOR: &[u8] = b"0\r\n\r\n";

type BoxSink = Box<dyn AsyncWrite + Unpin + Send>;

fn encode_head(buf: &mut BytesMut, status: u16, status_text: &str, headers: &HeaderMap) {
    // Status line
    let status_line = format!("{} {} {}\r\n", HTTP_VERSION, status, status_text);
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
}

fn encode_chunk(buf: &mut BytesMut, chunk: &[u8]) {
    buf.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
    buf.extend_from_slice(chunk);
    buf.put_slice(b"\r\n");
}

/// Streams one HTTP/1.1 response onto a connection.
///
/// Nothing is sent until the first `write`, `end` or `json`. At that point
/// the framing is fixed: chunked unless a `content-length` was set (or,
/// for `end`, can be computed). All operations only append to an outbound
/// buffer; [`ResponseWriter::flush`] moves it onto the transport.
pub struct ResponseWriter {
    state: ResponseState,
    outbound: BytesMut,
    sink: BoxSink,
    shut_down: bool,
}

impl ResponseWriter {
    pub fn new<W>(sink: W, server_name: &str) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            state: ResponseState::new(server_name),
            outbound: BytesMut::with_capacity(1024),
            sink: Box::new(sink),
            shut_down: false,
        }
    }

    /// Sets a header, replacing any previous value for the same name
    /// regardless of case. Ignored once the head has been sent.
    pub fn set_header(&mut self, name: &str, value: impl Into<HeaderValue>) {
        if self.state.headers_sent() {
            tracing::debug!(header = name, "Ignoring header set after headers were sent");
            return;
        }
        self.state.headers.set(name, value);
    }

    /// Sets the status line. Ignored once the head has been sent.
    pub fn set_status(&mut self, code: u16, text: impl Into<String>) {
        if self.state.headers_sent() {
            tracing::debug!(status = code, "Ignoring status set after headers were sent");
            return;
        }
        self.state.status = code;
        self.state.status_text = text.into();
    }

    pub fn set_status_code(&mut self, status: StatusCode) {
        self.set_status(status.as_u16(), status.reason_phrase());
    }

    /// Drops every staged status and header, as if nothing had been set.
    /// Ignored once the head has been sent.
    pub fn reset(&mut self, server_name: &str) {
        if self.state.headers_sent() {
            return;
        }
        self.state = ResponseState::new(server_name);
    }

    pub fn status(&self) -> u16 {
        self.state.status
    }

    pub fn status_text(&self) -> &str {
        &self.state.status_text
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.state.headers.get(name)
    }

    pub fn headers_sent(&self) -> bool {
        self.state.headers_sent()
    }

    pub fn is_chunked(&self) -> bool {
        self.state.framing() == Some(Framing::Chunked)
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    /// Bytes produced but not yet flushed to the transport.
    pub fn buffered(&self) -> &[u8] {
        &self.outbound
    }

    /// Appends `chunk` to the body.
    ///
    /// The first call sends the head, switching to chunked encoding when no
    /// `content-length` was set. An empty chunk in chunked mode produces a
    /// zero-size frame; use [`ResponseWriter::end`] to finish the body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        let chunk = chunk.as_ref();

        let framing = match self.state.phase {
            Phase::Ended(_) => return Err(ResponseError::ResponseEnded),
            Phase::Sent(framing) => framing,
            Phase::Pending => {
                let framing = if self.state.headers.contains("content-length") {
                    Framing::Fixed
                } else {
                    self.state.headers.set("transfer-encoding", "chunked");
                    Framing::Chunked
                };
                self.send_head(framing);
                framing
            }
        };

        match framing {
            Framing::Chunked => encode_chunk(&mut self.outbound, chunk),
            Framing::Fixed => self.outbound.extend_from_slice(chunk),
        }

        Ok(())
    }

    /// Finishes the response with an optional final chunk (empty means
    /// none).
    ///
    /// If nothing was sent yet the whole body is `chunk`, so its length
    /// becomes the `content-length` unless one was set explicitly.
    pub fn end(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        let chunk = chunk.as_ref();

        let framing = match self.state.phase {
            Phase::Ended(_) => return Err(ResponseError::ResponseEnded),
            Phase::Sent(framing) => framing,
            Phase::Pending => {
                if !self.state.headers.contains("content-length") {
                    self.state.headers.set("content-length", chunk.len());
                }
                self.send_head(Framing::Fixed);
                Framing::Fixed
            }
        };

        match framing {
            Framing::Chunked => {
                if !chunk.is_empty() {
                    encode_chunk(&mut self.outbound, chunk);
                }
                self.outbound.extend_from_slice(CHUNKED_TERMINATOR);
            }
            Framing::Fixed => self.outbound.extend_from_slice(chunk),
        }

        self.state.phase = Phase::Ended(framing);
        Ok(())
    }

    /// Serializes `data` and sends it as the complete response body.
    ///
    /// Must be the first and only body operation on this response.
    pub fn json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<(), ResponseError> {
        if self.state.headers_sent() {
            return Err(ResponseError::HeadersAlreadySent);
        }

        let body = serde_json::to_vec(data)?;
        self.state
            .headers
            .set("content-type", "application/json; charset=utf-8");
        self.state.headers.set("content-length", body.len());

        self.send_head(Framing::Fixed);
        self.outbound.extend_from_slice(&body);
        self.state.phase = Phase::Ended(Framing::Fixed);
        Ok(())
    }

    fn send_head(&mut self, framing: Framing) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.state.headers.set("date", now);

        encode_head(
            &mut self.outbound,
            self.state.status,
            &self.state.status_text,
            &self.state.headers,
        );
        self.state.phase = Phase::Sent(framing);

        tracing::debug!(
            status = self.state.status,
            chunked = framing == Framing::Chunked,
            "Response headers sent"
        );
    }

    /// Writes everything buffered so far to the transport. Once the
    /// response has ended, also closes the write side.
    pub async fn flush(&mut self) -> io::Result<()> {
        while self.outbound.has_remaining() {
            let n = self.sink.write(&self.outbound).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.outbound.advance(n);
        }

        if self.state.is_ended() {
            if !self.shut_down {
                self.sink.shutdown().await?;
                self.shut_down = true;
            }
        } else {
            self.sink.flush().await?;
        }

        Ok(())
    }
}
