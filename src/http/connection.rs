use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf, ReadHalf, WriteHalf};

use crate::config::Config;
use crate::http::error::FrameError;
use crate::http::framer::{Framed, HeaderFramer};
use crate::http::handler::Handler;
use crate::http::request::{ParsedRequest, Request};
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// Any byte stream a connection can be served over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

pub type BoxTransport = Box<dyn Transport>;

/// Read side of a connection with support for pushing bytes back.
///
/// Pushed-back bytes are replayed, in order, before anything new arrives
/// from the transport.
pub struct Inbound {
    reader: ReadHalf<BoxTransport>,
    pending: VecDeque<Bytes>,
}

impl Inbound {
    fn new(reader: ReadHalf<BoxTransport>) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Returns the next available chunk, or `None` once the peer has
    /// closed its side and nothing is left to replay.
    pub async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if let Some(chunk) = self.pending.pop_front() {
            return Ok(Some(chunk));
        }

        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        let n = self.reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }

    /// Puts `bytes` in front of everything not yet read.
    pub fn unshift(&mut self, bytes: Bytes) {
        if !bytes.is_empty() {
            self.pending.push_front(bytes);
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.iter().map(Bytes::len).sum()
    }
}

impl AsyncRead for Inbound {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(front) = this.pending.front_mut() {
            let n = front.len().min(buf.remaining());
            buf.put_slice(&front[..n]);
            front.advance(n);
            if front.is_empty() {
                this.pending.pop_front();
            }
            return Poll::Ready(Ok(()));
        }

        Pin::new(&mut this.reader).poll_read(cx, buf)
    }
}

/// One accepted connection, serving exactly one request.
pub struct Connection {
    inbound: Inbound,
    outbound: WriteHalf<BoxTransport>,
    framer: HeaderFramer,
    header_timeout: Duration,
    server_name: String,
}

impl Connection {
    pub fn new<S: Transport>(stream: S, cfg: &Config) -> Self {
        let (reader, writer) = tokio::io::split(Box::new(stream) as BoxTransport);
        Self {
            inbound: Inbound::new(reader),
            outbound: writer,
            framer: HeaderFramer::new(cfg.max_header_bytes),
            header_timeout: cfg.header_timeout(),
            server_name: cfg.server_name.clone(),
        }
    }

    /// Frames the request head. Bytes past the terminator are pushed back
    /// onto the inbound stream.
    pub async fn read_request(&mut self) -> Result<ParsedRequest, FrameError> {
        match tokio::time::timeout(self.header_timeout, self.frame_head()).await {
            Ok(result) => result,
            Err(_) => Err(FrameError::RequestTimeout),
        }
    }

    async fn frame_head(&mut self) -> Result<ParsedRequest, FrameError> {
        loop {
            let chunk = match self.inbound.read_chunk().await? {
                Some(chunk) => chunk,
                None => return Err(FrameError::ConnectionClosed),
            };

            match self.framer.feed(&chunk)? {
                Framed::Incomplete => {
                    // Wait for more data
                }
                Framed::Complete { request, remainder } => {
                    self.inbound.unshift(remainder);
                    return Ok(request);
                }
            }
        }
    }

    /// Frames the request, runs `handler`, then flushes and closes.
    ///
    /// Framing failures drop the connection without writing anything.
    pub async fn run<H: Handler + ?Sized>(mut self, handler: &H) -> anyhow::Result<()> {
        let parsed = match self.read_request().await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Destroying connection");
                return Err(e.into());
            }
        };

        tracing::debug!(
            method = %parsed.method,
            target = %parsed.target,
            version = %parsed.http_version,
            "Request framed"
        );

        let mut request = Request::new(parsed, self.inbound);
        let mut response = ResponseWriter::new(self.outbound, &self.server_name);

        if let Err(e) = handler.call(&mut request, &mut response).await {
            tracing::error!(
                error = %e,
                method = %request.method(),
                target = %request.target(),
                "Handler failed"
            );
            if !response.headers_sent() {
                response.reset(&self.server_name);
                response.set_status_code(StatusCode::InternalServerError);
                response.set_header("content-type", "text/plain");
                response.end("Internal Server Error")?;
            }
        }

        if !response.is_ended() {
            tracing::warn!(
                method = %request.method(),
                target = %request.target(),
                "Handler returned without ending the response"
            );
            response.end("")?;
        }

        response.flush().await?;
        Ok(())
    }
}

/// Serves a single connection with `handler`.
pub async fn serve_connection<S, H>(stream: S, cfg: &Config, handler: &H) -> anyhow::Result<()>
where
    S: Transport,
    H: Handler + ?Sized,
{
    Connection::new(stream, cfg).run(handler).await
}
