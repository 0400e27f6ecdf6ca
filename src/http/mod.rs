//! HTTP/1.1 built directly on a byte stream.
//!
//! Each accepted connection serves a single request:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Framing   │ ← accumulate bytes until \r\n\r\n
//!        └──────┬──────┘
//!               │ head parsed, leftover bytes pushed back
//!               ▼
//!        ┌──────────────────┐
//!        │    Handling      │ ← handler reads body, writes response
//!        └──────┬───────────┘
//!               │ response ended
//!               ▼
//!        ┌──────────────────┐
//!        │    Flushing      │ ← outbound buffer drained, write side closed
//!        └──────────────────┘
//! ```
//!
//! - **`framer`**: push-model header framer and request head parser
//! - **`connection`**: transport wrapper with push-back, per-connection flow
//! - **`request`**: parsed request head and the body stream
//! - **`response`**: status codes and response state
//! - **`writer`**: lazily framed response writer (fixed length or chunked)
//! - **`headers`**: ordered, case-insensitive header map
//! - **`handler`**: the application callback contract
//!
//! # Example
//!
//! ```ignore
//! use barehttp::config::Config;
//! use barehttp::http::connection::serve_connection;
//! use barehttp::http::handler::handler_fn;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let listener = TcpListener::bind(&cfg.listen_addr).await?;
//!     let hello = handler_fn(|_req, res| Box::pin(async move {
//!         res.end("Hello World")?;
//!         anyhow::Ok(())
//!     }));
//!
//!     let (socket, _addr) = listener.accept().await?;
//!     serve_connection(socket, &cfg, &hello).await
//! }
//! ```

pub mod connection;
pub mod error;
pub mod framer;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod writer;
