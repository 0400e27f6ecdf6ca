//! barehttp - HTTP/1.1 from first principles
//!
//! Request framing and response emission over a raw byte stream.

pub mod config;
pub mod http;
pub mod server;
