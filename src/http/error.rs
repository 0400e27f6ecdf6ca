use std::fmt;
use std::io;

/// Failures while framing the request head. All of them are fatal to the
/// connection: it is torn down without a response.
#[derive(Debug)]
pub enum FrameError {
    /// The request line had fewer than three space separated tokens.
    InvalidRequestLine(String),
    /// The header block grew past the configured limit.
    HeaderTooLarge { limit: usize },
    /// The header terminator did not arrive in time.
    RequestTimeout,
    /// The peer closed before sending the header terminator.
    ConnectionClosed,
    Io(io::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidRequestLine(line) => write!(f, "invalid request line: {:?}", line),
            FrameError::HeaderTooLarge { limit } => {
                write!(f, "request header block exceeds {} bytes", limit)
            }
            FrameError::RequestTimeout => f.write_str("timed out waiting for request headers"),
            FrameError::ConnectionClosed => {
                f.write_str("connection closed before request headers were complete")
            }
            FrameError::Io(e) => write!(f, "i/o error while reading request: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

/// Misuse of a [`ResponseWriter`](crate::http::writer::ResponseWriter).
#[derive(Debug)]
pub enum ResponseError {
    HeadersAlreadySent,
    ResponseEnded,
    Serialize(serde_json::Error),
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseError::HeadersAlreadySent => f.write_str("headers already sent"),
            ResponseError::ResponseEnded => f.write_str("response already ended"),
            ResponseError::Serialize(e) => write!(f, "failed to serialize json body: {}", e),
        }
    }
}

impl std::error::Error for ResponseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResponseError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ResponseError {
    fn from(e: serde_json::Error) -> Self {
        ResponseError::Serialize(e)
    }
}
