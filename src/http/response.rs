use crate::http::headers::HeaderMap;

/// Common HTTP status codes.
///
/// Any code/reason pair can be sent with
/// [`ResponseWriter::set_status`](crate::http::writer::ResponseWriter::set_status);
/// these are shorthands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// How the body is framed on the wire. Decided once, when the head is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `content-length` is known; the body goes out verbatim.
    Fixed,
    /// `transfer-encoding: chunked`; every write becomes a chunk frame.
    Chunked,
}

/// Lifecycle of a response.
///
/// ```text
/// Pending ──first write/end──▶ Sent(framing) ──end──▶ Ended(framing)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Sent(Framing),
    Ended(Framing),
}

/// Mutable response metadata for one connection.
#[derive(Debug, Clone)]
pub struct ResponseState {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub phase: Phase,
}

impl ResponseState {
    pub fn new(server_name: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.set("server", server_name);

        Self {
            status: StatusCode::Ok.as_u16(),
            status_text: StatusCode::Ok.reason_phrase().to_string(),
            headers,
            phase: Phase::Pending,
        }
    }

    pub fn headers_sent(&self) -> bool {
        self.phase != Phase::Pending
    }

    pub fn framing(&self) -> Option<Framing> {
        match self.phase {
            Phase::Pending => None,
            Phase::Sent(f) | Phase::Ended(f) => Some(f),
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }
}
