use std::fmt;

use indexmap::IndexMap;

/// A response header value, either free text or an integer such as a
/// computed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    Int(u64),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(s) => f.write_str(s),
            HeaderValue::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::Text(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::Text(s)
    }
}

impl From<u64> for HeaderValue {
    fn from(n: u64) -> Self {
        HeaderValue::Int(n)
    }
}

impl From<usize> for HeaderValue {
    fn from(n: usize) -> Self {
        HeaderValue::Int(n as u64)
    }
}

/// Ordered header dictionary keyed by lowercase name.
///
/// Setting an existing name replaces its value in place, so emission order
/// follows first insertion.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: IndexMap<String, HeaderValue>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
