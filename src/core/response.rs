//! Server-side response model shared by the static handler and middleware.
//!
//! Kept independent from `tiny_http` so post-processing steps can be tested
//! without a socket.

use std::fmt;
use std::io::{self, Read};

use crate::utils::mime;

/// Response body, either in memory or streamed from a file.
pub enum Body {
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl Body {
    /// Read the whole body into memory.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader(_) => f.write_str("Reader"),
        }
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A response after downstream handling, before it is written out.
#[derive(Debug)]
pub struct ServeResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Body>,
}

impl ServeResponse {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Body>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    /// Response with no body (e.g. `304 Not Modified`, `HEAD`).
    pub fn empty(status: u16, content_type: &'static str) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn is_html(&self) -> bool {
        mime::is_html(self.content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;

    #[test]
    fn test_into_bytes_from_reader() {
        let body = Body::Reader(Box::new(io::Cursor::new(b"<p>hi</p>".to_vec())));
        assert_eq!(body.into_bytes().unwrap(), b"<p>hi</p>");
    }

    #[test]
    fn test_into_bytes_keeps_non_utf8() {
        let body = Body::Bytes(vec![0xff, 0xfe]);
        assert_eq!(body.into_bytes().unwrap(), [0xff, 0xfe]);
    }

    #[test]
    fn test_is_html() {
        assert!(ServeResponse::new(200, types::HTML, String::new()).is_html());
        assert!(!ServeResponse::new(200, types::JAVASCRIPT, String::new()).is_html());
    }
}
