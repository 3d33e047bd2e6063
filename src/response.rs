//! Rendered page responses handed to the publisher.
//!
//! The engine does not render anything itself: a rendering collaborator
//! produces one of these per URL and the publisher only reads the status
//! code, the headers (`Location` for redirects) and the body.

use bytes::Bytes;

/// An already-rendered page response for a single URL.
#[derive(Debug, Clone)]
pub struct RenderedResponse {
    status_code: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl RenderedResponse {
    /// Create a response with the given status code and body.
    pub fn new(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a redirect response carrying a `Location` header.
    pub fn redirect(status_code: u16, location: impl Into<String>) -> Self {
        Self::new(status_code, Bytes::new()).with_header("Location", location)
    }

    /// Attach a header, keeping any previously attached ones.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
