//! Response model for middleware short-circuits and handler results.

use crate::request::HeaderVec;
use std::sync::Arc;

/// An HTTP response produced by a handler or a middleware rejection.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code (200, 400, 401, ...)
    pub status: u16,
    /// Response headers
    pub headers: HeaderVec,
    /// Response body bytes, already serialized
    pub body: String,
}

impl Response {
    /// Create a response with an empty body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: String::new(),
        }
    }

    /// Set a header, replacing any existing value with the same name
    /// (case-insensitive).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            self.headers.push((Arc::from(name), value));
        }
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_existing() {
        let mut res = Response::new(200);
        res.set_header("Content-Type", "text/plain");
        res.set_header("content-type", "application/json");
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        assert_eq!(res.headers.len(), 1);
    }
}
