//! Incoming-request model shared by the router, validator, and middleware.
//!
//! The host server parses raw HTTP however it likes and hands the middleware
//! a [`Request`]. Headers, cookies, and query parameters are stored in
//! `SmallVec`s so the common case (≤16 headers, ≤8 params) never touches the
//! heap on the per-request path.

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers/cookies before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated header/cookie storage.
///
/// Names use `Arc<str>` because header names repeat heavily (Content-Type,
/// Authorization, ...) and `Arc::clone()` is an O(1) atomic increment.
/// Values stay `String` as they are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Stack-allocated parameter storage (same Arc<str>-name layout as headers).
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// An inbound HTTP request as seen by the validation middleware.
///
/// `path` never contains the query string; query parameters are split out
/// and URL-decoded at construction time.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Query string parameters, URL-decoded
    pub query_params: ParamVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl Request {
    /// Build a request from a method and a request target.
    ///
    /// The target may carry a query string (`/users?limit=10`); it is split
    /// off and decoded into `query_params`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query_params) = match target.find('?') {
            Some(pos) => (
                target[..pos].to_string(),
                parse_query_params(&target[pos + 1..]),
            ),
            None => (target.to_string(), ParamVec::new()),
        };
        Self {
            method,
            path,
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            query_params,
            body: None,
        }
    }

    /// Append a header. A `Cookie` header is additionally parsed into
    /// `cookies` so the two views stay consistent.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies.extend(parse_cookies(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    /// Attach a parsed JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name.
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20` the last
    /// occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get every occurrence of a query parameter, in request order.
    ///
    /// Exploded form-style arrays (`?tags=a&tags=b`) carry one item per
    /// occurrence, so all of them matter.
    #[must_use]
    pub fn get_query_params_all(&self, name: &str) -> Vec<&str> {
        self.query_params
            .iter()
            .filter(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Parse and URL-decode a query string (the part after `?`).
#[must_use]
pub fn parse_query_params(query_str: &str) -> ParamVec {
    url::form_urlencoded::parse(query_str.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
        .collect()
}

/// Parse a `Cookie` header value into name/value pairs.
#[must_use]
pub fn parse_cookies(header_value: &str) -> HeaderVec {
    header_value
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::from(name), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_split_and_decoded() {
        let req = Request::new(Method::GET, "/users?limit=10&name=a%20b");
        assert_eq!(req.path, "/users");
        assert_eq!(req.get_query_param("limit"), Some("10"));
        assert_eq!(req.get_query_param("name"), Some("a b"));
    }

    #[test]
    fn test_duplicate_query_param_last_wins() {
        let req = Request::new(Method::GET, "/users?limit=10&limit=20");
        assert_eq!(req.get_query_param("limit"), Some("20"));
    }

    #[test]
    fn test_all_query_occurrences_kept_in_order() {
        let req = Request::new(Method::GET, "/pets?tags=a&other=x&tags=b");
        assert_eq!(req.get_query_params_all("tags"), vec!["a", "b"]);
        assert!(req.get_query_params_all("missing").is_empty());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = Request::new(Method::GET, "/").with_header("X-Api-Key", "secret");
        assert_eq!(req.get_header("x-api-key"), Some("secret"));
    }

    #[test]
    fn test_cookie_header_parsed() {
        let req = Request::new(Method::GET, "/").with_header("Cookie", "a=1; session=xyz");
        assert_eq!(req.get_cookie("a"), Some("1"));
        assert_eq!(req.get_cookie("session"), Some("xyz"));
    }
}
