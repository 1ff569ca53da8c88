//! Request-line parsing.
//!
//! The server looks at nothing but the first two whitespace-separated tokens
//! of what the client sent: the method and the target. Headers, protocol
//! version and anything else are ignored.

use thiserror::Error;

/// The only method the server serves.
pub const GET: &str = "GET";

/// Errors that can occur while parsing a request line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request is empty")]
    Empty,

    #[error("request line has a method but no target")]
    MissingTarget,
}

/// A parsed request line.
///
/// The target is kept exactly as received: no percent-decoding and no path
/// normalization.
///
/// # Examples
///
/// ```
/// use pageserve::http::Request;
///
/// let request = Request::parse("GET /index.html HTTP/1.0\r\n\r\n").unwrap();
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.target(), "/index.html");
/// assert!(request.is_get());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    target: String,
}

impl Request {
    /// Parses the method and target out of decoded request text.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Empty`] — the text holds no tokens at all.
    /// - [`RequestError::MissingTarget`] — only one token was present.
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        let mut tokens = text.split_whitespace();
        let method = tokens.next().ok_or(RequestError::Empty)?;
        let target = tokens.next().ok_or(RequestError::MissingTarget)?;

        Ok(Self {
            method: method.to_owned(),
            target: target.to_owned(),
        })
    }

    /// Returns the method token.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the raw target token.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns `true` if the method is exactly `GET` (case-sensitive).
    pub fn is_get(&self) -> bool {
        self.method == GET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = Request::parse("GET /index.html HTTP/1.0").unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.target(), "/index.html");
        assert!(req.is_get());
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let req = Request::parse("GET /a.css HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(req.target(), "/a.css");
    }

    #[test]
    fn target_is_not_decoded() {
        let req = Request::parse("GET /%2e%2e/x.html HTTP/1.0").unwrap();
        assert_eq!(req.target(), "/%2e%2e/x.html");
    }

    #[test]
    fn method_is_case_sensitive() {
        let req = Request::parse("get /index.html HTTP/1.0").unwrap();
        assert!(!req.is_get());
    }

    #[test]
    fn empty_request() {
        assert_eq!(Request::parse(""), Err(RequestError::Empty));
        assert_eq!(Request::parse(" \r\n\t"), Err(RequestError::Empty));
    }

    #[test]
    fn method_without_target() {
        assert_eq!(Request::parse("GET\r\n"), Err(RequestError::MissingTarget));
    }
}
