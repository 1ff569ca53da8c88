//! Response encoding.
//!
//! A response is a status line immediately followed by a body. There are no
//! headers and no `Content-Length`: the end of the body is signalled by the
//! server closing the connection.

use bytes::{BufMut, Bytes, BytesMut};

use super::Status;

/// Body sent with every `403 Forbidden`.
pub const FORBIDDEN_BODY: &str = "
<html><head><title>Forbidden</title></head>
<body>
<h1>This is a forbidden request.</h1>
<p>The string '..' or '~' is forbidden.</p>
</body>
</html>
";

/// Body sent with every `404 Not Found`.
pub const NOT_FOUND_BODY: &str = "
<html><head><title>Not Found</title></head>
<body>
<h1>This page does not exist.</h1>
<p>The data for this page does not exist in the docroot.</p>
</body>
</html>
";

/// A status line plus body, ready to be transmitted.
///
/// # Examples
///
/// ```
/// use pageserve::http::{Response, Status};
///
/// let bytes = Response::new(Status::Ok, "<h1>Hi</h1>").into_bytes();
/// assert_eq!(&bytes[..], b"HTTP/1.0 200 OK\n\n<h1>Hi</h1>");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    body: Bytes,
}

impl Response {
    /// Creates a response with the given status and body.
    pub fn new(status: Status, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `200 OK` carrying the file's bytes verbatim.
    pub fn file(contents: impl Into<Bytes>) -> Self {
        Self::new(Status::Ok, contents)
    }

    /// `403 Forbidden` with the fixed HTML body.
    pub fn forbidden() -> Self {
        Self::new(Status::Forbidden, FORBIDDEN_BODY)
    }

    /// `404 Not Found` with the fixed HTML body.
    pub fn not_found() -> Self {
        Self::new(Status::NotFound, NOT_FOUND_BODY)
    }

    /// `401 Not Implemented` with a diagnostic echoing the raw request.
    pub fn not_implemented(raw_request: &str) -> Self {
        Self::new(
            Status::NotImplemented,
            format!("\nI don't handle this request: {raw_request}\n"),
        )
    }

    /// Returns the status of this response.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Serializes the status line followed by the body.
    pub fn into_bytes(self) -> BytesMut {
        let line = self.status.status_line();
        let mut buf = BytesMut::with_capacity(line.len() + self.body.len());
        buf.put(line.as_bytes());
        buf.put(self.body);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn ok_response_is_status_line_then_body() {
        let s = to_string(Response::file("<h1>Hi</h1>").into_bytes());
        assert_eq!(s, "HTTP/1.0 200 OK\n\n<h1>Hi</h1>");
    }

    #[test]
    fn binary_body_is_untouched() {
        let body = vec![0u8, 159, 146, 150, 255];
        let bytes = Response::file(body.clone()).into_bytes();
        assert_eq!(&bytes[b"HTTP/1.0 200 OK\n\n".len()..], &body[..]);
    }

    #[test]
    fn forbidden() {
        let s = to_string(Response::forbidden().into_bytes());
        assert!(s.starts_with("HTTP/1.0 403 Forbidden\n\n"));
        assert!(s.ends_with(FORBIDDEN_BODY));
    }

    #[test]
    fn not_found() {
        let s = to_string(Response::not_found().into_bytes());
        assert!(s.starts_with("HTTP/1.0 404 Not Found\n\n"));
        assert!(s.contains("This page does not exist."));
    }

    #[test]
    fn not_implemented_echoes_request() {
        let r = Response::not_implemented("POST /index.html HTTP/1.0");
        assert_eq!(r.status(), Status::NotImplemented);
        let s = to_string(r.into_bytes());
        assert!(s.starts_with("HTTP/1.0 401 Not Implemented\n\n"));
        assert!(s.contains("I don't handle this request: POST /index.html HTTP/1.0"));
    }
}
