//! The page server's tiny slice of HTTP/1.0.
//!
//! Only the request line is ever parsed, and only four responses are ever
//! produced. This module provides [`Status`], [`Request`] and [`Response`].

use std::fmt;

pub mod request;
pub mod response;

pub use request::Request;
pub use response::Response;

/// The closed set of response statuses the server can send.
///
/// Each status is bound to one literal status line, terminated by the
/// blank line that separates it from the body.
///
/// # Examples
///
/// ```
/// use pageserve::http::Status;
///
/// assert_eq!(Status::Ok.status_line(), "HTTP/1.0 200 OK\n\n");
/// assert_eq!(Status::NotFound.code(), 404);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    Forbidden = 403,
    NotFound = 404,
    /// Sent as `401 Not Implemented`. HTTP assigns 401 to "Unauthorized";
    /// the literal is kept for compatibility with existing clients.
    NotImplemented = 401,
}

impl Status {
    /// Returns the numeric status code as a `u16`.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Returns the reason phrase written after the code.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::NotImplemented => "Not Implemented",
        }
    }

    /// Returns the exact bytes of the status line, including the trailing blank line.
    pub fn status_line(self) -> &'static str {
        match self {
            Self::Ok => "HTTP/1.0 200 OK\n\n",
            Self::Forbidden => "HTTP/1.0 403 Forbidden\n\n",
            Self::NotFound => "HTTP/1.0 404 Not Found\n\n",
            Self::NotImplemented => "HTTP/1.0 401 Not Implemented\n\n",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}
