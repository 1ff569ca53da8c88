//! One connection's request/response exchange.
//!
//! Every connection goes through the same short life:
//!
//! ```text
//! AwaitingRequest -> Parsed -> { Served | Forbidden | NotFound | NotImplemented | Unmatched } -> Closed
//! ```
//!
//! A single read of at most [`MAX_REQUEST_BYTES`] is taken as the whole
//! request. At most one response is written. The connection is then shut down
//! and released, whichever branch was taken and whether or not an I/O error
//! cut the exchange short.

use std::io;
use std::net::{Shutdown, SocketAddr};
use std::path::Path;
use std::str::Utf8Error;

use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{Instrument, debug, debug_span, info, warn};

use crate::guard::{self, ContentType, Resolution};
use crate::http::{Request, Response, Status};

/// Upper bound on the bytes read for a request. Anything beyond is never read.
pub const MAX_REQUEST_BYTES: usize = 1024;

/// Errors that end a connection without (or part-way through) a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("request is not valid UTF-8: {0}")]
    Decode(#[from] Utf8Error),
}

/// How a connection's exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A file was found and sent with `200 OK`.
    Served(ContentType),
    /// The target contained `..` or `~`.
    Forbidden,
    /// The file for an allow-listed extension could not be opened.
    NotFound,
    /// The method was not `GET` or the request line had no target.
    NotImplemented,
    /// A GET whose target matched no allow-listed extension; nothing was sent.
    Unmatched,
}

impl Outcome {
    /// Returns the status that was sent, or `None` when nothing was sent.
    pub fn status(self) -> Option<Status> {
        match self {
            Self::Served(_) => Some(Status::Ok),
            Self::Forbidden => Some(Status::Forbidden),
            Self::NotFound => Some(Status::NotFound),
            Self::NotImplemented => Some(Status::NotImplemented),
            Self::Unmatched => None,
        }
    }
}

/// Runs the exchange on an accepted socket, then shuts it down in both directions.
///
/// Errors are logged here and go no further.
pub async fn handle(mut stream: TcpStream, peer_addr: SocketAddr, document_root: &Path) {
    let span = debug_span!("connection", peer = %peer_addr);
    async move {
        match respond(&mut stream, document_root).await {
            Ok(outcome) => debug!(?outcome, "request complete"),
            Err(e) => warn!(error = %e, "connection closed with error"),
        }
        close(stream);
    }
    .instrument(span)
    .await
}

fn close(stream: TcpStream) {
    match stream.into_std() {
        Ok(stream) => {
            // The peer may already be gone; the socket is released on drop regardless.
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!(error = %e, "shutdown failed");
            }
        }
        Err(e) => debug!(error = %e, "could not detach socket for shutdown"),
    }
}

/// Reads one request from `stream` and writes at most one response to it.
///
/// Does not close the stream; [`handle`] does that.
///
/// # Errors
///
/// - [`ConnectionError::Io`] — the read or a write failed.
/// - [`ConnectionError::Decode`] — the request bytes were not UTF-8. No response is sent.
pub async fn respond<S>(stream: &mut S, document_root: &Path) -> Result<Outcome, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; MAX_REQUEST_BYTES];
    let bytes_read = stream.read(&mut buf).await?;
    let text = std::str::from_utf8(&buf[..bytes_read])?;
    info!(request = %text.trim_end(), "received request");

    let request = match Request::parse(text) {
        Ok(request) if request.is_get() => request,
        parsed => {
            if let Err(e) = parsed {
                debug!(error = %e, "malformed request line");
            }
            info!(request = %text.trim_end(), "unhandled request");
            send(stream, Response::not_implemented(text)).await?;
            return Ok(Outcome::NotImplemented);
        }
    };

    let outcome = match guard::resolve(document_root, request.target()) {
        Resolution::Forbidden => {
            send(stream, Response::forbidden()).await?;
            Outcome::Forbidden
        }
        Resolution::Unmatched => {
            debug!(requested = request.target(), "no allow-listed extension; closing silently");
            Outcome::Unmatched
        }
        Resolution::File { path, content_type } => match fs::read(&path).await {
            Ok(contents) => {
                debug!(path = %path.display(), %content_type, "serving file");
                send(stream, Response::file(contents)).await?;
                Outcome::Served(content_type)
            }
            Err(e) => {
                if e.kind() == io::ErrorKind::NotFound {
                    debug!(path = %path.display(), "file not found");
                } else {
                    warn!(path = %path.display(), error = %e, "file could not be read; answering 404");
                }
                send(stream, Response::not_found()).await?;
                Outcome::NotFound
            }
        },
    };

    Ok(outcome)
}

async fn send<W>(writer: &mut W, response: Response) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let status = response.status();
    let sent = transmit(writer, &response.into_bytes()).await?;
    debug!(%status, bytes = sent, "response sent");
    Ok(())
}

/// Writes all of `message`, one `write` call at a time, until every byte is out.
///
/// A single write on a stream socket may accept only part of a buffer, so
/// this keeps going from wherever the last write stopped.
///
/// # Errors
///
/// Any error from the underlying write, or [`io::ErrorKind::WriteZero`] if the
/// writer stops accepting bytes.
pub async fn transmit<W>(writer: &mut W, message: &[u8]) -> io::Result<usize>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut sent = 0;
    while sent < message.len() {
        let n = writer.write(&message[sent..]).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("peer stopped accepting data after {sent} of {} bytes", message.len()),
            ));
        }
        sent += n;
    }
    writer.flush().await?;
    Ok(sent)
}
