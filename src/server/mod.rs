//! TCP listener and accept loop.
//!
//! Binds a port on all interfaces and hands every accepted connection to its
//! own Tokio task. Connections share nothing but the read-only
//! [`ServerConfig`]; there is no cap on how many run at once and no timeout on
//! any of them.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, error, info};

use crate::config::ServerConfig;

pub mod connection;

pub use connection::{ConnectionError, MAX_REQUEST_BYTES, Outcome, respond, transmit};

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Pending connections the kernel may queue before new ones are refused.
pub const LISTEN_BACKLOG: u32 = 16;

/// A bound, listening page server.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use pageserve::config::ServerConfig;
/// use pageserve::server::Server;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::new(5000, "./pages", false)?;
///     let server = Server::listen(config.port()).await?;
///     server.run(Arc::new(config)).await;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Binds all interfaces on `port` and starts listening.
    ///
    /// Port 0 asks the OS for an ephemeral port; see [`local_addr`](Self::local_addr).
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the port cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn listen(port: u16) -> Result<Self, ServerError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = bind(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves pages from the configured document root. Never returns.
    pub async fn run(self, config: Arc<ServerConfig>) {
        self.serve(move |stream, peer_addr| {
            let config = Arc::clone(&config);
            async move { connection::handle(stream, peer_addr, config.document_root()).await }
        })
        .await
    }

    /// Accepts connections forever, spawning `handler`'s future for each one.
    ///
    /// A failed accept is logged and the loop moves on; it never stops the
    /// server or touches other connections.
    pub async fn serve<H, F>(self, handler: H)
    where
        H: Fn(TcpStream, SocketAddr) -> F,
        F: Future<Output = ()> + Send + 'static,
    {
        info!(address = %self.local_addr, "pageserve listening");

        loop {
            debug!("waiting for a connection");
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            tokio::spawn(handler(stream, peer_addr));
        }
    }
}

fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}
