//! # pageserve
//!
//! A minimal static page server. It accepts TCP connections, reads one
//! plaintext request line per connection, and answers with a fixed-format
//! HTTP/1.0 status line followed by the requested `.html` or `.css` file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pageserve::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new(5000, "./pages", false)?;
//!     let server = Server::listen(config.port()).await?;
//!     println!("Listening on {}", server.local_addr());
//!     server.run(Arc::new(config)).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — validated settings from defaults, a TOML file and flags.
//! - [`http`] — the four status lines, request-line parsing, response encoding.
//! - [`guard`] — traversal guard and extension-based file resolution.
//! - [`server`] — listener, accept loop and the per-connection exchange.
//!
//! The library only emits [`tracing`] events; installing a subscriber is up
//! to the caller.

pub mod config;
pub mod guard;
pub mod http;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use guard::{ContentType, Resolution};
pub use http::{Request, Response, Status};
pub use server::{ConnectionError, Outcome, Server, ServerError};
