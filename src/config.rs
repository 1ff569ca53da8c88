//! Server configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults (port 5000, document root `./pages`, debug off);
//! 2. an optional TOML file given with `--config` / `PAGESERVE_CONFIG`;
//! 3. command-line flags and their environment variables.
//!
//! ```bash
//! pageserve --port 8000 --docroot ./pages --debug
//! PAGESERVE_PORT=8000 PAGESERVE_DOCROOT=./pages pageserve
//! ```
//!
//! ```toml
//! # pageserve.toml
//! port = 8000
//! docroot = "./pages"
//! debug = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Port used when no source sets one.
pub const DEFAULT_PORT: u16 = 5000;

/// Document root used when no source sets one.
pub const DEFAULT_DOCROOT: &str = "./pages";

/// Ports at or below this are reserved by the operating system.
pub const RESERVED_PORT_MAX: u16 = 1000;

/// Errors raised while building a [`ServerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error("document root {path} is not a directory")]
    DocumentRoot { path: PathBuf },
}

/// Command-line flags (each also readable from the environment).
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pageserve")]
#[command(about = "Serve .html and .css pages from a document root")]
#[command(version)]
pub struct Cli {
    /// TOML file with `port`, `docroot` and `debug` keys
    #[arg(short, long, env = "PAGESERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (all interfaces)
    #[arg(short, long, env = "PAGESERVE_PORT")]
    pub port: Option<u16>,

    /// Directory the request targets are appended to
    #[arg(short = 'r', long, env = "PAGESERVE_DOCROOT")]
    pub docroot: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, env = "PAGESERVE_DEBUG")]
    pub debug: bool,
}

/// Keys accepted in the TOML config file. Upper-case spellings are accepted too.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(alias = "PORT")]
    port: Option<u16>,
    #[serde(alias = "DOCROOT")]
    docroot: Option<PathBuf>,
    #[serde(alias = "DEBUG")]
    debug: Option<bool>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Validated, immutable server settings.
///
/// Built once at startup and shared read-only with every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    port: u16,
    document_root: PathBuf,
    debug: bool,
}

impl ServerConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidPort`] — `port` is 0.
    /// - [`ConfigError::DocumentRoot`] — `document_root` is not an existing directory.
    pub fn new(
        port: u16,
        document_root: impl Into<PathBuf>,
        debug: bool,
    ) -> Result<Self, ConfigError> {
        let document_root = document_root.into();
        if port == 0 {
            return Err(ConfigError::InvalidPort(port));
        }
        if !document_root.is_dir() {
            return Err(ConfigError::DocumentRoot {
                path: document_root,
            });
        }
        Ok(Self {
            port,
            document_root,
            debug,
        })
    }

    /// Layers defaults, the optional config file and the flags, then validates.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: an unreadable or malformed file, or invalid values.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };

        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let document_root = cli
            .docroot
            .clone()
            .or(file.docroot)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCROOT));
        let debug = cli.debug || file.debug.unwrap_or(false);

        Self::new(port, document_root, debug)
    }

    /// Returns the port to listen on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the directory request targets are appended to.
    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Returns `true` if debug logging was requested.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns `true` if the port lies in the range reserved by the operating system.
    pub fn is_reserved_port(&self) -> bool {
        self.port <= RESERVED_PORT_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pageserve").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let config = ServerConfig::load(&cli(&["--port", "8123", "--docroot", root, "--debug"]))
            .unwrap();
        assert_eq!(config.port(), 8123);
        assert_eq!(config.document_root(), dir.path());
        assert!(config.debug());
    }

    #[test]
    fn file_values_are_used_when_flags_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PORT = 6001").unwrap();
        writeln!(file, "DOCROOT = {:?}", dir.path().to_str().unwrap()).unwrap();
        writeln!(file, "debug = true").unwrap();

        let parsed = Cli {
            config: Some(file.path().to_owned()),
            ..Cli::default()
        };
        let config = ServerConfig::load(&parsed).unwrap();
        assert_eq!(config.port(), 6001);
        assert_eq!(config.document_root(), dir.path());
        assert!(config.debug());
    }

    #[test]
    fn flags_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 6001").unwrap();
        writeln!(file, "docroot = {:?}", dir.path().to_str().unwrap()).unwrap();

        let parsed = Cli {
            config: Some(file.path().to_owned()),
            port: Some(7002),
            ..Cli::default()
        };
        assert_eq!(ServerConfig::load(&parsed).unwrap().port(), 7002);
    }

    #[test]
    fn unknown_file_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot = 6001").unwrap();
        let parsed = Cli {
            config: Some(file.path().to_owned()),
            ..Cli::default()
        };
        assert!(matches!(
            ServerConfig::load(&parsed),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let parsed = Cli {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Cli::default()
        };
        assert!(matches!(
            ServerConfig::load(&parsed),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn port_zero_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ServerConfig::new(0, dir.path(), false),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn document_root_must_be_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ServerConfig::new(5000, file.path(), false),
            Err(ConfigError::DocumentRoot { .. })
        ));
        assert!(matches!(
            ServerConfig::new(5000, "/definitely/not/here", false),
            Err(ConfigError::DocumentRoot { .. })
        ));
    }

    #[test]
    fn reserved_ports() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::new(80, dir.path(), false).unwrap().is_reserved_port());
        assert!(!ServerConfig::new(5000, dir.path(), false).unwrap().is_reserved_port());
    }
}
