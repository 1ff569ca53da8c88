//! Path resolution and the traversal guard.
//!
//! This is the only part of the server that decides which bytes on disk a
//! client may see. All checks are plain substring scans over the raw target:
//!
//! - any target containing `..` or `~` is forbidden, even when the sequence
//!   sits inside an otherwise harmless file name;
//! - the first entry of [`ContentType::ALL`] whose extension occurs anywhere
//!   in the target selects the file branch;
//! - the file path is the document root with the target appended verbatim.
//!
//! Nothing here touches the filesystem.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Substrings that make a target forbidden.
pub const FORBIDDEN_SEQUENCES: [&str; 2] = ["..", "~"];

/// A servable kind of file, identified by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Html,
    Css,
}

impl ContentType {
    /// The allow-list, in match order.
    pub const ALL: [ContentType; 2] = [ContentType::Html, ContentType::Css];

    /// Returns the extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => ".html",
            Self::Css => ".css",
        }
    }

    /// Returns the MIME type for this kind of file.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Css => "text/css",
        }
    }

    /// Returns the first allow-listed type whose extension occurs in `target`.
    pub fn detect(target: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| target.contains(kind.extension()))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// What the server should do with a GET target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The target contains a forbidden sequence.
    Forbidden,
    /// The target matched no allow-listed extension; nothing is sent.
    Unmatched,
    /// Serve the file at `path`.
    File {
        path: PathBuf,
        content_type: ContentType,
    },
}

/// Returns `true` if `target` contains `..` or `~` anywhere.
pub fn is_forbidden(target: &str) -> bool {
    FORBIDDEN_SEQUENCES.iter().any(|seq| target.contains(*seq))
}

/// Resolves a raw target against the document root.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use pageserve::guard::{resolve, ContentType, Resolution};
///
/// assert_eq!(
///     resolve(Path::new("./pages"), "/index.html"),
///     Resolution::File {
///         path: PathBuf::from("./pages/index.html"),
///         content_type: ContentType::Html,
///     },
/// );
/// assert_eq!(resolve(Path::new("./pages"), "/../etc.html"), Resolution::Forbidden);
/// assert_eq!(resolve(Path::new("./pages"), "/robots.txt"), Resolution::Unmatched);
/// ```
pub fn resolve(document_root: &Path, target: &str) -> Resolution {
    if is_forbidden(target) {
        return Resolution::Forbidden;
    }

    match ContentType::detect(target) {
        Some(content_type) => Resolution::File {
            path: join_verbatim(document_root, target),
            content_type,
        },
        None => Resolution::Unmatched,
    }
}

/// Appends `target` to `root` as a string, without inserting or removing separators.
fn join_verbatim(root: &Path, target: &str) -> PathBuf {
    let mut joined = OsString::from(root.as_os_str());
    joined.push(target);
    PathBuf::from(joined)
}
