//! Crate error type
//!
//! Only the I/O edges (config files, runtime bundles, export writes) and
//! command-line arguments can fail. Everything inside the core degrades to
//! defaults instead.

use std::fmt;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A JSON document could not be parsed or produced
    Json(serde_json::Error),
    /// A wasm-bindgen output directory is missing one of its artifacts
    MissingArtifact(PathBuf),
    /// A `key=value` parameter override could not be parsed
    BadOverride(String),
    /// A command named a template id that is not in the catalog
    UnknownTemplate(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Error::Json(e) => write!(f, "invalid JSON: {e}"),
            Error::MissingArtifact(path) => {
                write!(f, "runtime artifact not found: {}", path.display())
            }
            Error::BadOverride(raw) => {
                write!(f, "expected key=number parameter override, got {raw:?}")
            }
            Error::UnknownTemplate(id) => write!(f, "unknown template {id:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
