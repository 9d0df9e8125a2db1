//! Error types for collection building and parsing.
//!
//! Every variant here is fatal: it aborts the build and propagates to the
//! caller. Non-fatal conditions (structure validation, script execution)
//! live in the extraction layer and never surface through these types.

use std::fmt;
use std::io;

/// Errors that can occur while building a collection from an export file.
#[derive(Debug)]
pub enum BuildError {
    /// The collection file could not be read.
    Io(io::Error),

    /// The bytes do not deserialize into the matched parser's expected
    /// shape.
    MalformedInput(serde_json::Error),

    /// No registered parser accepted the content.
    NoParserMatched,

    /// An `order` array references a request ID absent from the flat
    /// record set (v1 schema only).
    RequestNotFound {
        /// The dangling request ID.
        id: String,
    },

    /// A `folders_order` array references a folder ID absent from the flat
    /// record set (v1 schema only).
    FolderNotFound {
        /// The dangling folder ID.
        id: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io(err) => write!(f, "failed to read collection file: {}", err),
            BuildError::MalformedInput(err) => {
                write!(f, "failed to parse collection file: {}", err)
            }
            BuildError::NoParserMatched => {
                write!(f, "no registered parser accepted the collection file")
            }
            BuildError::RequestNotFound { id } => {
                write!(f, "failed to build request {}: request not found", id)
            }
            BuildError::FolderNotFound { id } => {
                write!(f, "failed to build folder {}: folder not found", id)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(err) => Some(err),
            BuildError::MalformedInput(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BuildError {
    fn from(err: io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::MalformedInput(err)
    }
}
