//! Error types for pwmerge-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using pwmerge-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pwmerge-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific file
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot could not be parsed or is missing a table/field
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An id or name expected in a table is absent
    #[error("Lookup failed: no {table} entry with {key}")]
    Lookup { table: &'static str, key: String },

    /// Remote system accounts/groups absent locally, under the fail policy
    #[error("Missing system entries (install the packages that provide them first): {0}")]
    MissingSystemEntries(String),

    /// No free id at or above the allocation start
    #[error("No free id available at or above {start}")]
    IdSpaceExhausted { start: u32 },
}

impl Error {
    pub(crate) fn lookup(table: &'static str, key: impl Into<String>) -> Self {
        Self::Lookup {
            table,
            key: key.into(),
        }
    }
}
