#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # partcode-pipeline
//!
//! Batch rebuild of the union schema artifact and shared schema snapshots.
//!
//! [`rebuild`] reads the two raw per-site schemas and the cross-reference
//! file, unifies them, validates the result, and writes the artifact. A
//! build error aborts before anything is written. [`SchemaSnapshot`] is the
//! loaded artifact as an immutable value that codec callers share.

pub mod batch;
pub mod snapshot;

pub use batch::{RebuildOutcome, RebuildRequest, rebuild};
pub use snapshot::SchemaSnapshot;

use partcode_adapter_csv::CsvError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur in the pipeline
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// An input or output file could not be processed
    #[error("Pipeline error during {operation} for '{path}': {source}")]
    File {
        operation: String,
        path: String,
        #[source]
        source: CsvError,
    },

    /// The inputs could not be unified
    #[error("Schema build failed: {0}")]
    Schema(#[from] partcode_schema::Error),
}

impl Error {
    /// Wrap an adapter error with operation/path context.
    pub fn file(operation: impl Into<String>, path: &Path, source: CsvError) -> Self {
        Self::File {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }

    /// The schema-level cause, when there is one
    pub fn schema_error(&self) -> Option<&partcode_schema::Error> {
        match self {
            Self::Schema(error) | Self::File { source: CsvError::Schema(error), .. } => Some(error),
            Self::File { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_preserves_operation_and_path_context() {
        let error = Error::file("read", Path::new("/tmp/codeSchema_IK.csv"), CsvError::read_at(3, "bad quote"));
        match &error {
            Error::File { operation, path, source } => {
                assert_eq!(operation, "read");
                assert_eq!(path, "/tmp/codeSchema_IK.csv");
                assert_eq!(source.line_number(), Some(3));
            }
            Error::Schema(_) => panic!("expected file variant"),
        }
        assert!(error.schema_error().is_none());
        assert!(error.to_string().contains("codeSchema_IK.csv"));
    }

    #[test]
    fn schema_error_is_found_through_file_context() {
        let error = Error::file(
            "read",
            Path::new("Cross_Map.csv"),
            CsvError::Schema(partcode_schema::Error::UnknownPair("X".into())),
        );
        assert!(matches!(
            error.schema_error(),
            Some(partcode_schema::Error::UnknownPair(_))
        ));
    }
}
