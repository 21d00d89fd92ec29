//! Error types for CSV adapter with context

use thiserror::Error;

/// Errors that can occur when working with CSV
#[derive(Error, Debug, Clone)]
pub enum CsvError {
    /// CSV read error with context
    #[error("CSV read error at line {line}: {message}")]
    Read { line: usize, message: String },

    /// CSV write error
    #[error("CSV write error: {0}")]
    Write(String),

    /// None of the configured encodings could decode the file
    #[error("Cannot decode {path}: tried {tried}")]
    Encoding { path: String, tried: String },

    /// Table shape error reported by the schema layer
    #[error(transparent)]
    Schema(#[from] partcode_schema::Error),

    /// Cell conversion error with context
    #[error("Conversion error at line {line}, column '{column}': {message}")]
    Conversion {
        line: usize,
        column: String,
        message: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CsvError {
    /// Create a read error at a specific line
    pub fn read_at(line: usize, message: impl Into<String>) -> Self {
        Self::Read {
            line,
            message: message.into(),
        }
    }

    /// Create a read error without line number
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            line: 0,
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(line: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            line,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Map a `csv` crate error, keeping its line when it has one
    pub fn from_csv(error: &csv::Error) -> Self {
        match error.position() {
            Some(position) => Self::read_at(usize::try_from(position.line()).unwrap_or(0), error.to_string()),
            None => Self::read(error.to_string()),
        }
    }

    /// Get the line number if available
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Read { line, .. } if *line > 0 => Some(*line),
            Self::Conversion { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type alias for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;
