//! Error types for loading qualifying-total tables.

use thiserror::Error;

/// Errors that can occur while loading a source into a tidy table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Name/extension is neither a workbook nor a CSV file.
    #[error("unsupported file type or file not found: {name}")]
    UnsupportedFormat { name: String },

    /// The underlying reader failed.
    #[error("could not read {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseCause,
    },

    /// One or more fixed columns are absent.
    #[error("{name} is missing required column(s): {}", missing.join(", "))]
    Schema {
        name: String,
        missing: Vec<&'static str>,
    },

    /// Workbook without a single sheet.
    #[error("{name} contains no sheets")]
    Empty { name: String },
}

/// The reader-level failure behind [`LoadError::Parse`].
#[derive(Debug, Error)]
pub enum ParseCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
