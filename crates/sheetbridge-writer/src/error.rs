//! Error types for sheetbridge-writer

use thiserror::Error;

/// Result type alias using [`WriterError`]
pub type Result<T> = std::result::Result<T, WriterError>;

/// Errors raised while assembling a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriterError {
    /// Another sheet already uses the name
    #[error("Sheet with name [{0}] already exists")]
    DuplicateSheetName(String),

    /// No sheet with this name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A merge span runs past the last addressable row or column
    #[error("Range starting at {start} cannot span {span} more cells")]
    RangeOverflow { start: u32, span: u32 },

    /// An operation needed a selected sheet but none was selected
    #[error("No sheet selected")]
    NoSheetSelected,
}
