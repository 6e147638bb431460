//! Error types for field updates.

use thiserror::Error;

use crate::ics::{GenerateError, ParseError};

/// Errors that can occur while updating a record.
///
/// Every variant is terminal: the operation is pure computation over the
/// provided text, so retrying with the same input fails the same way.
#[derive(Error, Debug)]
pub enum FieldPatchError {
    /// Nothing usable was given: an empty record, or a wrapper without `data`.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The record text was given but does not parse.
    #[error("Could not parse record: {0}")]
    ParseFailure(#[from] ParseError),

    /// A calendar container holds nothing this operation knows how to update.
    #[error("No updatable component: {0}")]
    NoUpdatableComponent(String),

    /// An upserted field cannot be written back out in the record grammar.
    #[error("Unrepresentable field: {0}")]
    UnrepresentableField(#[from] GenerateError),
}

/// Result type alias for field updates.
pub type FieldPatchResult<T> = Result<T, FieldPatchError>;
