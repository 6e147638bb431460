use std::fmt;

use thiserror::Error;

/// A grammar error, located at the (1-based) physical line it was found on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The input holds no content lines at all.
    Empty,
    /// The input is not valid UTF-8.
    InvalidEncoding,
    /// A folded continuation line with nothing before it to continue.
    DanglingContinuation,
    /// A content line without the `:` separating name and value.
    MissingColon,
    /// A property or parameter name with characters outside the token set.
    InvalidName(String),
    /// A double-quoted parameter value that never closes.
    UnterminatedQuote,
    /// A closing quote followed by something other than `,`, `;` or `:`.
    UnexpectedAfterQuote(char),
    /// `BEGIN:` with no component name.
    MissingComponentName,
    /// A property line outside of any component.
    ExpectedBegin(String),
    /// `END:` with no open component.
    UnexpectedEnd(String),
    /// `END:` naming a different component than the one that is open.
    MismatchedEnd { expected: String, found: String },
    /// End of input reached while a component is still open.
    Unterminated(String),
    /// Content after the root component was closed.
    TrailingContent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Empty => write!(f, "no content lines found"),
            ParseErrorKind::InvalidEncoding => write!(f, "input is not valid UTF-8"),
            ParseErrorKind::DanglingContinuation => {
                write!(f, "continuation line without a preceding content line")
            }
            ParseErrorKind::MissingColon => {
                write!(f, "invalid content line (expected NAME:VALUE)")
            }
            ParseErrorKind::InvalidName(name) => write!(f, "invalid name '{}'", name),
            ParseErrorKind::UnterminatedQuote => write!(f, "unterminated quoted parameter value"),
            ParseErrorKind::UnexpectedAfterQuote(c) => {
                write!(f, "unexpected '{}' after quoted parameter value", c)
            }
            ParseErrorKind::MissingComponentName => write!(f, "BEGIN without a component name"),
            ParseErrorKind::ExpectedBegin(name) => {
                write!(f, "property {} found outside of a component", name)
            }
            ParseErrorKind::UnexpectedEnd(name) => {
                write!(f, "END:{} without a matching BEGIN", name)
            }
            ParseErrorKind::MismatchedEnd { expected, found } => {
                write!(f, "expected END:{}, found END:{}", expected, found)
            }
            ParseErrorKind::Unterminated(name) => {
                write!(f, "component {} is never closed", name)
            }
            ParseErrorKind::TrailingContent => {
                write!(f, "content after the end of the root component")
            }
        }
    }
}

/// Errors raised while writing a tree back to text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("name '{0}' cannot be written (allowed: letters, digits, '-', '_')")]
    InvalidName(String),

    /// An ungrouped `BEGIN` or `END` property would be read back as a
    /// component delimiter.
    #[error("'{0}' delimits components and cannot be written as a property")]
    ReservedName(String),

    #[error("value of {0} contains a raw line feed")]
    LineBreakInValue(String),
}
