//! Content-line engine for iCalendar (RFC 5545) and vCard (RFC 6350) text.
//!
//! This module only knows the shared grammar: line folding, the
//! `name;param=value:value` content line, and `BEGIN`/`END` nesting.
//! Property values are kept as raw text so that anything not touched by a
//! caller is written back exactly as it was read.

mod component;
mod error;
mod generate;
mod parse;

pub use component::{Component, Parameter, Property, is_valid_name};
pub use error::{GenerateError, ParseError, ParseErrorKind};
pub use generate::{DEFAULT_FOLD_WIDTH, GenerateOptions, LineEnding, MIN_FOLD_WIDTH, generate};
pub use parse::{decode, parse_bytes, parse_component, unfold};
