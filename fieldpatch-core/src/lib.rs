//! Field-level updates for iCalendar and vCard records.
//!
//! This crate provides:
//! - `update_fields` / `FieldUpdater` to change or add individual properties
//!   on the event, task, journal entry, or contact inside a record while
//!   keeping everything else as it was
//! - `ics` module with the content-line parser and serializer the updater runs on
//! - `record` module with the input shapes a transport layer hands over

pub mod change;
pub mod error;
pub mod ics;
pub mod record;
pub mod update;

pub use change::{ChangeKind, FieldChange};
pub use error::{FieldPatchError, FieldPatchResult};
pub use record::{DavResource, Record};
pub use update::{FieldMap, FieldUpdater, RecordShape, UpdateOutcome, update_fields};
