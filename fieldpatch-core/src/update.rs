//! Field-level record updates.
//!
//! An update parses the record, picks the component to change, upserts each
//! field on it, and serializes the whole tree again. Properties and sibling
//! components that are not named in the field map are never touched.

use std::collections::BTreeMap;

use crate::change::FieldChange;
use crate::error::{FieldPatchError, FieldPatchResult};
use crate::ics::{self, Component, GenerateOptions};
use crate::record::Record;

/// Root components that wrap the records to update.
pub const CONTAINER_COMPONENTS: &[&str] = &["VCALENDAR"];

/// Children of a container that can be updated, in priority order.
pub const UPDATABLE_COMPONENTS: &[&str] = &["VEVENT", "VTODO", "VJOURNAL"];

/// Convenience map type for callers building fields by hand.
pub type FieldMap = BTreeMap<String, String>;

/// How the root of a record relates to the component being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// The root wraps typed sub-records (`VCALENDAR`).
    Container,
    /// The root is the record itself (`VCARD`, or anything that is not a container).
    Standalone,
}

impl RecordShape {
    pub fn of(root: &Component) -> Self {
        if CONTAINER_COMPONENTS.iter().any(|name| root.is(name)) {
            RecordShape::Container
        } else {
            RecordShape::Standalone
        }
    }
}

/// Result of [`FieldUpdater::update_with_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The updated record text.
    pub text: String,
    /// Name of the component the fields were applied to.
    pub target: String,
    pub shape: RecordShape,
    /// One entry per applied field, in application order.
    pub changes: Vec<FieldChange>,
}

/// Applies field maps to records.
#[derive(Debug, Clone, Default)]
pub struct FieldUpdater {
    options: GenerateOptions,
}

impl FieldUpdater {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Apply `fields` to `record` and return the updated record text.
    pub fn update<'a, I, K, V>(
        &self,
        record: impl Into<Record<'a>>,
        fields: I,
    ) -> FieldPatchResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.update_with_report(record, fields).map(|outcome| outcome.text)
    }

    /// Like [`FieldUpdater::update`], also reporting what happened to each field.
    pub fn update_with_report<'a, I, K, V>(
        &self,
        record: impl Into<Record<'a>>,
        fields: I,
    ) -> FieldPatchResult<UpdateOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let record: Record<'a> = record.into();
        let mut root = ics::parse_component(record.text()?)?;

        let shape = RecordShape::of(&root);
        let target = locate_target(&mut root, shape)?;
        tracing::debug!(component = %target.name, ?shape, "located update target");

        let changes = apply_fields(target, fields);
        let target_name = target.name.to_ascii_uppercase();

        let text = ics::generate(&root, &self.options)?;

        Ok(UpdateOutcome {
            text,
            target: target_name,
            shape,
            changes,
        })
    }
}

/// Apply `fields` to `record` with default output options (CRLF, folded at 75 octets).
///
/// ```
/// use fieldpatch_core::update_fields;
///
/// let card = "BEGIN:VCARD\r\nFN:John Doe\r\nEMAIL:john@example.com\r\nEND:VCARD\r\n";
/// let updated = update_fields(card, [("FN", "Jane Doe")]).unwrap();
///
/// assert_eq!(updated, "BEGIN:VCARD\r\nFN:Jane Doe\r\nEMAIL:john@example.com\r\nEND:VCARD\r\n");
/// ```
pub fn update_fields<'a, I, K, V>(
    record: impl Into<Record<'a>>,
    fields: I,
) -> FieldPatchResult<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    FieldUpdater::default().update(record, fields)
}

/// Pick the component that receives the fields.
///
/// Containers are searched by type priority first, so a `VTODO` listed
/// before a `VEVENT` still loses to it.
pub fn locate_target(root: &mut Component, shape: RecordShape) -> FieldPatchResult<&mut Component> {
    match shape {
        RecordShape::Standalone => Ok(root),
        RecordShape::Container => {
            let position = UPDATABLE_COMPONENTS.iter().find_map(|name| {
                root.components.iter().position(|c| c.is(name))
            });
            match position {
                Some(index) => Ok(&mut root.components[index]),
                None => Err(FieldPatchError::NoUpdatableComponent(format!(
                    "{} contains no {} component",
                    root.name.to_ascii_uppercase(),
                    UPDATABLE_COMPONENTS.join(", ")
                ))),
            }
        }
    }
}

/// Upsert every field on `target`.
///
/// Fields are applied sorted by uppercased name (then by the key as given),
/// so appended properties come out in a stable order whatever map type the
/// caller used, and keys differing only in case resolve the same way every
/// time: the last one in that order wins. A `group.NAME` key targets that
/// vCard group only.
pub fn apply_fields<I, K, V>(target: &mut Component, fields: I) -> Vec<FieldChange>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut fields: Vec<(String, K, V)> = fields
        .into_iter()
        .map(|(key, value)| (key.as_ref().to_ascii_uppercase(), key, value))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.as_ref().cmp(b.1.as_ref())));

    fields
        .into_iter()
        .map(|(name, key, value)| {
            let kind = target.upsert_property(key.as_ref(), value.as_ref());
            tracing::trace!(field = %name, %kind, "applied field");
            FieldChange { name, kind }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VTODO\r\n\
UID:todo-1\r\n\
SUMMARY:Todo\r\n\
END:VTODO\r\n\
BEGIN:VEVENT\r\n\
UID:event-1\r\n\
SUMMARY:Original\r\n\
LOCATION:Room 1\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:event-2\r\n\
SUMMARY:Second\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_event_wins_over_earlier_todo() {
        let mut root = ics::parse_component(CALENDAR).unwrap();
        let target = locate_target(&mut root, RecordShape::Container).unwrap();

        assert!(target.is("VEVENT"));
        assert_eq!(target.find_prop("UID").unwrap().value, "event-1");
    }

    #[test]
    fn test_todo_then_journal_fallback() {
        let input = "BEGIN:VCALENDAR\nBEGIN:VJOURNAL\nUID:j\nEND:VJOURNAL\n\
                     BEGIN:VTODO\nUID:t\nEND:VTODO\nEND:VCALENDAR\n";
        let mut root = ics::parse_component(input).unwrap();
        assert!(locate_target(&mut root, RecordShape::Container).unwrap().is("VTODO"));

        let input = "BEGIN:VCALENDAR\nBEGIN:VTIMEZONE\nTZID:UTC\nEND:VTIMEZONE\n\
                     BEGIN:VJOURNAL\nUID:j\nEND:VJOURNAL\nEND:VCALENDAR\n";
        let mut root = ics::parse_component(input).unwrap();
        assert!(locate_target(&mut root, RecordShape::Container).unwrap().is("VJOURNAL"));
    }

    #[test]
    fn test_container_without_updatable_child() {
        let input = "BEGIN:VCALENDAR\nVERSION:2.0\n\
                     BEGIN:VTIMEZONE\nTZID:UTC\nEND:VTIMEZONE\nEND:VCALENDAR\n";
        let mut root = ics::parse_component(input).unwrap();

        let err = locate_target(&mut root, RecordShape::Container).unwrap_err();
        assert!(matches!(err, FieldPatchError::NoUpdatableComponent(_)));
        assert!(err.to_string().contains("VEVENT, VTODO, VJOURNAL"));
    }

    #[test]
    fn test_shape_detection() {
        assert_eq!(
            RecordShape::of(&Component::new("vcalendar")),
            RecordShape::Container
        );
        assert_eq!(RecordShape::of(&Component::new("VCARD")), RecordShape::Standalone);
        assert_eq!(
            RecordShape::of(&Component::new("X-SOMETHING")),
            RecordShape::Standalone
        );
    }

    #[test]
    fn test_only_target_is_modified() {
        let updated = update_fields(CALENDAR, [("summary", "Updated")]).unwrap();

        assert!(updated.contains("SUMMARY:Todo\r\n"));
        assert!(updated.contains("SUMMARY:Updated\r\nLOCATION:Room 1\r\n"));
        assert!(updated.contains("SUMMARY:Second\r\n"));
        assert!(!updated.contains("SUMMARY:Original"));
    }

    #[test]
    fn test_apply_order_is_stable() {
        let mut target = Component::new("VEVENT");
        let changes = apply_fields(&mut target, [("X-B", "2"), ("x-a", "1"), ("X-A", "3")]);

        let names: Vec<_> = target.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["X-A", "X-B"]);
        // "X-A" sorts before "x-a", so the lowercase key is applied last
        assert_eq!(target.find_prop("X-A").unwrap().value, "1");
        assert_eq!(
            changes.iter().map(|c| c.kind).collect::<Vec<_>>(),
            [ChangeKind::Append, ChangeKind::Replace, ChangeKind::Append]
        );
    }

    #[test]
    fn test_report() {
        let outcome = FieldUpdater::default()
            .update_with_report(
                CALENDAR,
                [("SUMMARY", "Updated"), ("UID", "event-1"), ("X-NEW", "1")],
            )
            .unwrap();

        assert_eq!(outcome.target, "VEVENT");
        assert_eq!(outcome.shape, RecordShape::Container);
        let report: Vec<String> = outcome.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(report, ["~ SUMMARY", "= UID", "+ X-NEW"]);
    }
}
