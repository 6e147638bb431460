//! [`Component`] tree → text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::component::{Component, Property, is_valid_name};
use super::error::GenerateError;

/// RFC 5545 §3.1: lines SHOULD NOT be longer than 75 octets.
pub const DEFAULT_FOLD_WIDTH: usize = 75;

/// Narrowest fold width accepted; anything smaller is raised to this.
pub const MIN_FOLD_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Crlf => write!(f, "crlf"),
            LineEnding::Lf => write!(f, "lf"),
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" => Ok(LineEnding::Crlf),
            "lf" => Ok(LineEnding::Lf),
            other => Err(format!("unknown line ending '{}' (expected crlf or lf)", other)),
        }
    }
}

/// How a tree is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub line_ending: LineEnding,
    /// Maximum octets per physical line, or `None` to never fold.
    pub fold_width: Option<usize>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Crlf,
            fold_width: Some(DEFAULT_FOLD_WIDTH),
        }
    }
}

/// Serialize a component and all of its children.
pub fn generate(component: &Component, options: &GenerateOptions) -> Result<String, GenerateError> {
    let mut out = String::new();
    write_component(&mut out, component, options)?;
    Ok(out)
}

fn write_component(
    out: &mut String,
    component: &Component,
    options: &GenerateOptions,
) -> Result<(), GenerateError> {
    let name = component.name.to_ascii_uppercase();
    write_line(out, &format!("BEGIN:{}", name), options);

    for prop in &component.properties {
        write_line(out, &content_line(prop)?, options);
    }
    for child in &component.components {
        write_component(out, child, options)?;
    }

    write_line(out, &format!("END:{}", name), options);
    Ok(())
}

fn content_line(prop: &Property) -> Result<String, GenerateError> {
    let invalid_group = prop.group.as_deref().is_some_and(|g| !is_valid_name(g));
    if invalid_group || !is_valid_name(&prop.name) {
        let full = match &prop.group {
            Some(group) => format!("{}.{}", group, prop.name),
            None => prop.name.clone(),
        };
        return Err(GenerateError::InvalidName(full));
    }
    if prop.group.is_none() && (prop.is("BEGIN") || prop.is("END")) {
        return Err(GenerateError::ReservedName(prop.name.to_ascii_uppercase()));
    }
    if prop.value.contains('\n') {
        return Err(GenerateError::LineBreakInValue(prop.name.to_ascii_uppercase()));
    }

    let mut line = String::with_capacity(prop.name.len() + prop.value.len() + 1);

    if let Some(group) = &prop.group {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(&prop.name.to_ascii_uppercase());

    for param in &prop.params {
        if !is_valid_name(&param.name) {
            return Err(GenerateError::InvalidName(param.name.clone()));
        }
        line.push(';');
        line.push_str(&param.name.to_ascii_uppercase());

        for (i, value) in param.values.iter().enumerate() {
            line.push(if i == 0 { '=' } else { ',' });
            if value.contains(&[':', ';', ','][..]) {
                line.push('"');
                line.push_str(value);
                line.push('"');
            } else {
                line.push_str(value);
            }
        }
    }

    line.push(':');
    line.push_str(&prop.value);

    Ok(line)
}

/// Write one logical line, folding it on character boundaries so no
/// physical line exceeds the fold width in octets.
fn write_line(out: &mut String, line: &str, options: &GenerateOptions) {
    let eol = options.line_ending.as_str();

    let Some(width) = options.fold_width.map(|w| w.max(MIN_FOLD_WIDTH)) else {
        out.push_str(line);
        out.push_str(eol);
        return;
    };

    let mut used = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if used + len > width {
            out.push_str(eol);
            out.push(' ');
            used = 1;
        }
        out.push(c);
        used += len;
    }
    out.push_str(eol);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::{Parameter, parse_component};

    fn generate_default(component: &Component) -> String {
        generate(component, &GenerateOptions::default()).unwrap()
    }

    #[test]
    fn test_generate_nested_with_crlf() {
        let mut cal = Component::new("vcalendar");
        cal.properties.push(Property::new("VERSION", "2.0"));
        let mut event = Component::new("VEVENT");
        event.properties.push(Property::new("uid", "1"));
        cal.components.push(event);

        assert_eq!(
            generate_default(&cal),
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\n\
             END:VEVENT\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn test_long_lines_are_folded_at_75_octets() {
        let mut card = Component::new("VCARD");
        card.properties.push(Property::new("NOTE", "x".repeat(200)));

        let ics = generate_default(&card);
        for line in ics.split("\r\n") {
            assert!(line.len() <= DEFAULT_FOLD_WIDTH, "line too long: {}", line);
        }

        let reparsed = parse_component(&ics).unwrap();
        assert_eq!(reparsed.find_prop("NOTE").unwrap().value, "x".repeat(200));
    }

    #[test]
    fn test_folding_respects_char_boundaries() {
        let mut card = Component::new("VCARD");
        card.properties.push(Property::new("NOTE", "é".repeat(100)));

        let ics = generate_default(&card);
        for line in ics.split("\r\n") {
            assert!(line.len() <= DEFAULT_FOLD_WIDTH);
        }

        let reparsed = parse_component(&ics).unwrap();
        assert_eq!(reparsed.find_prop("NOTE").unwrap().value, "é".repeat(100));
    }

    #[test]
    fn test_fold_preserves_spaces_at_fold_point() {
        let value = format!("{} {}", "a".repeat(70), "b".repeat(10));
        let mut card = Component::new("VCARD");
        card.properties.push(Property::new("NOTE", value.clone()));

        let reparsed = parse_component(&generate_default(&card)).unwrap();
        assert_eq!(reparsed.find_prop("NOTE").unwrap().value, value);
    }

    #[test]
    fn test_no_fold_and_lf() {
        let mut card = Component::new("VCARD");
        card.properties.push(Property::new("NOTE", "y".repeat(100)));
        let options = GenerateOptions {
            line_ending: LineEnding::Lf,
            fold_width: None,
        };

        let ics = generate(&card, &options).unwrap();
        assert_eq!(ics, format!("BEGIN:VCARD\nNOTE:{}\nEND:VCARD\n", "y".repeat(100)));
    }

    #[test]
    fn test_param_values_with_separators_are_quoted() {
        let mut event = Component::new("VEVENT");
        event.properties.push(Property {
            group: None,
            name: "ATTENDEE".into(),
            params: vec![
                Parameter {
                    name: "cn".into(),
                    values: vec!["Doe, John".into()],
                },
                Parameter {
                    name: "ROLE".into(),
                    values: vec!["REQ-PARTICIPANT".into()],
                },
            ],
            value: "mailto:john@example.com".into(),
        });

        let ics = generate_default(&event);
        assert!(ics.contains(
            "ATTENDEE;CN=\"Doe, John\";ROLE=REQ-PARTICIPANT:mailto:john@example.com\r\n"
        ));
    }

    #[test]
    fn test_parsed_values_are_written_verbatim() {
        let input = "BEGIN:VCARD\r\nNOTE:a\rb\r\nFN:x\r\nEND:VCARD\r\n";
        let parsed = parse_component(input).unwrap();

        assert_eq!(parsed.find_prop("NOTE").unwrap().value, "a\rb");
        assert_eq!(generate_default(&parsed), input);
    }

    #[test]
    fn test_raw_line_feed_in_value_is_rejected() {
        let mut card = Component::new("VCARD");
        card.properties.push(Property {
            group: None,
            name: "NOTE".into(),
            params: Vec::new(),
            value: "a\nb".into(),
        });

        assert_eq!(
            generate(&card, &GenerateOptions::default()),
            Err(GenerateError::LineBreakInValue("NOTE".into()))
        );
    }

    #[test]
    fn test_begin_and_end_properties_are_rejected() {
        let mut card = Component::new("VCARD");
        card.properties.push(Property::new("end", "VCARD"));
        assert_eq!(
            generate(&card, &GenerateOptions::default()),
            Err(GenerateError::ReservedName("END".into()))
        );

        let mut card = Component::new("VCARD");
        let mut grouped = Property::new("BEGIN", "x");
        grouped.group = Some("item1".into());
        card.properties.push(grouped);
        assert!(generate_default(&card).contains("item1.BEGIN:x\r\n"));
    }

    #[test]
    fn test_line_breaks_in_values_are_escaped() {
        let mut event = Component::new("VEVENT");
        event
            .properties
            .push(Property::new("DESCRIPTION", "one\r\ntwo\nthree\rfour"));

        let ics = generate_default(&event);
        assert!(ics.contains("DESCRIPTION:one\\ntwo\\nthree\\nfour\r\n"));
    }

    #[test]
    fn test_invalid_property_name_is_rejected() {
        let mut event = Component::new("VEVENT");
        event.properties.push(Property::new("BAD NAME", "x"));

        assert_eq!(
            generate(&event, &GenerateOptions::default()),
            Err(GenerateError::InvalidName("BAD NAME".into()))
        );
    }

    #[test]
    fn test_roundtrip_keeps_tree() {
        let input = "BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
item1.EMAIL;TYPE=work,pref:john@example.com\r\n\
TEL;HOME:555-1234\r\n\
N:Doe;John;;;\r\n\
NOTE:a\\, b\\nc\r\n\
END:VCARD\r\n";
        let parsed = parse_component(input).unwrap();
        let reparsed = parse_component(&generate_default(&parsed)).unwrap();

        assert_eq!(parsed, reparsed);
        assert_eq!(generate_default(&parsed), input);
    }

    #[test]
    fn test_line_ending_from_str() {
        assert_eq!("CRLF".parse::<LineEnding>(), Ok(LineEnding::Crlf));
        assert_eq!("lf".parse::<LineEnding>(), Ok(LineEnding::Lf));
        assert!("cr".parse::<LineEnding>().is_err());
    }
}
