//! Text → [`Component`] tree.

use super::component::{Component, Parameter, Property, is_valid_name};
use super::error::{ParseError, ParseErrorKind};

/// Join folded lines back into logical content lines.
///
/// Returns each logical line with the physical line number it started on.
/// Accepts CRLF and bare LF line endings and skips empty lines.
pub fn unfold(input: &str) -> Result<Vec<(usize, String)>, ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (idx, raw) in input.split('\n').enumerate() {
        let line_no = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        // A fold is the line break plus exactly one space or tab
        if let Some(rest) = raw.strip_prefix(|c: char| c == ' ' || c == '\t') {
            match lines.last_mut() {
                Some((_, last)) => last.push_str(rest),
                None => {
                    return Err(ParseError::new(
                        line_no,
                        ParseErrorKind::DanglingContinuation,
                    ));
                }
            }
        } else if !raw.is_empty() {
            lines.push((line_no, raw.to_string()));
        }
    }

    Ok(lines)
}

/// Check that raw bytes are UTF-8, reporting the line of the first bad byte.
pub fn decode(input: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(input).map_err(|e| {
        let line = input[..e.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        ParseError::new(line, ParseErrorKind::InvalidEncoding)
    })
}

pub fn parse_bytes(input: &[u8]) -> Result<Component, ParseError> {
    parse_component(decode(input)?)
}

/// Parse a record holding exactly one root component (`VCALENDAR`, `VCARD`, ...).
pub fn parse_component(input: &str) -> Result<Component, ParseError> {
    let mut stack: Vec<Component> = Vec::new();
    let mut root: Option<Component> = None;
    let mut last_line = 1;

    for (line_no, text) in unfold(input)? {
        last_line = line_no;
        let err = |kind| ParseError::new(line_no, kind);

        if root.is_some() {
            return Err(err(ParseErrorKind::TrailingContent));
        }

        let prop = parse_content_line(&text).map_err(err)?;

        if prop.group.is_none() && prop.is("BEGIN") {
            let name = prop.value.trim();
            if name.is_empty() {
                return Err(err(ParseErrorKind::MissingComponentName));
            }
            stack.push(Component::new(name));
        } else if prop.group.is_none() && prop.is("END") {
            let name = prop.value.trim();
            let Some(open) = stack.pop() else {
                return Err(err(ParseErrorKind::UnexpectedEnd(name.to_string())));
            };
            if !open.is(name) {
                return Err(err(ParseErrorKind::MismatchedEnd {
                    expected: open.name,
                    found: name.to_string(),
                }));
            }
            match stack.last_mut() {
                Some(parent) => parent.components.push(open),
                None => root = Some(open),
            }
        } else {
            match stack.last_mut() {
                Some(current) => current.properties.push(prop),
                None => return Err(err(ParseErrorKind::ExpectedBegin(prop.name))),
            }
        }
    }

    match (root, stack.pop()) {
        (Some(root), _) => Ok(root),
        (None, Some(open)) => Err(ParseError::new(
            last_line,
            ParseErrorKind::Unterminated(open.name),
        )),
        (None, None) => Err(ParseError::new(1, ParseErrorKind::Empty)),
    }
}

/// Parse one unfolded content line: `[group.]name *(;param) :value`.
fn parse_content_line(line: &str) -> Result<Property, ParseErrorKind> {
    let name_end = line
        .find(|c: char| c == ';' || c == ':')
        .ok_or(ParseErrorKind::MissingColon)?;
    let (group, name) = split_group(&line[..name_end])?;

    let mut rest = &line[name_end..];
    let mut params = Vec::new();
    while let Some(after) = rest.strip_prefix(';') {
        let (param, remaining) = parse_parameter(after)?;
        params.push(param);
        rest = remaining;
    }

    let value = rest.strip_prefix(':').ok_or(ParseErrorKind::MissingColon)?;

    Ok(Property {
        group,
        name,
        params,
        value: value.to_string(),
    })
}

fn split_group(token: &str) -> Result<(Option<String>, String), ParseErrorKind> {
    let (group, name) = match token.split_once('.') {
        Some((group, name)) => (Some(group), name),
        None => (None, token),
    };

    if !is_valid_name(name) || group.is_some_and(|g| !is_valid_name(g)) {
        return Err(ParseErrorKind::InvalidName(token.to_string()));
    }

    Ok((group.map(str::to_string), name.to_string()))
}

/// Parse a parameter starting right after its `;`. The returned remainder
/// starts at the following `;` or `:`.
fn parse_parameter(input: &str) -> Result<(Parameter, &str), ParseErrorKind> {
    let name_end = input
        .find(|c: char| c == '=' || c == ';' || c == ':')
        .ok_or(ParseErrorKind::MissingColon)?;
    let name = &input[..name_end];
    if !is_valid_name(name) {
        return Err(ParseErrorKind::InvalidName(name.to_string()));
    }

    let mut rest = &input[name_end..];
    let mut values = Vec::new();

    if let Some(after_eq) = rest.strip_prefix('=') {
        rest = after_eq;
        loop {
            let (value, remaining) = parse_param_value(rest)?;
            values.push(value);
            rest = remaining;
            match rest.strip_prefix(',') {
                Some(next) => rest = next,
                None => break,
            }
        }
    }

    Ok((
        Parameter {
            name: name.to_string(),
            values,
        },
        rest,
    ))
}

fn parse_param_value(input: &str) -> Result<(String, &str), ParseErrorKind> {
    if let Some(quoted) = input.strip_prefix('"') {
        let close = quoted.find('"').ok_or(ParseErrorKind::UnterminatedQuote)?;
        let rest = &quoted[close + 1..];
        match rest.chars().next() {
            Some(',' | ';' | ':') => Ok((quoted[..close].to_string(), rest)),
            Some(c) => Err(ParseErrorKind::UnexpectedAfterQuote(c)),
            None => Err(ParseErrorKind::MissingColon),
        }
    } else {
        let end = input
            .find(|c: char| c == ',' || c == ';' || c == ':')
            .ok_or(ParseErrorKind::MissingColon)?;
        Ok((input[..end].to_string(), &input[end..]))
    }
}
