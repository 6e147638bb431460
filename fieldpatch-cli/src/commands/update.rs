use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use fieldpatch_core::ics::LineEnding;
use fieldpatch_core::{FieldMap, FieldUpdater, Record, UpdateOutcome};

use crate::config::FieldpatchConfig;
use crate::render::Render;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Record file to read ("-" or omitted reads stdin)
    pub path: Option<PathBuf>,

    /// Field to set, as NAME=VALUE (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub set: Vec<(String, String)>,

    /// JSON file holding an object of field names to string values
    #[arg(long, value_name = "FILE")]
    pub fields: Option<PathBuf>,

    /// Treat input as a JSON object with the record in `data`, and print
    /// that object back with `data` updated
    #[arg(long)]
    pub json: bool,

    /// Write the result back to the input file
    #[arg(short, long, conflicts_with = "output")]
    pub in_place: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Line ending of the written record (crlf or lf)
    #[arg(long, value_name = "ENDING")]
    pub line_ending: Option<LineEnding>,

    /// Do not fold long lines
    #[arg(long)]
    pub no_fold: bool,

    /// Print what happened to each field on stderr
    #[arg(long)]
    pub report: bool,
}

/// Parse a `NAME=VALUE` pair. The value may itself contain `=`.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid field '{}': expected NAME=VALUE", s))?;
    if name.is_empty() {
        return Err(format!("invalid field '{}': name is empty", s));
    }
    Ok((name.to_string(), value.to_string()))
}

pub fn run(args: UpdateArgs, config: &FieldpatchConfig) -> Result<()> {
    let input_path = args.path.as_deref().filter(|p| *p != Path::new("-"));

    if args.in_place && input_path.is_none() {
        bail!("--in-place needs a record file, not stdin");
    }

    let fields = collect_fields(args.fields.as_deref(), &args.set)?;
    let input = read_input(input_path)?;
    tracing::debug!(bytes = input.len(), fields = fields.len(), "read record");

    let mut options = config.generate_options();
    if let Some(line_ending) = args.line_ending {
        options.line_ending = line_ending;
    }
    if args.no_fold {
        options.fold_width = None;
    }
    let updater = FieldUpdater::new(options);

    let (output, outcome) = if args.json {
        update_json(&updater, &input, &fields)?
    } else {
        let outcome = updater.update_with_report(Record::Bytes(&input), &fields)?;
        (outcome.text.clone(), outcome)
    };

    if args.report {
        eprintln!("{}", outcome.render());
    }

    match (args.in_place, &args.output, input_path) {
        (true, _, Some(path)) => write_file(path, &output)?,
        (_, Some(path), _) => write_file(path, &output)?,
        _ => std::io::stdout()
            .write_all(output.as_bytes())
            .context("Could not write to stdout")?,
    }

    Ok(())
}

/// Fields from the JSON file first, then `--set` flags on top.
fn collect_fields(fields_file: Option<&Path>, set: &[(String, String)]) -> Result<FieldMap> {
    let mut fields = FieldMap::new();

    if let Some(path) = fields_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read fields file {}", path.display()))?;
        let from_file: BTreeMap<String, String> = serde_json::from_str(&content).with_context(|| {
            format!(
                "Fields file {} must be a JSON object of string values",
                path.display()
            )
        })?;
        fields.extend(from_file);
    }

    fields.extend(set.iter().cloned());
    Ok(fields)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn update_json(
    updater: &FieldUpdater,
    input: &[u8],
    fields: &FieldMap,
) -> Result<(String, UpdateOutcome)> {
    let object: serde_json::Value =
        serde_json::from_slice(input).context("Input is not valid JSON")?;

    let outcome = updater.update_with_report(&object, fields)?;

    let mut updated = object;
    updated["data"] = serde_json::Value::String(outcome.text.clone());
    let mut output = serde_json::to_string_pretty(&updated)?;
    output.push('\n');

    Ok((output, outcome))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote record");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("SUMMARY=Team sync"),
            Ok(("SUMMARY".to_string(), "Team sync".to_string()))
        );
        assert_eq!(
            parse_field("URL=https://example.com/?a=b"),
            Ok(("URL".to_string(), "https://example.com/?a=b".to_string()))
        );
        assert_eq!(parse_field("X-EMPTY="), Ok(("X-EMPTY".to_string(), String::new())));
        assert!(parse_field("SUMMARY").is_err());
        assert!(parse_field("=value").is_err());
    }

    #[test]
    fn test_set_flags_override_fields_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, r#"{"SUMMARY": "From file", "LOCATION": "Room 1"}"#).unwrap();

        let fields = collect_fields(
            Some(&path),
            &[("SUMMARY".to_string(), "From flag".to_string())],
        )
        .unwrap();

        assert_eq!(fields.get("SUMMARY").map(String::as_str), Some("From flag"));
        assert_eq!(fields.get("LOCATION").map(String::as_str), Some("Room 1"));
    }

    #[test]
    fn test_fields_file_must_hold_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, r#"{"SEQUENCE": 3}"#).unwrap();

        assert!(collect_fields(Some(&path), &[]).is_err());
    }
}
