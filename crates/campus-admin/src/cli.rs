//! Argument parsing and output helpers for the `campus-admin` binary.

use std::path::Path;

use serde_json::Value;

use campus_core::{EntityDescriptor, Error, LocalFile, Page, Record, Result};

/// Parse `name=value`. The value is read as JSON when it parses (numbers,
/// booleans, arrays, objects) and as a plain string otherwise.
pub fn parse_field(arg: &str) -> Result<(String, Value)> {
    let (name, raw) = split_pair(arg)?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

/// Parse `name=path` and read the file, applying upload checks.
pub fn parse_file(arg: &str) -> Result<(String, LocalFile)> {
    let (name, path) = split_pair(arg)?;
    let file = LocalFile::read(Path::new(path))?;
    Ok((name.to_string(), file))
}

fn split_pair(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(Error::Validation(format!(
            "expected name=value, got '{}'",
            arg
        ))),
    }
}

/// Display text of a cell.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Render one page as a plain-text table: id column plus the searchable
/// fields, then the summary and pager lines.
pub fn render_table(descriptor: &EntityDescriptor, page: &Page<&Record>) -> String {
    let mut headers = vec!["id"];
    headers.extend(descriptor.search_fields.iter().copied());

    let rows: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|record| {
            let mut row = vec![record.id().map(|id| id.to_string()).unwrap_or_default()];
            row.extend(
                descriptor
                    .search_fields
                    .iter()
                    .map(|field| cell(record.get(field))),
            );
            row
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 3);
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.extend(rows.into_iter().map(line));
    out.push(String::new());
    out.push(page.showing().to_string());
    let pager: Vec<String> = page
        .page_numbers()
        .into_iter()
        .map(|n| {
            if n == page.current_page {
                format!("[{}]", n)
            } else {
                n.to_string()
            }
        })
        .collect();
    out.push(format!("Pages: {}", pager.join(" ")));
    out.join("\n")
}
