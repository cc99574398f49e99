//! CSV export of result tables.
//!
//! The download affordance writes the selected result table to disk as
//! CSV. `parse_csv` is the inverse used to verify round-trips.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::table::ResultTable;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Renders a result table as CSV text, header first. Fields containing
/// the delimiter, quotes or newlines are quoted with doubled quotes.
pub fn csv_string(table: &ResultTable) -> String {
    let mut out = String::new();

    let header: Vec<String> = table
        .schema
        .columns
        .iter()
        .map(|c| escape_field(&c.name))
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in &table.rows {
        let fields: Vec<String> = row
            .values
            .iter()
            .map(|v| escape_field(&v.to_string()))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

pub fn write_csv(table: &ResultTable, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, csv_string(table))?;
    Ok(())
}

/// Derives an export file name from a section description:
/// "Total Profit by Category" becomes "total_profit_by_category.csv".
pub fn file_name_for(description: &str) -> String {
    let slug: String = description
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_').to_string();
    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }
    format!("{collapsed}.csv")
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parses CSV text back into a header and string rows. Handles quoted
/// fields with embedded delimiters, quotes and newlines.
pub fn parse_csv(input: &str) -> Result<(Vec<String>, Vec<Vec<String>>), ExportError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut field = String::new();
    let mut record: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut line = 1usize;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    field.push(c);
                    line += 1;
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => {
                    if !field.is_empty() {
                        return Err(ExportError::Parse {
                            line,
                            message: "unexpected quote inside unquoted field".to_string(),
                        });
                    }
                    in_quotes = true;
                }
                ',' => {
                    record.push(std::mem::take(&mut field));
                }
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    line += 1;
                }
                '\r' => {}
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(ExportError::Parse {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    if records.is_empty() {
        return Err(ExportError::Parse {
            line: 1,
            message: "empty document".to_string(),
        });
    }

    let header = records.remove(0);
    Ok((header, records))
}
