// CSV roster loading.
//
// This is a deliberately naive tokenizer: lines split on `\n` (with an
// optional preceding `\r`), fields split on every comma. Quoting and escaped
// delimiters are not recognised.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{Columns, Record};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("CSV must have a header row and at least one data row (found {usable_lines} non-blank line(s))")]
    MalformedInput { usable_lines: usize },

    #[error("line {line}: expected {expected} field(s), found {found}")]
    RowShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("header is missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("dedupe column `{column}` is not present in the header")]
    UnknownDedupeColumn { column: String },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a data row whose field count differs from the header's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Drop the row and record it in `Roster::skipped_rows`.
    #[default]
    Lenient,
    /// Fail the whole parse with `LoadError::RowShapeMismatch`.
    Strict,
}

/// Drop rows whose value in `column` was already seen. First occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeRule {
    pub column: String,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    pub row_policy: RowPolicy,
    /// Columns the header must declare, e.g. `First_Name`, `Last_Name`.
    pub required_columns: Vec<String>,
    pub dedupe: Option<DedupeRule>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A data row dropped for having the wrong number of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based physical line in the input text.
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

/// A data row dropped by the dedupe rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedDuplicate {
    pub line: usize,
    /// The trimmed field text that collided.
    pub value: String,
}

/// Result of `parse_with`: the candidate records plus what was discarded.
#[derive(Debug, Clone)]
pub struct Roster {
    pub columns: Arc<Columns>,
    pub records: Vec<Record>,
    pub skipped_rows: Vec<SkippedRow>,
    pub duplicates_dropped: Vec<DroppedDuplicate>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when any data row was discarded.
    pub fn has_discards(&self) -> bool {
        !self.skipped_rows.is_empty() || !self.duplicates_dropped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse with default options: lenient rows, no required columns, no dedupe.
pub fn parse(text: &str) -> Result<Vec<Record>, LoadError> {
    parse_with(text, &LoaderOptions::default()).map(|roster| roster.records)
}

pub fn parse_with(text: &str, options: &LoaderOptions) -> Result<Roster, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<(usize, &str)> = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(LoadError::MalformedInput {
            usable_lines: lines.len(),
        });
    }

    let header = Header::parse(lines[0].1);
    let columns = Arc::clone(&header.columns);

    let missing: Vec<String> = options
        .required_columns
        .iter()
        .filter(|name| !columns.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    let dedupe = match &options.dedupe {
        Some(rule) => {
            let pos = columns
                .position(&rule.column)
                .ok_or_else(|| LoadError::UnknownDedupeColumn {
                    column: rule.column.clone(),
                })?;
            Some((header.source_index[pos], rule.case_insensitive))
        }
        None => None,
    };

    let mut records = Vec::with_capacity(lines.len() - 1);
    let mut skipped_rows = Vec::new();
    let mut duplicates_dropped = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for &(line_no, line) in &lines[1..] {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if fields.len() != header.width {
            match options.row_policy {
                RowPolicy::Strict => {
                    return Err(LoadError::RowShapeMismatch {
                        line: line_no,
                        expected: header.width,
                        found: fields.len(),
                    });
                }
                RowPolicy::Lenient => {
                    warn!(
                        "skipping line {}: expected {} fields, found {}",
                        line_no,
                        header.width,
                        fields.len()
                    );
                    skipped_rows.push(SkippedRow {
                        line: line_no,
                        expected: header.width,
                        found: fields.len(),
                    });
                    continue;
                }
            }
        }

        if let Some((field_idx, case_insensitive)) = dedupe {
            let raw = fields[field_idx];
            let key = if case_insensitive {
                raw.to_ascii_lowercase()
            } else {
                raw.to_string()
            };
            if !seen.insert(key) {
                warn!("dropping duplicate entry '{}' on line {}", raw, line_no);
                duplicates_dropped.push(DroppedDuplicate {
                    line: line_no,
                    value: raw.to_string(),
                });
                continue;
            }
        }

        let raw = header
            .source_index
            .iter()
            .map(|&i| fields[i].to_string())
            .collect();
        records.push(Record::new(Arc::clone(&columns), raw));
    }

    debug!(
        "parsed {} record(s) over {} column(s); {} skipped, {} duplicate(s)",
        records.len(),
        columns.len(),
        skipped_rows.len(),
        duplicates_dropped.len()
    );

    Ok(Roster {
        columns,
        records,
        skipped_rows,
        duplicates_dropped,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The header row, resolved into unique columns.
struct Header {
    columns: Arc<Columns>,
    /// For each unique column, the field index its value is read from.
    source_index: Vec<usize>,
    /// Raw field count every data row must match.
    width: usize,
}

impl Header {
    /// A repeated name keeps its first position but reads the last field
    /// carrying that name, the same outcome as assigning keys onto an object.
    fn parse(line: &str) -> Self {
        let raw: Vec<&str> = line.split(',').map(str::trim).collect();
        let mut names: Vec<String> = Vec::with_capacity(raw.len());
        let mut source_index: Vec<usize> = Vec::with_capacity(raw.len());

        for (i, name) in raw.iter().enumerate() {
            match names.iter().position(|n| n == name) {
                Some(existing) => source_index[existing] = i,
                None => {
                    names.push((*name).to_string());
                    source_index.push(i);
                }
            }
        }

        Header {
            columns: Arc::new(Columns::new(names)),
            source_index,
            width: raw.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
