//! Entry validation
//!
//! Two independent checks run over every raw entry:
//! - missing fields: each of [`REQUIRED_FIELDS`] must be present and non-blank
//! - formatting: every present field is checked against the generic rules,
//!   whether or not it belongs to the schema
//!
//! Nothing short-circuits; a report lists every problem found.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::entry::REQUIRED_FIELDS;
use crate::error::Result;
use crate::store::{RawEntry, SourcePos, read_positioned, scalar_text};

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("valid regex"));

/// A formatting violation on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidField {
    pub field: String,
    pub message: String,
}

impl InvalidField {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation outcome for a single entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    /// Position of the entry in its list
    pub index: usize,
    /// The entry's id, or `(unknown id)`
    pub id: String,
    pub line: usize,
    pub col: usize,
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<InvalidField>,
}

impl EntryReport {
    pub fn is_valid(&self) -> bool {
        self.missing_fields.is_empty() && self.invalid_fields.is_empty()
    }

    pub fn pos(&self) -> SourcePos {
        SourcePos {
            line: self.line,
            col: self.col,
        }
    }
}

/// Check one raw entry
pub fn validate_entry(entry: &RawEntry) -> EntryReport {
    EntryReport {
        id: entry.id().unwrap_or_else(|| "(unknown id)".to_string()),
        missing_fields: missing_fields(entry),
        invalid_fields: invalid_fields(entry),
        ..Default::default()
    }
}

fn missing_fields(entry: &RawEntry) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            entry
                .text(field)
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(|field| field.to_string())
        .collect()
}

fn invalid_fields(entry: &RawEntry) -> Vec<InvalidField> {
    let mut invalid = Vec::new();

    for (field, value) in entry.fields() {
        if field.ends_with("_link") && !LINK_RE.is_match(&scalar_text(value)) {
            invalid.push(InvalidField::new(&field, "is not a valid URL."));
        }

        if let Some(text) = value.as_str() {
            if text.starts_with(' ') || text.ends_with(' ') {
                invalid.push(InvalidField::new(
                    &field,
                    "should not start or end with a space.",
                ));
            }
        }
    }

    invalid
}

/// Validation outcome for a whole list file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: String,
    /// Every entry in the file, valid or not
    pub entries: Vec<EntryReport>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(EntryReport::is_valid)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn invalid_entries(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| !e.is_valid())
    }
}

/// Validate every entry of a list file
///
/// Also flags ids declared more than once, since the builder matches cached
/// catalog entries by id.
pub fn validate_file(path: &Path) -> Result<FileReport> {
    let positioned = read_positioned(path)?;
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut entries = Vec::with_capacity(positioned.len());

    for (index, item) in positioned.iter().enumerate() {
        let mut report = validate_entry(&item.entry);
        report.index = index;
        report.line = item.pos.line;
        report.col = item.pos.col;

        if let Some(id) = item.entry.id() {
            match first_seen.get(&id) {
                Some(line) => report.invalid_fields.push(InvalidField::new(
                    "id",
                    format!("is duplicated (first declared at line {}).", line),
                )),
                None => {
                    first_seen.insert(id, item.pos.line);
                }
            }
        }

        entries.push(report);
    }

    Ok(FileReport {
        path: path.display().to_string(),
        entries,
    })
}
