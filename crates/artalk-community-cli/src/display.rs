//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Validation reports, one block per invalid entry
//! - Line diffs between the published and the local catalog

use console::style;
use serde::Serialize;
use std::fmt::Write;

use artalk_community_core::{EntryReport, FileReport};
use artalk_community_remote::diff::{LineType, line_diff};

/// Validation results for every list file
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub files: Vec<FileReport>,
    /// Files that could not be parsed at all
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn new(files: Vec<FileReport>, errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty() && files.iter().all(FileReport::is_valid),
            files,
            errors,
        }
    }

    /// Number of invalid entries across all files
    pub fn invalid_count(&self) -> usize {
        self.files.iter().map(|f| f.invalid_entries().count()).sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    /// Print every file's outcome
    pub fn display(&self) {
        for error in &self.errors {
            println!("{} {}", style("[FAIL]").red(), error);
        }
        for file in &self.files {
            print!("{}", render_file(file));
        }
    }
}

/// Outcome of one file: a warning when empty, a pass line, or one block per
/// invalid entry
pub fn render_file(report: &FileReport) -> String {
    let mut out = String::new();

    if report.is_empty() {
        let _ = writeln!(
            out,
            "{} No entries found in \"{}\".",
            style("[WARN]").yellow(),
            report.path
        );
        return out;
    }

    if report.is_valid() {
        let _ = writeln!(
            out,
            "{} 🎉 All entries in \"{}\" are valid.",
            style("[PASS]").green(),
            report.path
        );
        return out;
    }

    for entry in report.invalid_entries() {
        out.push_str(&render_entry(&report.path, entry));
    }
    out
}

fn render_entry(path: &str, entry: &EntryReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "\n{} 😢 Invalid entry \"{}\" in \"{}:{}\".\n",
        style("[FAIL]").red(),
        style(&entry.id).red().bold(),
        path,
        entry.pos()
    );

    if !entry.missing_fields.is_empty() {
        let fields: Vec<String> = entry
            .missing_fields
            .iter()
            .map(|f| format!("\"{}\"", f))
            .collect();
        let _ = writeln!(out, "    {}\n", style("Missing fields:").red());
        let _ = writeln!(out, "      [{}]\n", fields.join(", "));
    }

    if !entry.invalid_fields.is_empty() {
        let _ = writeln!(out, "    {}\n", style("Invalid fields:").red());
        for field in &entry.invalid_fields {
            let _ = writeln!(
                out,
                "      - \"{}\" {}",
                style(&field.field).red(),
                field.message
            );
        }
        out.push('\n');
    }

    out
}

/// Print a colored line diff, `old` being the published catalog
pub fn print_line_diff(old: &str, new: &str) {
    for line in line_diff(old, new, 3) {
        let Some(line) = line else {
            println!("{}", style("...").dim());
            continue;
        };
        let text = format!("{}{}", line.prefix(), line.content);
        match line.line_type {
            LineType::Added => println!("{}", style(text).green()),
            LineType::Removed => println!("{}", style(text).red()),
            LineType::Context => println!("{}", style(text).dim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artalk_community_core::InvalidField;

    fn entry(id: &str, missing: &[&str], invalid: &[(&str, &str)]) -> EntryReport {
        EntryReport {
            index: 0,
            id: id.to_string(),
            line: 4,
            col: 3,
            missing_fields: missing.iter().map(|s| s.to_string()).collect(),
            invalid_fields: invalid
                .iter()
                .map(|(field, message)| InvalidField {
                    field: field.to_string(),
                    message: message.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_file() {
        console::set_colors_enabled(false);

        let empty = FileReport {
            path: "themes.yaml".to_string(),
            entries: Vec::new(),
        };
        assert_eq!(
            render_file(&empty),
            "[WARN] No entries found in \"themes.yaml\".\n"
        );

        let valid = FileReport {
            path: "plugins.yaml".to_string(),
            entries: vec![entry("katex", &[], &[])],
        };
        assert_eq!(
            render_file(&valid),
            "[PASS] 🎉 All entries in \"plugins.yaml\" are valid.\n"
        );

        let invalid = FileReport {
            path: "plugins.yaml".to_string(),
            entries: vec![
                entry("katex", &[], &[]),
                entry(
                    "broken",
                    &["name", "author_name"],
                    &[("author_link", "is not a valid URL.")],
                ),
            ],
        };
        let rendered = render_file(&invalid);
        assert!(rendered.contains("[FAIL] 😢 Invalid entry \"broken\" in \"plugins.yaml:4:3\"."));
        assert!(rendered.contains("      [\"name\", \"author_name\"]\n"));
        assert!(rendered.contains("      - \"author_link\" is not a valid URL.\n"));
        assert!(!rendered.contains("katex"));
    }

    #[test]
    fn test_report_counts() {
        let report = ValidationReport::new(
            vec![
                FileReport {
                    path: "plugins.yaml".to_string(),
                    entries: vec![entry("a", &["name"], &[]), entry("b", &[], &[])],
                },
                FileReport {
                    path: "themes.yaml".to_string(),
                    entries: Vec::new(),
                },
            ],
            Vec::new(),
        );

        assert!(report.has_errors());
        assert_eq!(report.invalid_count(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["files"][0]["entries"][0]["missing_fields"][0], "name");

        let broken = ValidationReport::new(Vec::new(), vec!["bad yaml".to_string()]);
        assert!(broken.has_errors());
        assert_eq!(broken.invalid_count(), 0);
    }
}
