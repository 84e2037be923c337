//! Validate command - check the declarative lists before building

use console::style;

use artalk_community_core::{CoreError, EntryKind, RegistryPaths, validate_file};

use crate::display::ValidationReport;
use crate::error::{CliError, Result};

pub fn run(paths: &RegistryPaths, json_output: bool) -> Result<()> {
    if !json_output {
        println!("Validating Artalk Community YAML files...");
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();

    for kind in [EntryKind::Plugin, EntryKind::Theme] {
        let path = paths.list(kind);
        match validate_file(path) {
            Ok(report) => files.push(report),
            Err(e @ (CoreError::Format { .. } | CoreError::YamlParse(_))) => {
                errors.push(e.to_string())
            }
            Err(e) => return Err(e.into()),
        }
    }

    let report = ValidationReport::new(files, errors);

    if json_output {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", json);
    } else {
        report.display();
        println!();
    }

    if report.has_errors() {
        let invalid = report.invalid_count();
        return Err(CliError::validation_with_help(
            format!(
                "{} invalid {} and {} unreadable {}",
                invalid,
                if invalid == 1 { "entry" } else { "entries" },
                report.errors.len(),
                if report.errors.len() == 1 { "file" } else { "files" }
            ),
            "Fix the entries listed above and run `artalk-community validate` again",
        ));
    }

    if !json_output {
        println!("{} Validation passed!", style("✓").green().bold());
    }
    Ok(())
}
