//! Entry store reader
//!
//! The declarative lists are YAML sequences of mappings, one mapping per
//! plugin or theme. Items are kept untyped so the validator can report on
//! whatever a maintainer actually wrote.

use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

use crate::entry::LocalEntry;
use crate::error::{CoreError, Result};

/// One item of a declarative list, as written
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry(Value);

impl RawEntry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        self.0.as_mapping()
    }

    /// Fields in declaration order, keys rendered as text
    pub fn fields(&self) -> Vec<(String, &Value)> {
        self.as_mapping()
            .map(|map| map.iter().map(|(k, v)| (scalar_text(k), v)).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_mapping()?.get(field)
    }

    /// Textual form of a field, `None` when absent
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(scalar_text)
    }

    /// The entry's `id`, if it has a non-blank one
    pub fn id(&self) -> Option<String> {
        self.text("id").filter(|id| !id.trim().is_empty())
    }

    /// Convert into a typed entry
    ///
    /// Scalars are read as text first, so `name: 2048` converts the same
    /// way the validator reads it.
    pub fn to_local(&self) -> Result<LocalEntry> {
        let value = match self.as_mapping() {
            Some(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), scalar_as_string(v)))
                    .collect(),
            ),
            None => self.0.clone(),
        };
        serde_yaml::from_value(value).map_err(|e| CoreError::InvalidEntry {
            message: format!("{} ({})", e, self.id().unwrap_or_else(|| "(unknown id)".into())),
        })
    }
}

/// Text form of a YAML value, the way a maintainer would read it
///
/// `null` and empty collections read as empty text so that `id:` with no
/// value counts as blank.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(seq) if seq.is_empty() => String::new(),
        Value::Mapping(map) if map.is_empty() => String::new(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn scalar_as_string(value: &Value) -> Value {
    match value {
        Value::Bool(_) | Value::Number(_) | Value::Tagged(_) => Value::String(scalar_text(value)),
        other => other.clone(),
    }
}

/// 1-based line and column of an item in its source file
///
/// `0:0` means the position could not be determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePos {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A raw entry together with where it starts in the file
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEntry {
    pub entry: RawEntry,
    pub pos: SourcePos,
}

/// Read a declarative list
///
/// A missing file or an empty document yields no entries.
pub fn read_entries(path: &Path) -> Result<Vec<RawEntry>> {
    Ok(read_positioned(path)?
        .into_iter()
        .map(|positioned| positioned.entry)
        .collect())
}

/// Read a declarative list, keeping each item's source position
pub fn read_positioned(path: &Path) -> Result<Vec<PositionedEntry>> {
    if !path.exists() {
        tracing::warn!("Entry list {} does not exist", path.display());
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    parse_positioned(&content).map_err(|e| match e {
        CoreError::YamlParse(e) => CoreError::Format {
            path: path.display().to_string(),
            message: e.to_string(),
        },
        CoreError::Format { message, .. } => CoreError::Format {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Parse list content
pub fn parse_positioned(content: &str) -> Result<Vec<PositionedEntry>> {
    let items = match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Null) => return Ok(Vec::new()),
        Ok(Value::Sequence(items)) => items,
        Ok(_) => {
            return Err(CoreError::Format {
                path: String::new(),
                message: "expected a list of entries".to_string(),
            });
        }
        // An empty or comment-only document
        Err(e) if content.lines().all(is_insignificant) => {
            tracing::debug!("Treating blank document as empty list: {}", e);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let positions = item_positions(content);
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, value)| PositionedEntry {
            entry: RawEntry::new(value),
            pos: positions.get(i).copied().unwrap_or_default(),
        })
        .collect())
}

fn is_insignificant(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed == "---"
        || trimmed == "..."
        || trimmed.starts_with('%')
}

/// Locate the items of the top-level block sequence
///
/// The first significant line fixes the sequence indentation; every `-` at
/// that indentation opens a new item. Positions point at the item content,
/// or at the dash when the content starts on the next line. Flow sequences
/// yield no positions.
fn item_positions(content: &str) -> Vec<SourcePos> {
    let mut positions = Vec::new();
    let mut root_indent = None;

    for (idx, line) in content.lines().enumerate() {
        if is_insignificant(line) {
            continue;
        }

        let indent = line.len() - line.trim_start_matches(' ').len();
        let rest = &line[indent..];
        let is_item = rest == "-" || rest.starts_with("- ");

        match root_indent {
            None if is_item => root_indent = Some(indent),
            None => return positions,
            Some(root) if indent != root || !is_item => continue,
            Some(_) => {}
        }

        let after_dash = &rest[1..];
        let content_offset = after_dash.len() - after_dash.trim_start_matches(' ').len();
        let col = if after_dash.trim().is_empty() || after_dash.trim_start().starts_with('#') {
            indent + 1
        } else {
            indent + 1 + content_offset + 1
        };

        positions.push(SourcePos { line: idx + 1, col });
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGINS: &str = r#"# Community plugins
- id: katex
  name: KaTeX
  npm_package: "@artalk/plugin-katex"

- id: lightbox
  name: Lightbox
  tags:
    - images
-
  id: mermaid
"#;

    #[test]
    fn test_parse_in_file_order() {
        let entries = parse_positioned(PLUGINS).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry.id().as_deref(), Some("katex"));
        assert_eq!(entries[1].entry.id().as_deref(), Some("lightbox"));
        assert_eq!(entries[2].entry.id().as_deref(), Some("mermaid"));
    }

    #[test]
    fn test_item_positions() {
        let entries = parse_positioned(PLUGINS).unwrap();

        assert_eq!(entries[0].pos, SourcePos { line: 2, col: 3 });
        assert_eq!(entries[1].pos, SourcePos { line: 6, col: 3 });
        assert_eq!(entries[2].pos, SourcePos { line: 10, col: 1 });
    }

    #[test]
    fn test_indented_sequence_positions() {
        let entries = parse_positioned("  - id: a\n    name: A\n  -   id: b\n").unwrap();

        assert_eq!(entries[0].pos, SourcePos { line: 1, col: 5 });
        assert_eq!(entries[1].pos, SourcePos { line: 3, col: 7 });
    }

    #[test]
    fn test_flow_sequence_has_unknown_positions() {
        let entries = parse_positioned("[{id: a}, {id: b}]").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].pos, SourcePos::default());
    }

    #[test]
    fn test_empty_documents() {
        assert!(parse_positioned("").unwrap().is_empty());
        assert!(parse_positioned("# nothing yet\n").unwrap().is_empty());
        assert!(parse_positioned("~\n").unwrap().is_empty());
    }

    #[test]
    fn test_non_sequence_is_format_error() {
        let err = parse_positioned("id: katex\n").unwrap_err();
        assert!(matches!(err, CoreError::Format { .. }));
    }

    #[test]
    fn test_unparseable_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.yaml");
        std::fs::write(&path, "- id: [unclosed\n").unwrap();

        let err = read_entries(&path).unwrap_err();
        assert!(matches!(err, CoreError::Format { .. }));
        assert!(err.to_string().contains("plugins.yaml"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_entries(&dir.path().join("themes.yaml")).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::Null), "");
        assert_eq!(scalar_text(&Value::Bool(true)), "true");
        assert_eq!(scalar_text(&serde_yaml::from_str::<Value>("42").unwrap()), "42");
        assert_eq!(scalar_text(&Value::String(" a ".into())), " a ");
        assert_eq!(scalar_text(&Value::Sequence(Vec::new())), "");
    }

    #[test]
    fn test_to_local() {
        let entries = parse_positioned(
            r#"- id: katex
  name: KaTeX
  description: Math
  github_repo: ArtalkJS/plugin-katex
  npm_package: "@artalk/plugin-katex"
  author_name: qwqcode
  author_link: https://github.com/qwqcode
"#,
        )
        .unwrap();

        let local = entries[0].entry.to_local().unwrap();
        assert_eq!(local.npm_package, "@artalk/plugin-katex");
        assert_eq!(local.donate_link, None);

        let partial = RawEntry::new(serde_yaml::from_str("id: broken").unwrap());
        let err = partial.to_local().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_to_local_reads_scalars_as_text() {
        let entries = parse_positioned(
            r#"- id: 2048
  name: 2048
  description: true
  github_repo: someone/game
  npm_package: artalk-plugin-2048
  author_name: someone
  author_link: https://example.com
  donate_link: ~
"#,
        )
        .unwrap();

        let local = entries[0].entry.to_local().unwrap();
        assert_eq!(local.id, "2048");
        assert_eq!(local.name, "2048");
        assert_eq!(local.description, "true");
        assert_eq!(local.donate_link, None);

        let nested = RawEntry::new(serde_yaml::from_str("id: a\nname: [x]").unwrap());
        assert!(nested.to_local().is_err());
    }
}
