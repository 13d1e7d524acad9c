//! SKILL.md frontmatter parsing.
//!
//! A manifest starts with a line that is exactly `---`, then `key: value`
//! lines, then a closing `---` line. Only `name` and `description` are read.

use crate::error::ManifestError;

/// The fields we read out of a manifest's frontmatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub name: String,
    pub description: Option<String>,
}

const DELIMITER: &str = "---";

/// Parse the leading frontmatter block of a SKILL.md document.
pub fn parse_frontmatter(content: &str) -> Result<Frontmatter, ManifestError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {}
        _ => return Err(ManifestError::MissingOpening),
    }

    let mut name = None;
    let mut description = None;
    let mut closed = false;

    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim().to_lowercase().as_str() {
            "name" => name = Some(value),
            "description" => description = Some(value),
            _ => {}
        }
    }

    if !closed {
        return Err(ManifestError::Unterminated);
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or(ManifestError::MissingName)?;

    Ok(Frontmatter {
        name,
        description: description.filter(|d| !d.is_empty()),
    })
}

/// Strip surrounding double quotes, then single quotes
fn unquote(value: &str) -> String {
    value.trim_matches('"').trim_matches('\'').to_string()
}
