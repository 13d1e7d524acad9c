//! Fixed skill taxonomy and keyword-based categorization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a skill is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DocumentProcessing,
    Development,
    DataAnalysis,
    Creative,
    Communication,
    Productivity,
    Research,
    Security,
    #[default]
    General,
}

/// Categories in match order. The first entry with any keyword contained in
/// the skill text wins, regardless of how many keywords later entries match.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::DocumentProcessing,
        &["docx", "pdf", "pptx", "xlsx", "document", "spreadsheet", "word", "excel"],
    ),
    (
        Category::Development,
        &["code", "git", "debug", "test", "build", "deploy", "api", "mcp", "plugin"],
    ),
    (
        Category::DataAnalysis,
        &["data", "csv", "analyze", "chart", "visualization", "query", "database"],
    ),
    (
        Category::Creative,
        &["design", "image", "art", "canvas", "gif", "video", "theme", "brand"],
    ),
    (
        Category::Communication,
        &["email", "slack", "meeting", "write", "content", "comms"],
    ),
    (
        Category::Productivity,
        &["organize", "file", "invoice", "calendar", "task", "workflow", "automate"],
    ),
    (
        Category::Research,
        &["research", "search", "web", "scrape", "extract"],
    ),
    (
        Category::Security,
        &["security", "forensic", "threat", "vulnerability", "audit"],
    ),
];

impl Category {
    pub const ALL: [Category; 9] = [
        Category::DocumentProcessing,
        Category::Development,
        Category::DataAnalysis,
        Category::Creative,
        Category::Communication,
        Category::Productivity,
        Category::Research,
        Category::Security,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DocumentProcessing => "document-processing",
            Category::Development => "development",
            Category::DataAnalysis => "data-analysis",
            Category::Creative => "creative",
            Category::Communication => "communication",
            Category::Productivity => "productivity",
            Category::Research => "research",
            Category::Security => "security",
            Category::General => "general",
        }
    }

    /// Parse a category name as written in the index ("data-analysis", ...)
    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a category from a skill's name and description by substring containment.
pub fn categorize(name: &str, description: &str) -> Category {
    let text = format!("{} {}", name, description).to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_basic() {
        assert_eq!(
            categorize("invoice-organizer", "Organize invoices and receipts"),
            Category::Productivity
        );
        assert_eq!(
            categorize("threat-hunter", "Find vulnerabilities"),
            Category::Security
        );
    }

    #[test]
    fn test_categorize_declaration_order_beats_match_count() {
        // Three productivity keywords, one document keyword: document wins.
        assert_eq!(
            categorize("file-organizer", "Organize files into a workflow, export pdf"),
            Category::DocumentProcessing
        );
    }

    #[test]
    fn test_categorize_is_substring_based() {
        // "art" hides inside "smart"
        assert_eq!(categorize("smart-helper", ""), Category::Creative);
    }

    #[test]
    fn test_categorize_defaults_to_general() {
        assert_eq!(categorize("raffle-picker", "Pick winners"), Category::General);
        assert_eq!(categorize("", ""), Category::General);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::DocumentProcessing).unwrap();
        assert_eq!(json, "\"document-processing\"");
        let parsed: Category = serde_json::from_str("\"data-analysis\"").unwrap();
        assert_eq!(parsed, Category::DataAnalysis);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Security"), Some(Category::Security));
        assert_eq!(Category::parse("unknown"), None);
    }
}
