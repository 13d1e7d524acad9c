//! Query tokenization and keyword extraction.
//!
//! Both operate on lowercased ASCII letters only. No stemming.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Maximum number of keywords kept per skill
pub const MAX_KEYWORDS: usize = 15;

/// Words that never become keywords
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
    "does", "did", "will", "would", "to", "of", "in", "for", "on", "with", "at", "by", "from",
    "and", "but", "if", "or", "this", "that", "use", "using", "claude", "skill", "skills", "can",
    "your", "you",
];

lazy_static! {
    static ref RE_QUERY_TOKEN: Regex = Regex::new(r"\b[a-z]{2,}\b").unwrap();
    static ref RE_KEYWORD: Regex = Regex::new(r"\b[a-z]{3,}\b").unwrap();
}

/// Deduplicated tokens that remember the order they first appeared in.
///
/// Scoring only needs set membership, but the exact-name check joins the
/// tokens back into a phrase, and that phrase has to be stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl TokenSet {
    fn push(&mut self, token: &str) {
        if self.members.insert(token.to_string()) {
            self.ordered.push(token.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Number of tokens present in both sets
    pub fn overlap(&self, other: &TokenSet) -> usize {
        self.iter().filter(|t| other.contains(t)).count()
    }

    /// Number of tokens present in `words`
    pub fn overlap_with<'a>(&self, words: impl IntoIterator<Item = &'a String>) -> usize {
        let words: HashSet<&str> = words.into_iter().map(String::as_str).collect();
        self.iter().filter(|t| words.contains(t)).count()
    }

    /// Space-joined tokens in first-seen order
    pub fn joined(&self) -> String {
        self.ordered.join(" ")
    }
}

/// Lowercase alphabetic tokens of length >= 2, for queries and scoring.
pub fn tokenize(text: &str) -> TokenSet {
    let lower = text.to_lowercase();
    let mut tokens = TokenSet::default();
    for m in RE_QUERY_TOKEN.find_iter(&lower) {
        tokens.push(m.as_str());
    }
    tokens
}

/// Up to [`MAX_KEYWORDS`] indexing keywords (length >= 3, no stopwords), first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for m in RE_KEYWORD.find_iter(&lower) {
        let word = m.as_str();
        if STOPWORDS.contains(&word) || !seen.insert(word) {
            continue;
        }
        keywords.push(word.to_string());
        if keywords.len() >= MAX_KEYWORDS {
            break;
        }
    }

    keywords
}
