//! Relevance scoring between a query and a skill record.

use crate::record::{SearchHit, SkillRecord};
use crate::tokenize::{tokenize, TokenSet};

/// Minimum score a skill needs to show up in search results
pub const SCORE_THRESHOLD: f64 = 0.1;

const NAME_WEIGHT: f64 = 1.0;
const DESCRIPTION_WEIGHT: f64 = 0.7;
const KEYWORD_WEIGHT: f64 = 0.5;

/// Sum of the weights, maps the weighted total into [0, 1]
const NORMALIZER: f64 = 2.2;

/// Per-signal components of a score, before weighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub name: f64,
    pub description: f64,
    pub keywords: f64,
    pub total: f64,
}

/// Score `record` against already-tokenized query text, in [0, 1].
pub fn score(query: &TokenSet, record: &SkillRecord) -> f64 {
    breakdown(query, record).total
}

pub fn breakdown(query: &TokenSet, record: &SkillRecord) -> ScoreBreakdown {
    let normalized_name = record.name.to_lowercase().replace('-', " ");
    let name_tokens = tokenize(&normalized_name);
    let desc_tokens = tokenize(&record.description);

    let query_len = query.len().max(1) as f64;

    let mut name = query.overlap(&name_tokens) as f64 / name_tokens.len().max(1) as f64;
    let description = query.overlap(&desc_tokens) as f64 / query_len;
    let keywords = query.overlap_with(&record.keywords) as f64 / query_len;

    if !query.is_empty() && !normalized_name.is_empty() {
        let joined = query.joined();
        if joined == normalized_name || joined.contains(&normalized_name) {
            name = 1.0;
        }
    }

    let weighted =
        name * NAME_WEIGHT + description * DESCRIPTION_WEIGHT + keywords * KEYWORD_WEIGHT;

    ScoreBreakdown {
        name,
        description,
        keywords,
        total: (weighted / NORMALIZER).min(1.0),
    }
}

/// Round a score to 3 decimals for display and ranking
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Score every record against `query`, keep those at or above
/// [`SCORE_THRESHOLD`], best first, at most `top_n`.
///
/// Ties keep the order of `records`.
pub fn rank<'a>(
    records: impl IntoIterator<Item = &'a SkillRecord>,
    query: &str,
    top_n: usize,
    installed: bool,
) -> Vec<SearchHit> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = records
        .into_iter()
        .filter_map(|record| {
            let s = score(&tokens, record);
            (s >= SCORE_THRESHOLD).then(|| SearchHit {
                record: record.clone(),
                score: round_score(s),
                installed,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(top_n);
    hits
}
