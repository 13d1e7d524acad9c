//! Skill records, registry sources, and the in-memory index they live in.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source name used for skills found on the local filesystem
pub const LOCAL_SOURCE: &str = "local";

/// Priority given to registries added at runtime
pub const CUSTOM_REGISTRY_PRIORITY: i32 = 10;

/// A skill, local or remote, in one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Skill name (unique within one source)
    pub name: String,

    /// Free-text description, may be empty
    #[serde(default)]
    pub description: String,

    /// "local" or the registry name
    #[serde(default)]
    pub source: String,

    /// Repo tree URL or local directory path
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub category: Category,

    /// Up to 15 extracted keywords, first-seen order
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Direct link to the raw SKILL.md, empty for local skills
    #[serde(default, alias = "skill_md_url")]
    pub manifest_url: String,
}

/// Kind of remote registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Github,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Github => "github",
        }
    }
}

/// A remote registry: a GitHub repo whose top-level directories are skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySource {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub url: String,
    /// Lower value wins name conflicts
    pub priority: i32,
}

impl RegistrySource {
    /// A GitHub registry rooted at `https://github.com/{owner}/{repo}`
    pub fn github(name: &str, owner: &str, repo: &str, branch: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind: RegistryKind::Github,
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            url: format!("https://github.com/{}/{}", owner, repo),
            priority,
        }
    }

    fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// GitHub contents API listing for the registry root
    pub fn listing_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents?ref={}",
            self.owner, self.repo, self.branch
        )
    }

    /// Raw SKILL.md URL for one skill directory
    pub fn manifest_url(&self, dir: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}/SKILL.md",
            self.owner, self.repo, self.branch, dir
        )
    }

    /// Browsable tree URL for one skill directory
    pub fn tree_url(&self, dir: &str) -> String {
        format!("{}/tree/{}/{}", self.url, self.branch, dir)
    }
}

/// The curated registries every process starts with
pub fn known_registries() -> Vec<RegistrySource> {
    vec![
        RegistrySource::github(
            "awesome-claude-skills",
            "ComposioHQ",
            "awesome-claude-skills",
            "master",
            1,
        )
        .with_description("ComposioHQ's curated list of awesome Claude Skills"),
        RegistrySource::github("anthropic-skills", "anthropics", "skills", "main", 2)
            .with_description("Official Anthropic skills repository"),
    ]
}

/// Name-keyed skill records that keep insertion order.
///
/// The first record inserted under a name wins; later ones are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillIndex {
    records: Vec<SkillRecord>,
    by_name: HashMap<String, usize>,
}

impl SkillIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a record with the same name exists. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, record: SkillRecord) -> bool {
        if record.name.is_empty() || self.by_name.contains_key(&record.name) {
            return false;
        }
        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, name: &str) -> Option<&SkillRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_name.clear();
    }

    pub fn into_records(self) -> Vec<SkillRecord> {
        self.records
    }
}

impl FromIterator<SkillRecord> for SkillIndex {
    fn from_iter<I: IntoIterator<Item = SkillRecord>>(iter: I) -> Self {
        let mut index = SkillIndex::new();
        for record in iter {
            index.insert_if_absent(record);
        }
        index
    }
}

/// A scored record as returned by a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: SkillRecord,

    /// Relevance in [0, 1], rounded to 3 decimals
    pub score: f64,

    /// Whether the skill is already present locally
    pub installed: bool,
}

impl SearchHit {
    pub fn name(&self) -> &str {
        &self.record.name
    }
}
