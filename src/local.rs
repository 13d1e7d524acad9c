//! Locally installed skills: `<dir>/*/SKILL.md`.

use crate::category::categorize;
use crate::error::LocalSkillError;
use crate::manifest::parse_frontmatter;
use crate::record::{SearchHit, SkillIndex, SkillRecord, LOCAL_SOURCE};
use crate::score::rank;
use crate::tokenize::extract_keywords;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Manifest file every skill directory carries
pub const MANIFEST_FILE: &str = "SKILL.md";

/// What the search engine needs from a source of installed skills
pub trait LocalSkills {
    /// Index every skill directory directly under `dir`. Returns how many were added.
    fn scan(&mut self, dir: &Path) -> usize;

    fn search(&self, query: &str, top_n: usize) -> Vec<SearchHit>;

    fn get(&self, name: &str) -> Option<SkillRecord>;
}

/// [`LocalSkills`] backed by an in-memory index of scanned directories
#[derive(Debug, Default)]
pub struct LocalRegistry {
    skills: SkillIndex,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl LocalSkills for LocalRegistry {
    fn scan(&mut self, dir: &Path) -> usize {
        let Ok(entries) = fs::read_dir(dir) else {
            warn!(dir = %dir.display(), "Cannot read skill directory");
            return 0;
        };

        let mut skill_dirs: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.join(MANIFEST_FILE).is_file())
            .collect();
        skill_dirs.sort();

        let mut added = 0;
        for skill_dir in skill_dirs {
            match load_skill(&skill_dir) {
                Ok(record) => {
                    if self.skills.insert_if_absent(record) {
                        added += 1;
                    }
                }
                Err(e) => warn!(error = %e, "Skipping local skill"),
            }
        }

        debug!(dir = %dir.display(), added, "Scanned local skills");
        added
    }

    fn search(&self, query: &str, top_n: usize) -> Vec<SearchHit> {
        rank(self.skills.iter(), query, top_n, true)
    }

    fn get(&self, name: &str) -> Option<SkillRecord> {
        self.skills.get(name).cloned()
    }
}

/// Read one skill directory into a record
pub fn load_skill(skill_dir: &Path) -> Result<SkillRecord, LocalSkillError> {
    let path = skill_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).map_err(|source| LocalSkillError::Read {
        path: path.clone(),
        source,
    })?;
    let frontmatter =
        parse_frontmatter(&content).map_err(|source| LocalSkillError::Manifest { path, source })?;
    let description = frontmatter.description.unwrap_or_default();

    Ok(SkillRecord {
        category: categorize(&frontmatter.name, &description),
        keywords: extract_keywords(&format!("{} {}", frontmatter.name, description)),
        name: frontmatter.name,
        description,
        source: LOCAL_SOURCE.to_string(),
        url: skill_dir.display().to_string(),
        manifest_url: String::new(),
    })
}

/// Number of `*/SKILL.md` files directly under `dir`, 0 if unreadable
pub fn count_manifests(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().join(MANIFEST_FILE).is_file())
                .count()
        })
        .unwrap_or(0)
}
