//! Builds a skill index from remote GitHub registries.
//!
//! Each registry's top-level directories are skill candidates. For each one we
//! fetch `SKILL.md`, read its frontmatter, and produce a [`SkillRecord`].
//! Registries are walked in ascending priority, so when two registries ship a
//! skill with the same name the higher-precedence one is kept.

use crate::category::categorize;
use crate::error::{ManifestError, RegistryError};
use crate::fetch::Fetch;
use crate::manifest::parse_frontmatter;
use crate::record::{RegistrySource, SkillIndex, SkillRecord};
use crate::tokenize::extract_keywords;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level directories that never hold skills
pub const SKIPPED_DIRECTORIES: &[&str] =
    &["docs", "examples", "tests", ".github", "scripts", "assets"];

/// One entry of the GitHub contents API response
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Directory names from a GitHub contents listing
pub fn parse_listing(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<ContentEntry> = serde_json::from_str(body)?;
    Ok(entries
        .into_iter()
        .filter(|e| e.kind == "dir")
        .map(|e| e.name)
        .collect())
}

/// Whether a top-level directory is worth fetching a manifest for
pub fn is_candidate_directory(name: &str) -> bool {
    !name.starts_with('.') && !SKIPPED_DIRECTORIES.contains(&name)
}

/// Turn a fetched manifest into a record for `registry`/`dir`
pub fn record_from_manifest(
    registry: &RegistrySource,
    dir: &str,
    content: &str,
) -> Result<SkillRecord, ManifestError> {
    let frontmatter = parse_frontmatter(content)?;
    let raw_description = frontmatter.description.unwrap_or_default();

    let description = if raw_description.is_empty() {
        format!("Skill from {}", registry.name)
    } else {
        raw_description.clone()
    };

    Ok(SkillRecord {
        category: categorize(&frontmatter.name, &raw_description),
        keywords: extract_keywords(&format!("{} {}", frontmatter.name, raw_description)),
        name: frontmatter.name,
        description,
        source: registry.name.clone(),
        url: registry.tree_url(dir),
        manifest_url: registry.manifest_url(dir),
    })
}

/// Walks registries through a [`Fetch`] implementation
pub struct IndexBuilder<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: Fetch + ?Sized> IndexBuilder<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Build a fresh index from all registries. Failures only drop the
    /// affected registry or skill.
    pub fn build(&self, registries: &[RegistrySource]) -> SkillIndex {
        let mut ordered: Vec<&RegistrySource> = registries.iter().collect();
        ordered.sort_by_key(|r| r.priority);

        let mut index = SkillIndex::new();
        for registry in ordered {
            let added = self.index_registry(registry, &mut index);
            info!(registry = %registry.name, added, "Indexed registry");
        }
        index
    }

    /// Add one registry's skills to `index`, skipping names already present.
    /// Returns how many records were added.
    pub fn index_registry(&self, registry: &RegistrySource, index: &mut SkillIndex) -> usize {
        let directories = match self.list_directories(registry) {
            Ok(dirs) => dirs,
            Err(e) => {
                warn!(registry = %registry.name, error = %e, "Skipping registry");
                return 0;
            }
        };

        let candidates: Vec<String> = directories
            .into_iter()
            .filter(|d| is_candidate_directory(d))
            .collect();
        debug!(registry = %registry.name, candidates = candidates.len(), "Fetching manifests");

        // Fetch in parallel, then merge in listing order so dedup stays deterministic.
        let records: Vec<Option<SkillRecord>> = candidates
            .par_iter()
            .map(|dir| self.fetch_record(registry, dir))
            .collect();

        records
            .into_iter()
            .flatten()
            .map(|record| index.insert_if_absent(record))
            .filter(|&inserted| inserted)
            .count()
    }

    /// Top-level directory names of a registry, dotted names removed
    pub fn list_directories(
        &self,
        registry: &RegistrySource,
    ) -> Result<Vec<String>, RegistryError> {
        let body = self
            .fetcher
            .fetch(&registry.listing_url())
            .map_err(|source| RegistryError::Listing {
                registry: registry.name.clone(),
                source,
            })?;

        let dirs = parse_listing(&body).map_err(|source| RegistryError::InvalidListing {
            registry: registry.name.clone(),
            source,
        })?;

        Ok(dirs.into_iter().filter(|d| !d.starts_with('.')).collect())
    }

    /// Fetch and parse one skill directory's manifest, `None` on any failure
    pub fn fetch_record(&self, registry: &RegistrySource, dir: &str) -> Option<SkillRecord> {
        let url = registry.manifest_url(dir);
        let content = match self.fetcher.fetch(&url) {
            Ok(content) => content,
            Err(e) => {
                warn!(registry = %registry.name, dir, error = %e, "Failed to fetch manifest");
                return None;
            }
        };

        match record_from_manifest(registry, dir, &content) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(registry = %registry.name, dir, error = %e, "Skipping directory");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::fetch::testing::StaticFetcher;

    fn listing(dirs: &[&str]) -> String {
        let entries: Vec<serde_json::Value> = dirs
            .iter()
            .map(|d| serde_json::json!({"name": d, "type": "dir", "path": d}))
            .chain(std::iter::once(
                serde_json::json!({"name": "README.md", "type": "file", "path": "README.md"}),
            ))
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    fn manifest(name: &str, description: &str) -> String {
        format!("---\nname: {}\ndescription: {}\n---\n# {}\n", name, description, name)
    }

    #[test]
    fn test_parse_listing_keeps_directories_only() {
        let dirs = parse_listing(&listing(&["a", "b"])).unwrap();
        assert_eq!(dirs, vec!["a", "b"]);
        assert!(parse_listing("{\"message\": \"rate limited\"}").is_err());
    }

    #[test]
    fn test_candidate_filter() {
        let candidates: Vec<&str> = ["docs", "my-skill", ".github"]
            .into_iter()
            .filter(|d| is_candidate_directory(d))
            .collect();
        assert_eq!(candidates, vec!["my-skill"]);
        assert!(!is_candidate_directory(".hidden"));
        assert!(!is_candidate_directory("assets"));
    }

    #[test]
    fn test_only_candidates_are_fetched() {
        let reg = RegistrySource::github("r", "o", "repo", "main", 1);
        let fetcher = StaticFetcher::new()
            .with(reg.listing_url(), listing(&["docs", "my-skill", ".github"]))
            .with(reg.manifest_url("my-skill"), manifest("my-skill", "Does things"));

        let index = IndexBuilder::new(&fetcher).build(&[reg]);
        assert_eq!(index.len(), 1);
        // one listing + one manifest
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_record_fields() {
        let reg = RegistrySource::github("awesome", "acme", "skills", "master", 1);
        let record = record_from_manifest(
            &reg,
            "invoice-dir",
            &manifest("invoice-organizer", "Organize invoices and receipts"),
        )
        .unwrap();

        assert_eq!(record.name, "invoice-organizer");
        assert_eq!(record.source, "awesome");
        assert_eq!(record.category, Category::Productivity);
        assert_eq!(record.url, "https://github.com/acme/skills/tree/master/invoice-dir");
        assert_eq!(
            record.manifest_url,
            "https://raw.githubusercontent.com/acme/skills/master/invoice-dir/SKILL.md"
        );
        assert_eq!(
            record.keywords,
            vec!["invoice", "organizer", "organize", "invoices", "receipts"]
        );
    }

    #[test]
    fn test_missing_description_defaults_to_registry() {
        let reg = RegistrySource::github("awesome", "acme", "skills", "master", 1);
        let record = record_from_manifest(&reg, "x", "---\nname: raffle\n---\n").unwrap();
        assert_eq!(record.description, "Skill from awesome");
        // the placeholder does not feed categorization or keywords
        assert_eq!(record.category, Category::General);
        assert_eq!(record.keywords, vec!["raffle"]);
    }

    #[test]
    fn test_lower_priority_number_wins() {
        let high = RegistrySource::github("high", "o", "high", "main", 1);
        let low = RegistrySource::github("low", "o", "low", "main", 5);
        let fetcher = StaticFetcher::new()
            .with(high.listing_url(), listing(&["x"]))
            .with(high.manifest_url("x"), manifest("x", "from high"))
            .with(low.listing_url(), listing(&["x", "y"]))
            .with(low.manifest_url("x"), manifest("x", "from low"))
            .with(low.manifest_url("y"), manifest("y", "only low"));

        // passed in the "wrong" order on purpose
        let index = IndexBuilder::new(&fetcher).build(&[low, high]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("x").unwrap().source, "high");
        assert_eq!(index.get("x").unwrap().description, "from high");
        assert_eq!(index.get("y").unwrap().source, "low");
    }

    #[test]
    fn test_failures_are_skipped() {
        let ok = RegistrySource::github("ok", "o", "ok", "main", 2);
        let down = RegistrySource::github("down", "o", "down", "main", 1);
        let fetcher = StaticFetcher::new()
            .with(ok.listing_url(), listing(&["good", "missing", "broken", "nameless"]))
            .with(ok.manifest_url("good"), manifest("good", "works"))
            .with(ok.manifest_url("broken"), "no frontmatter here")
            .with(ok.manifest_url("nameless"), "---\ndescription: hi\n---\n");

        let index = IndexBuilder::new(&fetcher).build(&[down, ok]);
        let names: Vec<&str> = index.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["good"]);
    }

    #[test]
    fn test_invalid_listing_contributes_nothing() {
        let reg = RegistrySource::github("r", "o", "repo", "main", 1);
        let fetcher = StaticFetcher::new().with(reg.listing_url(), "not json");
        let builder = IndexBuilder::new(&fetcher);

        assert!(matches!(
            builder.list_directories(&reg),
            Err(RegistryError::InvalidListing { .. })
        ));
        assert!(builder.build(&[reg]).is_empty());
    }

    #[test]
    fn test_build_order_is_deterministic() {
        let reg = RegistrySource::github("r", "o", "repo", "main", 1);
        let dirs: Vec<String> = (0..20).map(|i| format!("skill-{i:02}")).collect();
        let dir_refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
        let mut fetcher = StaticFetcher::new().with(reg.listing_url(), listing(&dir_refs));
        for d in &dirs {
            fetcher = fetcher.with(reg.manifest_url(d), manifest(d, "parallel"));
        }

        let builder = IndexBuilder::new(&fetcher);
        let first = builder.build(std::slice::from_ref(&reg));
        let second = builder.build(std::slice::from_ref(&reg));
        let names: Vec<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, dir_refs);
        assert_eq!(first, second);
    }
}
