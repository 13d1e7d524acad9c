//! The remote skill index: lazily loaded once per process from a fresh cache,
//! a bundle file in the cache dir, or the registries, in that order. The
//! embedded bundle only stands in when a rebuild comes back empty.

use crate::cache::CacheStore;
use crate::category::Category;
use crate::fetch::Fetch;
use crate::record::{known_registries, RegistrySource, SearchHit, SkillIndex, SkillRecord};
use crate::registry::IndexBuilder;
use crate::score::rank;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where the in-memory index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    Unloaded,
    LoadedFromCache,
    LoadedFromBundle,
    LoadedFromNetwork,
}

pub struct RemoteIndex<F: Fetch> {
    fetcher: F,
    cache: CacheStore,
    registries: Vec<RegistrySource>,
    use_bundle: bool,
    skills: SkillIndex,
    state: LoadState,
}

impl<F: Fetch> RemoteIndex<F> {
    /// A remote index over the built-in registries
    pub fn new(fetcher: F, cache: CacheStore) -> Self {
        Self {
            fetcher,
            cache,
            registries: known_registries(),
            use_bundle: true,
            skills: SkillIndex::new(),
            state: LoadState::Unloaded,
        }
    }

    pub fn with_registries(mut self, registries: Vec<RegistrySource>) -> Self {
        self.registries = registries;
        self
    }

    /// Never fall back to the bundled index; an empty rebuild stays empty
    pub fn without_bundle(mut self) -> Self {
        self.use_bundle = false;
        self
    }

    pub fn registries(&self) -> &[RegistrySource] {
        &self.registries
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Append a custom GitHub registry. Takes effect on the next network build.
    pub fn add_registry(
        &mut self,
        name: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        priority: i32,
    ) {
        self.registries
            .push(RegistrySource::github(name, owner, repo, branch, priority));
    }

    pub fn add_registry_source(&mut self, registry: RegistrySource) {
        self.registries.push(registry);
    }

    /// Load the index if this is the first use. Returns the record count.
    pub fn ensure_loaded(&mut self) -> usize {
        if self.state == LoadState::Unloaded {
            self.load(false);
        }
        self.skills.len()
    }

    fn load(&mut self, force_refresh: bool) -> usize {
        if !force_refresh {
            let (cached, fresh) = self.cache.load();
            if fresh {
                self.skills = cached;
                self.state = LoadState::LoadedFromCache;
                return self.skills.len();
            }

            // A bundle placed next to the cache pins the index offline.
            if self.use_bundle {
                if let Some(bundled) = self.cache.load_bundle_file() {
                    debug!(skills = bundled.len(), "Using bundled skill index file");
                    self.skills = bundled;
                    self.state = LoadState::LoadedFromBundle;
                    return self.skills.len();
                }
            }
            debug!("No fresh cache, rebuilding from registries");
        }

        let built = IndexBuilder::new(&self.fetcher).build(&self.registries);
        if !built.is_empty() {
            if let Err(e) = self.cache.save(&built) {
                warn!(error = %e, "Failed to persist skill index cache");
            }
            info!(skills = built.len(), "Built skill index from registries");
            self.skills = built;
            self.state = LoadState::LoadedFromNetwork;
            return self.skills.len();
        }

        // Nothing reachable: keep offline search working.
        if self.use_bundle {
            if let Some(bundled) = self.cache.load_bundled() {
                warn!("No skills fetched from registries, falling back to bundled index");
                self.skills = bundled;
                self.state = LoadState::LoadedFromBundle;
                return self.skills.len();
            }
        }

        warn!("No skills available from any registry");
        self.skills = built;
        self.state = LoadState::LoadedFromNetwork;
        0
    }

    /// Drop everything in memory and rebuild from the registries.
    pub fn refresh(&mut self) -> usize {
        self.skills.clear();
        self.state = LoadState::Unloaded;
        self.load(true)
    }

    pub fn search(&mut self, query: &str, top_n: usize) -> Vec<SearchHit> {
        self.ensure_loaded();
        rank(self.skills.iter(), query, top_n, false)
    }

    pub fn get(&mut self, name: &str) -> Option<SkillRecord> {
        self.ensure_loaded();
        self.skills.get(name).cloned()
    }

    /// All records, optionally filtered, sorted by name
    pub fn list_skills(
        &mut self,
        source: Option<&str>,
        category: Option<Category>,
    ) -> Vec<SkillRecord> {
        self.ensure_loaded();
        let mut skills: Vec<SkillRecord> = self
            .skills
            .iter()
            .filter(|s| source.map_or(true, |src| s.source == src))
            .filter(|s| category.map_or(true, |c| s.category == c))
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use chrono::{Duration, Utc};
    use std::fs;

    fn registry() -> RegistrySource {
        RegistrySource::github("test-registry", "acme", "skills", "main", 1)
    }

    fn online_fetcher() -> StaticFetcher {
        let reg = registry();
        StaticFetcher::new()
            .with(
                reg.listing_url(),
                r#"[{"name": "invoice-organizer", "type": "dir"}, {"name": "docs", "type": "dir"}]"#,
            )
            .with(
                reg.manifest_url("invoice-organizer"),
                "---\nname: invoice-organizer\ndescription: Organize invoices and receipts\n---\n",
            )
    }

    fn remote(dir: &std::path::Path, fetcher: StaticFetcher) -> RemoteIndex<StaticFetcher> {
        RemoteIndex::new(fetcher, CacheStore::new(dir)).with_registries(vec![registry()])
    }

    #[test]
    fn test_loads_from_network_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), online_fetcher()).without_bundle();

        assert_eq!(index.state(), LoadState::Unloaded);
        assert_eq!(index.ensure_loaded(), 1);
        assert_eq!(index.state(), LoadState::LoadedFromNetwork);

        let (cached, fresh) = CacheStore::new(dir.path()).load();
        assert!(fresh);
        assert!(cached.contains("invoice-organizer"));
    }

    #[test]
    fn test_load_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), online_fetcher()).without_bundle();
        index.ensure_loaded();
        let calls = index.fetcher.calls();
        index.search("invoice", 10);
        index.get("invoice-organizer");
        assert_eq!(index.fetcher.calls(), calls);
    }

    #[test]
    fn test_fresh_cache_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let seeded: SkillIndex = crate::cache::parse_bundle(r#"[{"name": "cached-skill"}]"#).unwrap();
        store.save(&seeded).unwrap();

        let mut index = remote(dir.path(), online_fetcher());
        index.ensure_loaded();
        assert_eq!(index.state(), LoadState::LoadedFromCache);
        assert_eq!(index.fetcher.calls(), 0);
        assert!(index.get("cached-skill").is_some());
    }

    #[test]
    fn test_stale_cache_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let seeded: SkillIndex = crate::cache::parse_bundle(r#"[{"name": "old-skill"}]"#).unwrap();
        store.save_at(&seeded, Utc::now() - Duration::hours(48)).unwrap();

        let mut index = remote(dir.path(), online_fetcher()).without_bundle();
        index.ensure_loaded();
        assert_eq!(index.state(), LoadState::LoadedFromNetwork);
        assert!(index.fetcher.calls() > 0);
        assert!(index.get("old-skill").is_none());
        assert!(index.get("invoice-organizer").is_some());
    }

    #[test]
    fn test_stale_cache_rebuilds_before_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let seeded: SkillIndex = crate::cache::parse_bundle(r#"[{"name": "old-skill"}]"#).unwrap();
        store.save_at(&seeded, Utc::now() - Duration::hours(48)).unwrap();

        let mut index = remote(dir.path(), online_fetcher());
        index.ensure_loaded();
        assert_eq!(index.state(), LoadState::LoadedFromNetwork);
        assert!(index.fetcher.calls() > 0);
        assert!(index.get("invoice-organizer").is_some());
        assert!(index.get("old-skill").is_none());

        let (cached, fresh) = store.load();
        assert!(fresh);
        assert!(cached.contains("invoice-organizer"));
    }

    #[test]
    fn test_bundle_file_in_cache_dir_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        fs::write(store.bundled_path(), r#"[{"name": "pinned-skill"}]"#).unwrap();

        let mut index = remote(dir.path(), online_fetcher());
        assert_eq!(index.ensure_loaded(), 1);
        assert_eq!(index.state(), LoadState::LoadedFromBundle);
        assert_eq!(index.fetcher.calls(), 0);
        assert!(index.get("pinned-skill").is_some());
    }

    #[test]
    fn test_missing_cache_offline_uses_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), StaticFetcher::new());
        assert!(index.ensure_loaded() > 0);
        assert_eq!(index.state(), LoadState::LoadedFromBundle);
        assert!(index.fetcher.calls() > 0);
        assert!(!CacheStore::new(dir.path()).cache_path().exists());
    }

    #[test]
    fn test_corrupt_cache_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(crate::cache::CACHE_FILE), "][").unwrap();

        let mut index = remote(dir.path(), online_fetcher()).without_bundle();
        assert_eq!(index.ensure_loaded(), 1);
        assert_eq!(index.state(), LoadState::LoadedFromNetwork);
    }

    #[test]
    fn test_refresh_ignores_fresh_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let seeded: SkillIndex = crate::cache::parse_bundle(r#"[{"name": "cached-skill"}]"#).unwrap();
        store.save(&seeded).unwrap();

        let mut index = remote(dir.path(), online_fetcher());
        index.ensure_loaded();
        assert_eq!(index.refresh(), 1);
        assert_eq!(index.state(), LoadState::LoadedFromNetwork);
        assert!(index.get("cached-skill").is_none());

        let (cached, _) = store.load();
        assert!(cached.contains("invoice-organizer"));
        assert!(!cached.contains("cached-skill"));
    }

    #[test]
    fn test_offline_refresh_falls_back_to_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), StaticFetcher::new());
        assert!(index.refresh() > 0);
        assert_eq!(index.state(), LoadState::LoadedFromBundle);
        assert!(!CacheStore::new(dir.path()).cache_path().exists());
    }

    #[test]
    fn test_offline_without_bundle_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), StaticFetcher::new()).without_bundle();
        assert_eq!(index.ensure_loaded(), 0);
        assert!(index.search("anything at all", 10).is_empty());
        assert!(!CacheStore::new(dir.path()).cache_path().exists());
    }

    #[test]
    fn test_add_registry_extends_build() {
        let dir = tempfile::tempdir().unwrap();
        let extra = RegistrySource::github("extra", "someone", "more-skills", "master", 10);
        let fetcher = online_fetcher()
            .with(extra.listing_url(), r#"[{"name": "pdf", "type": "dir"}]"#)
            .with(extra.manifest_url("pdf"), "---\nname: pdf\ndescription: PDF tools\n---\n");

        let mut index = remote(dir.path(), fetcher).without_bundle();
        index.add_registry("extra", "someone", "more-skills", "master", 10);
        assert_eq!(index.registries().len(), 2);
        assert_eq!(index.ensure_loaded(), 2);
        assert_eq!(index.get("pdf").unwrap().source, "extra");
    }

    #[test]
    fn test_list_skills_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), StaticFetcher::new());
        index.ensure_loaded();

        let all = index.list_skills(None, None);
        assert!(all.windows(2).all(|w| w[0].name <= w[1].name));

        let productivity =
            index.list_skills(Some("awesome-claude-skills"), Some(Category::Productivity));
        assert!(!productivity.is_empty());
        assert!(productivity.iter().all(|s| s.category == Category::Productivity));
        assert!(index.list_skills(Some("nobody"), None).is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = remote(dir.path(), StaticFetcher::new());
        let first = index.search("organize files", 10);
        let second = index.search("organize files", 10);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
