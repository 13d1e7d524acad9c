//! Unified search over installed skills and remote registries.
//!
//! Local skills always win: `get` returns an installed skill over a remote
//! one of the same name, and installed skills never carry an install command.

use crate::cache::CacheStore;
use crate::config::SearchConfig;
use crate::error::FetchError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::local::{count_manifests, LocalRegistry, LocalSkills};
use crate::record::{SearchHit, SkillRecord, LOCAL_SOURCE};
use crate::remote::RemoteIndex;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Results per source when the caller does not say
pub const DEFAULT_TOP_N: usize = 10;

/// Results per source considered for a recommendation
const RECOMMEND_POOL: usize = 5;

/// Runners-up listed next to a recommendation
const MAX_ALTERNATIVES: usize = 3;

/// Ranked hits per source for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub local: Vec<SearchHit>,
    pub external: Vec<SearchHit>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.local.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A skill looked up by exact name, with where it lives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSkill {
    #[serde(flatten)]
    pub record: SkillRecord,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
}

/// The picked skill of a positive recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedSkill {
    pub skill: String,
    pub installed: bool,
    pub source: String,
    pub url: String,
    pub description: String,
    pub alternatives: Vec<String>,
    pub install_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recommended: bool,
    /// Score of the pick, 0 when nothing matched
    pub confidence: f64,
    #[serde(flatten)]
    pub pick: Option<RecommendedSkill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Recommendation {
    fn none(query: &str) -> Self {
        Self {
            recommended: false,
            confidence: 0.0,
            pick: None,
            message: Some(format!("No skills found matching '{}'", query)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalPathInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub skill_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryInfo {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Everything the engine would search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sources {
    pub local_paths: Vec<LocalPathInfo>,
    pub external_registries: Vec<RegistryInfo>,
}

/// Shell command that installs a remote skill into `~/.claude/skills/<name>/`
pub fn install_command(record: &SkillRecord) -> String {
    if record.manifest_url.is_empty() {
        format!("# Visit: {}", record.url)
    } else {
        format!(
            "curl -sL {} -o ~/.claude/skills/{}/SKILL.md --create-dirs",
            record.manifest_url, record.name
        )
    }
}

/// Search engine over one local source and an optional remote index.
///
/// Both sides load lazily on first use and stay loaded for the lifetime of
/// the engine.
pub struct UnifiedSearch<L: LocalSkills, F: Fetch> {
    local: L,
    local_paths: Vec<PathBuf>,
    local_scanned: bool,
    remote: Option<RemoteIndex<F>>,
}

impl UnifiedSearch<LocalRegistry, HttpFetcher> {
    /// Engine wired to the filesystem and the real registries
    pub fn from_config(config: SearchConfig) -> Result<Self, FetchError> {
        let remote = if config.include_external {
            let cache = CacheStore::new(config.cache_dir);
            let mut remote =
                RemoteIndex::new(HttpFetcher::new()?, cache).with_registries(config.registries);
            if !config.use_bundle {
                remote = remote.without_bundle();
            }
            Some(remote)
        } else {
            None
        };
        Ok(Self::new(LocalRegistry::new(), config.local_paths, remote))
    }
}

impl<L: LocalSkills, F: Fetch> UnifiedSearch<L, F> {
    pub fn new(local: L, local_paths: Vec<PathBuf>, remote: Option<RemoteIndex<F>>) -> Self {
        Self {
            local,
            local_paths,
            local_scanned: false,
            remote,
        }
    }

    pub fn remote(&self) -> Option<&RemoteIndex<F>> {
        self.remote.as_ref()
    }

    pub fn remote_mut(&mut self) -> Option<&mut RemoteIndex<F>> {
        self.remote.as_mut()
    }

    fn ensure_local_scanned(&mut self) {
        if self.local_scanned {
            return;
        }
        for path in &self.local_paths {
            if path.exists() {
                self.local.scan(path);
            } else {
                debug!(path = %path.display(), "Local skill path does not exist");
            }
        }
        self.local_scanned = true;
    }

    /// Search each enabled source independently, at most `top_n` hits each
    pub fn search(
        &mut self,
        query: &str,
        top_n: usize,
        local_only: bool,
        external_only: bool,
    ) -> SearchResults {
        let mut results = SearchResults {
            query: query.to_string(),
            local: Vec::new(),
            external: Vec::new(),
        };

        if !external_only {
            self.ensure_local_scanned();
            results.local = self
                .local
                .search(query, top_n)
                .into_iter()
                .map(|mut hit| {
                    hit.record.source = LOCAL_SOURCE.to_string();
                    hit.installed = true;
                    hit
                })
                .collect();
        }

        if !local_only {
            if let Some(remote) = self.remote.as_mut() {
                results.external = remote
                    .search(query, top_n)
                    .into_iter()
                    .map(|mut hit| {
                        hit.installed = false;
                        hit
                    })
                    .collect();
            }
        }

        debug!(
            query,
            local = results.local.len(),
            external = results.external.len(),
            "Search complete"
        );
        results
    }

    /// Exact-name lookup, local first
    pub fn get(&mut self, name: &str) -> Option<ResolvedSkill> {
        self.ensure_local_scanned();
        if let Some(mut record) = self.local.get(name) {
            record.source = LOCAL_SOURCE.to_string();
            return Some(ResolvedSkill {
                record,
                installed: true,
                install_command: None,
            });
        }

        let record = self.remote.as_mut()?.get(name)?;
        Some(ResolvedSkill {
            install_command: Some(install_command(&record)),
            record,
            installed: false,
        })
    }

    /// Best single skill for a task description, with runners-up
    pub fn recommend(&mut self, query: &str) -> Recommendation {
        let results = self.search(query, RECOMMEND_POOL, false, false);

        let mut pool: Vec<SearchHit> = results.local;
        pool.extend(results.external);
        pool.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut ranked = pool.into_iter();
        let Some(best) = ranked.next() else {
            return Recommendation::none(query);
        };

        // An installed skill can also be in a registry; never offer it as its own alternative.
        let alternatives = ranked
            .map(|hit| hit.record.name)
            .filter(|name| *name != best.record.name)
            .take(MAX_ALTERNATIVES)
            .collect();
        let install = (!best.installed).then(|| install_command(&best.record));

        Recommendation {
            recommended: true,
            confidence: best.score,
            pick: Some(RecommendedSkill {
                skill: best.record.name,
                installed: best.installed,
                source: best.record.source,
                url: best.record.url,
                description: best.record.description,
                alternatives,
                install_command: install,
            }),
            message: None,
        }
    }

    /// Local paths with their skill counts, and the configured registries
    pub fn list_sources(&self) -> Sources {
        let local_paths = self
            .local_paths
            .iter()
            .map(|path| {
                let exists = path.exists();
                LocalPathInfo {
                    path: path.clone(),
                    exists,
                    skill_count: if exists { count_manifests(path) } else { 0 },
                }
            })
            .collect();

        let external_registries = self
            .remote
            .as_ref()
            .map(|remote| {
                remote
                    .registries()
                    .iter()
                    .map(|r| RegistryInfo {
                        name: r.name.clone(),
                        url: r.url.clone(),
                        kind: r.kind.as_str().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Sources {
            local_paths,
            external_registries,
        }
    }

    /// Force a network rebuild of the remote index. 0 when remote is disabled.
    pub fn refresh_external(&mut self) -> usize {
        self.remote.as_mut().map_or(0, |remote| remote.refresh())
    }
}
