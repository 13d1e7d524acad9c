//! Process configuration: where to look for skills and where to cache.

use crate::error::SkillPoolError;
use crate::record::{known_registries, RegistrySource, CUSTOM_REGISTRY_PRIORITY};
use std::ffi::OsString;
use std::path::PathBuf;

/// Local directories scanned for installed skills
pub const DEFAULT_LOCAL_PATHS: &[&str] = &[
    "/mnt/skills/public",
    "/mnt/skills/user",
    "/mnt/skills/examples",
    "~/.claude/skills",
    ".claude/skills",
];

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "SKILL_POOL_CACHE_DIR";

/// Cache directory under ~/.claude/
const CACHE_DIR: &str = "skill-cache";

const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub local_paths: Vec<PathBuf>,
    /// Consult remote registries at all
    pub include_external: bool,
    /// Fall back to the bundled index before going to the network
    pub use_bundle: bool,
    pub cache_dir: PathBuf,
    pub registries: Vec<RegistrySource>,
}

impl SearchConfig {
    /// Defaults, with the cache directory taken from the environment if set
    pub fn from_env() -> Result<Self, SkillPoolError> {
        Self::with_cache_dir(None)
    }

    /// Defaults with an explicit cache directory, which wins over the
    /// environment. Only a missing home directory with nothing else to go on
    /// is an error.
    pub fn with_cache_dir(cache_dir: Option<PathBuf>) -> Result<Self, SkillPoolError> {
        let cache_dir =
            resolve_cache_dir(cache_dir, std::env::var_os(CACHE_DIR_ENV), dirs::home_dir())?;

        Ok(Self {
            local_paths: DEFAULT_LOCAL_PATHS.iter().map(|p| expand_home(p)).collect(),
            include_external: true,
            use_bundle: true,
            cache_dir,
            registries: known_registries(),
        })
    }
}

/// `~/.claude/skill-cache`
pub fn default_cache_dir() -> Result<PathBuf, SkillPoolError> {
    resolve_cache_dir(None, None, dirs::home_dir())
}

fn resolve_cache_dir(
    explicit: Option<PathBuf>,
    env: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, SkillPoolError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = env.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|home| home.join(".claude").join(CACHE_DIR))
        .ok_or(SkillPoolError::NoHomeDir)
}

/// Expand a leading `~` to the home directory; other paths are returned as-is
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Parse `NAME=OWNER/REPO[@BRANCH]` into a custom registry
pub fn parse_registry_spec(spec: &str) -> Result<RegistrySource, SkillPoolError> {
    let invalid = || SkillPoolError::InvalidRegistry(spec.to_string());

    let (name, location) = spec.split_once('=').ok_or_else(invalid)?;
    let (repo_path, branch) = match location.split_once('@') {
        Some((path, branch)) => (path, branch),
        None => (location, DEFAULT_BRANCH),
    };
    let (owner, repo) = repo_path.split_once('/').ok_or_else(invalid)?;

    let parts = [name.trim(), owner.trim(), repo.trim(), branch.trim()];
    if parts.iter().any(|p| p.is_empty()) || repo.contains('/') {
        return Err(invalid());
    }

    Ok(RegistrySource::github(
        parts[0],
        parts[1],
        parts[2],
        parts[3],
        CUSTOM_REGISTRY_PRIORITY,
    ))
}
