//! On-disk cache of the remote skill index, plus the bundled offline index.
//!
//! # Cache file
//! `{cache_dir}/external_index.json`:
//! `{"version": "1.0", "updated": "<RFC 3339, Z>", "skill_count": N, "skills": [...]}`
//!
//! A cache older than [`FRESHNESS_WINDOW_SECS`] is ignored. An unreadable or
//! corrupt cache is treated exactly like a missing one.

use crate::error::CacheError;
use crate::record::{SkillIndex, SkillRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Cache envelope format version
pub const CACHE_VERSION: &str = "1.0";

/// Cache file name inside the cache directory
pub const CACHE_FILE: &str = "external_index.json";

/// Optional on-disk replacement for the embedded bundle
pub const BUNDLED_INDEX_FILE: &str = "awesome_claude_skills_index.json";

/// How long a written cache stays usable (24 hours)
pub const FRESHNESS_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Source assigned to bundled records that do not name one
pub const BUNDLED_SOURCE: &str = "awesome-claude-skills";

/// Index snapshot shipped with the binary for offline use
const BUNDLED_INDEX: &str = include_str!("../assets/bundled_index.json");

/// What gets written to and read from the cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub version: String,
    pub updated: String,
    #[serde(default)]
    pub skill_count: usize,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
}

impl CacheEnvelope {
    pub fn new(index: &SkillIndex, now: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            skill_count: index.len(),
            skills: index.iter().cloned().collect(),
        }
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>, CacheError> {
        DateTime::parse_from_rfc3339(&self.updated)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| CacheError::Timestamp(self.updated.clone()))
    }

    /// Whether the envelope was written less than a freshness window before `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.updated_at() {
            Ok(updated) => now.signed_duration_since(updated).num_seconds() < FRESHNESS_WINDOW_SECS,
            Err(_) => false,
        }
    }
}

/// Bundles are either a bare record list or something with a `skills` list
#[derive(Deserialize)]
#[serde(untagged)]
enum BundleShape {
    Envelope { skills: Vec<SkillRecord> },
    List(Vec<SkillRecord>),
}

/// Parse a bundled index document into an index
pub fn parse_bundle(content: &str) -> Result<SkillIndex, CacheError> {
    let records = match serde_json::from_str::<BundleShape>(content)? {
        BundleShape::Envelope { skills } => skills,
        BundleShape::List(skills) => skills,
    };

    Ok(records
        .into_iter()
        .map(|mut record| {
            if record.source.is_empty() {
                record.source = BUNDLED_SOURCE.to_string();
            }
            record
        })
        .collect())
}

/// Reads and writes the cache file in one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    pub fn bundled_path(&self) -> PathBuf {
        self.dir.join(BUNDLED_INDEX_FILE)
    }

    /// Read the raw envelope, `None` if no cache file exists
    pub fn read(&self) -> Result<Option<CacheEnvelope>, CacheError> {
        let path = self.cache_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| CacheError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Load the cached index as of `now`. Returns an empty index and `false`
    /// unless a fresh, readable cache exists.
    pub fn load_at(&self, now: DateTime<Utc>) -> (SkillIndex, bool) {
        match self.read() {
            Ok(Some(envelope)) if envelope.is_fresh(now) => {
                debug!(
                    updated = %envelope.updated,
                    skills = envelope.skills.len(),
                    "Using cached skill index"
                );
                (envelope.skills.into_iter().collect(), true)
            }
            Ok(Some(envelope)) => {
                debug!(updated = %envelope.updated, "Cached skill index is stale");
                (SkillIndex::new(), false)
            }
            Ok(None) => (SkillIndex::new(), false),
            Err(e) => {
                warn!(path = %self.cache_path().display(), error = %e, "Ignoring unreadable cache");
                (SkillIndex::new(), false)
            }
        }
    }

    pub fn load(&self) -> (SkillIndex, bool) {
        self.load_at(Utc::now())
    }

    /// Overwrite the cache file with `index`, stamped `now`
    pub fn save_at(&self, index: &SkillIndex, now: DateTime<Utc>) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            path: self.cache_path(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let encoded = serde_json::to_string_pretty(&CacheEnvelope::new(index, now))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(encoded.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(self.cache_path())
            .map_err(|e| write_err(e.error))?;

        debug!(path = %self.cache_path().display(), skills = index.len(), "Saved skill index cache");
        Ok(())
    }

    pub fn save(&self, index: &SkillIndex) -> Result<(), CacheError> {
        self.save_at(index, Utc::now())
    }

    /// Load the offline index: an on-disk bundle in the cache dir if valid,
    /// else the one embedded in the binary. `None` if neither has records.
    pub fn load_bundled(&self) -> Option<SkillIndex> {
        self.load_bundle_file().or_else(load_embedded_bundle)
    }

    /// The on-disk bundle in the cache dir, `None` if absent, empty or invalid
    pub fn load_bundle_file(&self) -> Option<SkillIndex> {
        let path = self.bundled_path();
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path)
            .map_err(|source| CacheError::Read {
                path: path.clone(),
                source,
            })
            .and_then(|content| parse_bundle(&content))
        {
            Ok(index) if !index.is_empty() => Some(index),
            Ok(_) => {
                debug!(path = %path.display(), "Bundled index file is empty");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load bundled index");
                None
            }
        }
    }
}

/// The index compiled into the binary
fn load_embedded_bundle() -> Option<SkillIndex> {
    match parse_bundle(BUNDLED_INDEX) {
        Ok(index) if !index.is_empty() => Some(index),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Embedded bundled index is invalid");
            None
        }
    }
}
