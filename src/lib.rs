//! Skill Pool - find and rank skills across local directories and remote registries
//!
//! Local skills come from `<dir>/*/SKILL.md`. Remote skills come from GitHub
//! repositories whose top-level directories each carry a `SKILL.md`; their
//! metadata is cached on disk for 24 hours, with a bundled index for offline use.
//!
//! # Queries
//! - free-text search, ranked per source
//! - exact lookup by name (local first)
//! - a single recommendation for a task, with alternatives and an install command
//!
//! # Scoring
//! Name, description and keyword overlap with the query, weighted 1.0 / 0.7 / 0.5
//! and normalized into [0, 1]. An exact name match forces the name component to 1.

pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod fetch;
pub mod local;
pub mod manifest;
pub mod record;
pub mod registry;
pub mod remote;
pub mod score;
pub mod search;
pub mod tokenize;

pub use cache::{CacheEnvelope, CacheStore};
pub use category::{categorize, Category};
pub use config::SearchConfig;
pub use error::{CacheError, FetchError, ManifestError, SkillPoolError};
pub use fetch::{Fetch, HttpFetcher};
pub use local::{LocalRegistry, LocalSkills};
pub use record::{RegistrySource, SearchHit, SkillIndex, SkillRecord};
pub use registry::IndexBuilder;
pub use remote::{LoadState, RemoteIndex};
pub use score::score;
pub use search::{Recommendation, SearchResults, UnifiedSearch};
pub use tokenize::{extract_keywords, tokenize};
