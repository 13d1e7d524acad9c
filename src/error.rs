//! Error types for the skill pool.
//!
//! Per-item failures (a manifest that will not fetch, a listing that will not
//! parse) are surfaced as these errors and then turned into "skip this item"
//! by the caller. Only [`SkillPoolError`] ever reaches the binary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest does not start with a `---` line")]
    MissingOpening,

    #[error("manifest frontmatter is not closed by a second `---` line")]
    Unterminated,

    #[error("manifest frontmatter has no `name` field")]
    MissingName,
}

#[derive(Error, Debug)]
pub enum LocalSkillError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to list registry {registry}: {source}")]
    Listing {
        registry: String,
        #[source]
        source: FetchError,
    },

    #[error("registry {registry} returned an invalid listing: {source}")]
    InvalidListing {
        registry: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache at {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write cache at {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse cache: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid cache timestamp {0:?}")]
    Timestamp(String),
}

#[derive(Error, Debug)]
pub enum SkillPoolError {
    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Invalid registry spec {0:?}, expected NAME=OWNER/REPO[@BRANCH]")]
    InvalidRegistry(String),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("HTTP client unavailable: {0}")]
    Fetch(#[from] FetchError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
