use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The two identifier lists an upstream source returns for one job/package.
/// Comparison against filenames is case-insensitive; the discovery engine
/// normalizes these on ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkLists {
    #[serde(default)]
    pub mainmarks: Vec<String>,
    #[serde(default)]
    pub parts: Vec<String>,
}

impl MarkLists {
    pub fn is_empty(&self) -> bool {
        self.mainmarks.is_empty() && self.parts.is_empty()
    }
}

/// Upstream collaborator producing the expected marks for a package. The
/// production source is a pair of relational databases; this crate treats it
/// as an opaque seam.
pub trait MarkSource {
    fn package_contents(&self, job_code: u64, package_code: &str) -> Result<MarkLists>;
}

/// Mark source backed by a JSON document on disk, for driving scans from
/// previously exported package data.
#[derive(Debug, Clone)]
pub struct FileMarkSource {
    path: PathBuf,
}

impl FileMarkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarkSource for FileMarkSource {
    fn package_contents(&self, _job_code: u64, _package_code: &str) -> Result<MarkLists> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read marks file {}", self.path.display()))?;
        let lists: MarkLists = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse marks file {}", self.path.display()))?;
        Ok(lists)
    }
}
