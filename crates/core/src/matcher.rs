use std::collections::HashSet;
use std::path::Path;

use crate::model::Role;

/// Normalized mark sets for one scan. Identifiers are trimmed and lowercased
/// once at construction; all later comparisons are exact set lookups.
#[derive(Debug, Clone, Default)]
pub struct MarkSets {
    mainmarks: HashSet<String>,
    parts: HashSet<String>,
}

impl MarkSets {
    pub fn new(mainmarks: &[String], parts: &[String]) -> Self {
        Self {
            mainmarks: normalize(mainmarks),
            parts: normalize(parts),
        }
    }

    pub fn mainmarks(&self) -> &HashSet<String> {
        &self.mainmarks
    }

    pub fn parts(&self) -> &HashSet<String> {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.mainmarks.is_empty() && self.parts.is_empty()
    }

    /// Classify a filename against the expected marks.
    ///
    /// The extension-stripped stem is lowercased and split on runs of `-`,
    /// `_`, or space; each token is tested against the mainmark set first,
    /// then the part set, returning on the first hit. If a caller supplies
    /// overlapping sets, mainmark wins.
    pub fn classify(&self, file_name: &str) -> Option<(Role, String)> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())?
            .to_lowercase();

        for token in stem
            .split(|ch: char| matches!(ch, '-' | '_' | ' '))
            .filter(|token| !token.is_empty())
        {
            if self.mainmarks.contains(token) {
                return Some((Role::Mainmark, token.to_string()));
            }
            if self.parts.contains(token) {
                return Some((Role::Part, token.to_string()));
            }
        }
        None
    }
}

fn normalize(marks: &[String]) -> HashSet<String> {
    marks
        .iter()
        .map(|mark| mark.trim().to_lowercase())
        .filter(|mark| !mark.is_empty())
        .collect()
}
