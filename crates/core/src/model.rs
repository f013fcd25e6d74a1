use serde::{Deserialize, Serialize};

pub const REPORT_VERSION: &str = "1.0.0";

/// Classification report produced by one discovery run.
///
/// Every bucket field is always present (possibly empty), and every path list
/// is sorted so two scans over an unchanged filesystem serialize identically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub report_version: String,
    pub generated_at: String,
    #[serde(default = "default_scan_id")]
    pub scan_id: String,
    pub scan: ScanMetadata,
    #[serde(default)]
    pub scan_metrics: ScanMetrics,
    pub nc: RoleSplit,
    pub dxf: RoleSplit,
    pub enc: Vec<String>,
    pub pdf: RoleSplit,
    pub misses: Misses,
    #[serde(default)]
    pub failures: Vec<TraversalFailure>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn default_scan_id() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanMetadata {
    pub job_code: u64,
    pub nc_root: String,
    pub drawing_root: String,
    pub mainmarks: Vec<String>,
    pub parts: Vec<String>,
    #[serde(default)]
    pub job_folder_match: JobFolderMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanMetrics {
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(default)]
    pub scanned_files: u64,
    #[serde(default)]
    pub scanned_directories: u64,
    #[serde(default)]
    pub matched_files: u64,
}

/// How top-level job folders are matched against the job code.
///
/// `Prefix` reproduces the legacy behavior (job `12` also matches folders
/// `120` and `1234`). `Delimited` requires the job code to be followed by a
/// non-digit separator or the end of the name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobFolderMatch {
    #[default]
    Prefix,
    Delimited,
}

/// Assembly-level vs piece-level classification of a matched file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mainmark,
    Part,
}

/// Per-role lists, used both for matched file paths and for missed marks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RoleSplit {
    pub mainmark: Vec<String>,
    pub part: Vec<String>,
}

impl RoleSplit {
    pub fn get(&self, role: Role) -> &[String] {
        match role {
            Role::Mainmark => &self.mainmark,
            Role::Part => &self.part,
        }
    }

    pub fn len(&self) -> usize {
        self.mainmark.len() + self.part.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mainmark.is_empty() && self.part.is_empty()
    }
}

/// Expected marks that matched no file, per kind and role. ENC files are not
/// mark-matched and therefore carry no miss set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Misses {
    pub nc: RoleSplit,
    pub dxf: RoleSplit,
    pub pdf: RoleSplit,
}

impl Misses {
    pub fn total(&self) -> usize {
        self.nc.len() + self.dxf.len() + self.pdf.len()
    }
}

/// A recoverable filesystem failure recorded during traversal. The affected
/// subtree contributes nothing to the report; the scan itself never aborts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraversalFailure {
    pub stage: FailureStage,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    ListDir,
    Stat,
    Walk,
}

/// Export trees a caller can request. `Nc`, `Dxf`, and `Enc` gate their own
/// trees (both roles when applicable); `Assembly` and `Part` gate the PDF
/// trees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExportCategory {
    Assembly,
    Part,
    Nc,
    Dxf,
    Enc,
}

impl ExportCategory {
    pub const ALL: [ExportCategory; 5] = [
        ExportCategory::Assembly,
        ExportCategory::Part,
        ExportCategory::Nc,
        ExportCategory::Dxf,
        ExportCategory::Enc,
    ];
}

/// Per-run outcome of the export organizer. Per-file problems are recorded
/// here instead of aborting the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExportSummary {
    pub copied: u64,
    pub skipped_existing: u64,
    pub missing_sources: Vec<String>,
    pub failed: Vec<CopyFailure>,
}

impl ExportSummary {
    pub fn failed_paths(&self) -> Vec<String> {
        self.failed.iter().map(|item| item.path.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CopyFailure {
    pub path: String,
    pub message: String,
}
