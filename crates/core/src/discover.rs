use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::matcher::MarkSets;
use crate::model::{
    JobFolderMatch, Misses, Role, RoleSplit, ScanMetadata, ScanMetrics, ScanReport,
    TraversalFailure, REPORT_VERSION,
};
use crate::naming::{default_drawing_root, default_nc_root};
use crate::walk::{list_subdirs, walk_files, WalkCounters};

/// Relative paths under a drawings job folder that are searched for PDFs.
const DRAWING_SUBDIRS: [&str; 2] = ["Parts", "Fabrication"];

#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    pub job_code: u64,
    pub mainmarks: Vec<String>,
    pub parts: Vec<String>,
    pub nc_root: PathBuf,
    pub drawing_root: PathBuf,
    pub job_folder_match: JobFolderMatch,
    pub scan_id: Option<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            job_code: 0,
            mainmarks: Vec::new(),
            parts: Vec::new(),
            nc_root: default_nc_root().to_path_buf(),
            drawing_root: default_drawing_root().to_path_buf(),
            job_folder_match: JobFolderMatch::Prefix,
            scan_id: None,
        }
    }
}

/// Mutable per-scan state, created fresh per invocation and converted into
/// the final report once traversal completes.
#[derive(Default)]
struct ScanAccumulator {
    nc: KindAccumulator,
    dxf: KindAccumulator,
    pdf: KindAccumulator,
    enc: Vec<PathBuf>,
    failures: Vec<TraversalFailure>,
    warnings: Vec<String>,
    counters: WalkCounters,
    matched_files: u64,
}

#[derive(Default)]
struct KindAccumulator {
    mainmark: Vec<PathBuf>,
    part: Vec<PathBuf>,
    found_mainmark: HashSet<String>,
    found_part: HashSet<String>,
}

impl KindAccumulator {
    fn record(&mut self, role: Role, mark: String, path: PathBuf) {
        match role {
            Role::Mainmark => {
                self.mainmark.push(path);
                self.found_mainmark.insert(mark);
            }
            Role::Part => {
                self.part.push(path);
                self.found_part.insert(mark);
            }
        }
    }

    fn into_bucket_and_misses(self, marks: &MarkSets) -> (RoleSplit, RoleSplit) {
        let bucket = RoleSplit {
            mainmark: sorted_paths(self.mainmark),
            part: sorted_paths(self.part),
        };
        let misses = RoleSplit {
            mainmark: sorted_difference(marks.mainmarks(), &self.found_mainmark),
            part: sorted_difference(marks.parts(), &self.found_part),
        };
        (bucket, misses)
    }
}

/// Run one discovery pass over both share roots.
///
/// This is a total function: every filesystem failure is recovered into the
/// report's `failures` list and the affected subtree contributes nothing.
/// Callers always receive a well-formed (possibly empty) report.
pub fn run_discovery(options: &DiscoverOptions) -> ScanReport {
    let started = Instant::now();
    let scan_id = options
        .scan_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let marks = MarkSets::new(&options.mainmarks, &options.parts);
    let mut accumulator = ScanAccumulator::default();

    info!(
        job = options.job_code,
        "scanning NC share {}",
        options.nc_root.display()
    );
    scan_nc_side(options, &marks, &mut accumulator);

    info!(
        job = options.job_code,
        "scanning drawings share {}",
        options.drawing_root.display()
    );
    scan_drawing_side(options, &marks, &mut accumulator);

    let elapsed_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
    into_report(options, &marks, accumulator, scan_id, elapsed_ms)
}

fn scan_nc_side(options: &DiscoverOptions, marks: &MarkSets, accumulator: &mut ScanAccumulator) {
    let folders = job_folders(
        &options.nc_root,
        options.job_code,
        options.job_folder_match,
        accumulator,
    );

    for folder in folders {
        for file in walk_files(&folder, &mut accumulator.failures, &mut accumulator.counters) {
            let Some(name) = file.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let lower = name.to_lowercase();

            if lower.ends_with(".enc") {
                accumulator.enc.push(file);
                continue;
            }

            let Some((role, mark)) = marks.classify(name) else {
                continue;
            };
            if lower.ends_with(".nc1") {
                debug!("nc match {:?} {}: {}", role, mark, file.display());
                accumulator.nc.record(role, mark, file);
                accumulator.matched_files += 1;
            } else if lower.ends_with(".dxf") {
                debug!("dxf match {:?} {}: {}", role, mark, file.display());
                accumulator.dxf.record(role, mark, file);
                accumulator.matched_files += 1;
            }
        }
    }
}

fn scan_drawing_side(
    options: &DiscoverOptions,
    marks: &MarkSets,
    accumulator: &mut ScanAccumulator,
) {
    let folders = job_folders(
        &options.drawing_root,
        options.job_code,
        options.job_folder_match,
        accumulator,
    );

    for folder in folders {
        for subdir in DRAWING_SUBDIRS {
            let base = folder.join("Drawings").join(subdir);
            if !base.is_dir() {
                continue;
            }
            for file in walk_files(&base, &mut accumulator.failures, &mut accumulator.counters) {
                let Some(name) = file.file_name().and_then(|name| name.to_str()) else {
                    continue;
                };
                if !name.to_lowercase().ends_with(".pdf") {
                    continue;
                }
                if let Some((role, mark)) = marks.classify(name) {
                    debug!("pdf match {:?} {}: {}", role, mark, file.display());
                    accumulator.pdf.record(role, mark, file);
                    accumulator.matched_files += 1;
                }
            }
        }
    }
}

fn job_folders(
    root: &Path,
    job_code: u64,
    mode: JobFolderMatch,
    accumulator: &mut ScanAccumulator,
) -> Vec<PathBuf> {
    let job_prefix = job_code.to_string();
    let folders: Vec<PathBuf> = list_subdirs(root, &mut accumulator.failures)
        .into_iter()
        .filter(|folder| {
            folder
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| folder_name_matches(name, &job_prefix, mode))
        })
        .collect();

    if folders.is_empty() {
        accumulator.warnings.push(format!(
            "no job folders matched {} under {}",
            job_prefix,
            root.display()
        ));
    }
    folders
}

fn folder_name_matches(name: &str, job_prefix: &str, mode: JobFolderMatch) -> bool {
    match mode {
        JobFolderMatch::Prefix => name.starts_with(job_prefix),
        JobFolderMatch::Delimited => match name.strip_prefix(job_prefix) {
            Some(rest) => !rest.starts_with(|ch: char| ch.is_ascii_digit()),
            None => false,
        },
    }
}

fn into_report(
    options: &DiscoverOptions,
    marks: &MarkSets,
    accumulator: ScanAccumulator,
    scan_id: String,
    elapsed_ms: u64,
) -> ScanReport {
    let ScanAccumulator {
        nc,
        dxf,
        pdf,
        enc,
        failures,
        warnings,
        counters,
        matched_files,
    } = accumulator;

    let (nc_bucket, nc_misses) = nc.into_bucket_and_misses(marks);
    let (dxf_bucket, dxf_misses) = dxf.into_bucket_and_misses(marks);
    let (pdf_bucket, pdf_misses) = pdf.into_bucket_and_misses(marks);

    ScanReport {
        report_version: REPORT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        scan_id,
        scan: ScanMetadata {
            job_code: options.job_code,
            nc_root: options.nc_root.to_string_lossy().to_string(),
            drawing_root: options.drawing_root.to_string_lossy().to_string(),
            mainmarks: options.mainmarks.clone(),
            parts: options.parts.clone(),
            job_folder_match: options.job_folder_match,
        },
        scan_metrics: ScanMetrics {
            elapsed_ms,
            scanned_files: counters.files,
            scanned_directories: counters.directories,
            matched_files,
        },
        nc: nc_bucket,
        dxf: dxf_bucket,
        enc: sorted_paths(enc),
        pdf: pdf_bucket,
        misses: Misses {
            nc: nc_misses,
            dxf: dxf_misses,
            pdf: pdf_misses,
        },
        failures,
        warnings,
    }
}

fn sorted_paths(paths: Vec<PathBuf>) -> Vec<String> {
    let mut out: Vec<String> = paths
        .into_iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect();
    out.sort();
    out
}

fn sorted_difference(expected: &HashSet<String>, found: &HashSet<String>) -> Vec<String> {
    let mut out: Vec<String> = expected.difference(found).cloned().collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{folder_name_matches, run_discovery, DiscoverOptions};
    use crate::model::JobFolderMatch;

    fn write(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write file");
    }

    fn options(temp: &TempDir, mainmarks: &[&str], parts: &[&str]) -> DiscoverOptions {
        DiscoverOptions {
            job_code: 4100,
            mainmarks: mainmarks.iter().map(|m| m.to_string()).collect(),
            parts: parts.iter().map(|p| p.to_string()).collect(),
            nc_root: temp.path().join("nc"),
            drawing_root: temp.path().join("drawings"),
            scan_id: Some("test-scan".to_string()),
            ..DiscoverOptions::default()
        }
    }

    #[test]
    fn classifies_nc_dxf_enc_and_computes_misses() {
        let temp = TempDir::new().expect("tempdir");
        let job = temp.path().join("nc/4100 - Plant");
        write(&job.join("foo/A1-weld.nc1"), b"nc");
        write(&job.join("bar/B2.dxf"), b"dxf");
        write(&job.join("x.enc"), b"enc");

        let report = run_discovery(&options(&temp, &["A1"], &["B2"]));

        assert_eq!(report.nc.mainmark.len(), 1);
        assert!(report.nc.mainmark[0].ends_with("A1-weld.nc1"));
        assert!(report.nc.part.is_empty());
        assert_eq!(report.dxf.part.len(), 1);
        assert!(report.dxf.part[0].ends_with("B2.dxf"));
        assert_eq!(report.enc.len(), 1);
        assert!(report.enc[0].ends_with("x.enc"));

        assert_eq!(report.misses.nc.part, vec!["b2".to_string()]);
        assert_eq!(report.misses.dxf.mainmark, vec!["a1".to_string()]);
        assert!(report.misses.nc.mainmark.is_empty());
        assert!(report.misses.dxf.part.is_empty());
        // PDFs were never found, so both pdf miss lists are full.
        assert_eq!(report.misses.pdf.mainmark, vec!["a1".to_string()]);
        assert_eq!(report.misses.pdf.part, vec!["b2".to_string()]);
    }

    #[test]
    fn pdf_side_descends_only_fixed_subpaths() {
        let temp = TempDir::new().expect("tempdir");
        let job = temp.path().join("drawings/4100 - Plant");
        write(&job.join("Drawings/Parts/B2.pdf"), b"pdf");
        write(&job.join("Drawings/Fabrication/A1 rev2.pdf"), b"pdf");
        write(&job.join("Drawings/Archive/A1-old.pdf"), b"pdf");
        write(&job.join("Drawings/Parts/notes.txt"), b"txt");

        let report = run_discovery(&options(&temp, &["A1"], &["B2"]));

        assert_eq!(report.pdf.mainmark.len(), 1);
        assert!(report.pdf.mainmark[0].ends_with("A1 rev2.pdf"));
        assert_eq!(report.pdf.part.len(), 1);
        assert!(report.misses.pdf.mainmark.is_empty());
        assert!(report.misses.pdf.part.is_empty());
    }

    #[test]
    fn found_and_missed_marks_are_disjoint_and_cover_expected() {
        let temp = TempDir::new().expect("tempdir");
        let job = temp.path().join("nc/4100");
        write(&job.join("A1.nc1"), b"nc");
        write(&job.join("B2.nc1"), b"nc");

        let report = run_discovery(&options(&temp, &["A1", "A9"], &["B2", "B8"]));

        assert_eq!(report.misses.nc.mainmark, vec!["a9".to_string()]);
        assert_eq!(report.misses.nc.part, vec!["b8".to_string()]);
        assert_eq!(report.nc.mainmark.len() + report.misses.nc.mainmark.len(), 2);
        assert_eq!(report.nc.part.len() + report.misses.nc.part.len(), 2);
    }

    #[test]
    fn discovery_is_deterministic_over_unchanged_tree() {
        let temp = TempDir::new().expect("tempdir");
        let job = temp.path().join("nc/4100");
        write(&job.join("z/A1-late.nc1"), b"nc");
        write(&job.join("a/A1-early.nc1"), b"nc");
        write(&job.join("b.enc"), b"enc");
        write(&job.join("a.enc"), b"enc");

        let opts = options(&temp, &["A1"], &[]);
        let first = run_discovery(&opts);
        let second = run_discovery(&opts);

        assert_eq!(first.nc, second.nc);
        assert_eq!(first.enc, second.enc);
        assert_eq!(first.misses, second.misses);
        let mut sorted = first.nc.mainmark.clone();
        sorted.sort();
        assert_eq!(first.nc.mainmark, sorted);
    }

    #[test]
    fn missing_roots_yield_empty_report_with_failures() {
        let temp = TempDir::new().expect("tempdir");
        let report = run_discovery(&options(&temp, &["A1"], &["B2"]));

        assert!(report.nc.is_empty());
        assert!(report.dxf.is_empty());
        assert!(report.pdf.is_empty());
        assert!(report.enc.is_empty());
        assert_eq!(report.misses.total(), 6);
        assert_eq!(report.failures.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_job_folder_does_not_abort_discovery() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let readable = temp.path().join("nc/4100 - A");
        let locked = temp.path().join("nc/4100 - B");
        write(&readable.join("A1.nc1"), b"nc");
        write(&locked.join("B2.nc1"), b"nc");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock");
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock");
            return;
        }

        let report = run_discovery(&options(&temp, &["A1"], &["B2"]));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock");

        assert_eq!(report.nc.mainmark.len(), 1);
        assert!(report.nc.part.is_empty());
        assert_eq!(report.misses.nc.part, vec!["b2".to_string()]);
        assert!(!report.failures.is_empty());
    }

    #[test]
    fn prefix_matching_is_loose_and_delimited_is_strict() {
        assert!(folder_name_matches("12", "12", JobFolderMatch::Prefix));
        assert!(folder_name_matches("120", "12", JobFolderMatch::Prefix));
        assert!(folder_name_matches("1234 - Plant", "12", JobFolderMatch::Prefix));

        assert!(folder_name_matches("12", "12", JobFolderMatch::Delimited));
        assert!(folder_name_matches("12 - Plant", "12", JobFolderMatch::Delimited));
        assert!(!folder_name_matches("120", "12", JobFolderMatch::Delimited));
        assert!(!folder_name_matches("1234 - Plant", "12", JobFolderMatch::Delimited));
        assert!(!folder_name_matches("Plant 12", "12", JobFolderMatch::Delimited));
    }
}
