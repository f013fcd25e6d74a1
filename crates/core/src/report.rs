use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::Misses;

pub const MISS_REPORT_FILE_NAME: &str = "JobScan_Miss_Report.txt";

/// Render the plain-text miss report: per kind/role, the expected marks that
/// matched no file, followed by the failed-copy section.
pub fn render_miss_report(
    job_code: u64,
    output_root: &Path,
    misses: &Misses,
    failed_paths: &[String],
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("=== JobScan Miss Report ===".to_string());
    lines.push(format!("Job: {job_code}"));
    lines.push(format!("Output: {}", output_root.display()));
    lines.push(String::new());

    push_section(&mut lines, "By Category / Type (Not Found)");
    let kinds = [("nc", &misses.nc), ("dxf", &misses.dxf), ("pdf", &misses.pdf)];
    for (kind, split) in kinds {
        push_role(&mut lines, kind, "Mainmark", &split.mainmark);
        push_role(&mut lines, kind, "Part", &split.part);
    }

    push_section(&mut lines, "Failed Copies");
    if failed_paths.is_empty() {
        lines.push("All files Copied Successfully".to_string());
    } else {
        for path in failed_paths {
            lines.push(format!("- {path}"));
        }
    }

    lines.join("\n")
}

/// Write the miss report to `<output_root>/JobScan_Miss_Report.txt`,
/// creating the output folder if needed. Returns the report path.
pub fn write_miss_report(
    output_root: &Path,
    job_code: u64,
    misses: &Misses,
    failed_paths: &[String],
) -> Result<PathBuf> {
    fs::create_dir_all(output_root)
        .with_context(|| format!("failed to create {}", output_root.display()))?;
    let resolved = fs::canonicalize(output_root).unwrap_or_else(|_| output_root.to_path_buf());

    let report_path = output_root.join(MISS_REPORT_FILE_NAME);
    let content = render_miss_report(job_code, &resolved, misses, failed_paths);
    fs::write(&report_path, content)
        .with_context(|| format!("failed to write {}", report_path.display()))?;
    Ok(report_path)
}

fn push_section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(title.len()));
    lines.push(String::new());
}

fn push_role(lines: &mut Vec<String>, kind: &str, role_label: &str, items: &[String]) {
    let mut items: Vec<String> = items.to_vec();
    items.sort();
    items.dedup();

    let label = format!("{kind} {role_label}");
    if items.is_empty() {
        lines.push(format!("{label}: (none)"));
    } else {
        lines.push(format!("{label}:"));
        for item in items {
            lines.push(format!("  - {item}"));
        }
    }
    lines.push(String::new());
}
