use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filetime::FileTime;
use tracing::{debug, info, warn};

use crate::model::{CopyFailure, ExportCategory, ExportSummary, ScanReport};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub categories: Vec<ExportCategory>,
    pub destination: PathBuf,
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            categories: ExportCategory::ALL.to_vec(),
            destination: PathBuf::from("JobScan Exports"),
            overwrite: false,
        }
    }
}

/// Copy discovered files into the export folder structure.
///
/// Subfolders are created only when a file is actually about to land in them,
/// so a category with zero matched files leaves no folder behind. Per-file
/// problems (vanished source, existing destination with overwrite off, copy
/// failure) are recorded in the returned summary and the batch continues;
/// only creating the destination root itself can fail this function.
pub fn organize(report: &ScanReport, options: &ExportOptions) -> Result<ExportSummary> {
    fs::create_dir_all(&options.destination).with_context(|| {
        format!(
            "failed to create export root {}",
            options.destination.display()
        )
    })?;
    info!(
        "exporting to {} (overwrite: {})",
        options.destination.display(),
        options.overwrite
    );

    let mut summary = ExportSummary::default();
    let requested = |category: ExportCategory| options.categories.contains(&category);

    if requested(ExportCategory::Nc) {
        copy_group(&report.nc.part, options, "NC/PARTS", &mut summary);
        copy_group(&report.nc.mainmark, options, "NC/ASSEMBLIES", &mut summary);
    }
    if requested(ExportCategory::Dxf) {
        copy_group(&report.dxf.part, options, "DXF/PARTS", &mut summary);
        copy_group(&report.dxf.mainmark, options, "DXF/ASSEMBLIES", &mut summary);
    }
    if requested(ExportCategory::Enc) {
        copy_group(&report.enc, options, "ENC", &mut summary);
    }
    if requested(ExportCategory::Part) {
        copy_group(&report.pdf.part, options, "PDF/PARTS", &mut summary);
    }
    if requested(ExportCategory::Assembly) {
        copy_group(&report.pdf.mainmark, options, "PDF/ASSEMBLIES", &mut summary);
    }

    info!(
        "export complete: {} copied, {} skipped, {} missing, {} failed",
        summary.copied,
        summary.skipped_existing,
        summary.missing_sources.len(),
        summary.failed.len()
    );
    Ok(summary)
}

fn copy_group(
    paths: &[String],
    options: &ExportOptions,
    subdir: &str,
    summary: &mut ExportSummary,
) {
    if paths.is_empty() {
        return;
    }
    let target_dir = options.destination.join(subdir);
    let mut dir_ready = target_dir.is_dir();

    for raw in paths {
        let source = Path::new(raw);
        if !source.exists() {
            warn!("source vanished before copy: {}", source.display());
            summary.missing_sources.push(raw.clone());
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };

        let destination = target_dir.join(name);
        if destination.exists() && !options.overwrite {
            debug!("destination exists, skipping: {}", destination.display());
            summary.skipped_existing += 1;
            continue;
        }

        if !dir_ready {
            if let Err(err) = fs::create_dir_all(&target_dir) {
                warn!("failed to create {}: {}", target_dir.display(), err);
                summary.failed.push(CopyFailure {
                    path: raw.clone(),
                    message: err.to_string(),
                });
                continue;
            }
            dir_ready = true;
        }

        match copy_preserving_mtime(source, &destination) {
            Ok(()) => summary.copied += 1,
            Err(err) => {
                warn!("failed to copy {}: {}", source.display(), err);
                summary.failed.push(CopyFailure {
                    path: raw.clone(),
                    message: err.to_string(),
                });
            }
        }
    }
}

fn copy_preserving_mtime(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    let metadata = fs::metadata(source)?;
    filetime::set_file_mtime(destination, FileTime::from_last_modification_time(&metadata))?;
    Ok(())
}
