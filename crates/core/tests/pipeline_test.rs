use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use jobscan_core::{
    compress, export_root, organize, run_discovery, write_miss_report, DiscoverOptions,
    ExportCategory, ExportOptions, MISS_REPORT_FILE_NAME,
};

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

/// Full pipeline over a fixture tree: discover both shares, export the
/// requested categories, write the miss report, and zip the result.
#[test]
fn discover_export_report_and_zip() -> Result<()> {
    let temp = TempDir::new()?;
    let nc_root = temp.path().join("nc");
    let drawing_root = temp.path().join("drawings");

    let nc_job = nc_root.join("4100 - North Plant");
    write(&nc_job.join("cut/A1-weld.nc1"), b"nc a1");
    write(&nc_job.join("cut/B2.nc1"), b"nc b2");
    write(&nc_job.join("plasma/B2-plate.dxf"), b"dxf b2");
    write(&nc_job.join("encoder/line1.enc"), b"enc");
    write(&nc_job.join("cut/unrelated.nc1"), b"nc other");
    // A neighboring job must not contribute.
    write(&nc_root.join("9900/A1.nc1"), b"wrong job");

    let drawing_job = drawing_root.join("4100 - North Plant");
    write(&drawing_job.join("Drawings/Parts/B2.pdf"), b"pdf b2");
    write(&drawing_job.join("Drawings/Fabrication/A1.pdf"), b"pdf a1");
    write(&drawing_job.join("Drawings/Office/A1-quote.pdf"), b"ignored");

    let options = DiscoverOptions {
        job_code: 4100,
        mainmarks: vec!["A1".to_string(), "A7".to_string()],
        parts: vec!["B2".to_string()],
        nc_root,
        drawing_root,
        scan_id: Some("pipeline".to_string()),
        ..DiscoverOptions::default()
    };
    let report = run_discovery(&options);

    assert_eq!(report.nc.mainmark.len(), 1);
    assert_eq!(report.nc.part.len(), 1);
    assert_eq!(report.dxf.part.len(), 1);
    assert_eq!(report.enc.len(), 1);
    assert_eq!(report.pdf.mainmark.len(), 1);
    assert_eq!(report.pdf.part.len(), 1);
    assert_eq!(report.misses.nc.mainmark, vec!["a7".to_string()]);
    assert_eq!(report.misses.dxf.mainmark, vec!["a1", "a7"]);
    assert!(report.failures.is_empty());

    let destination = export_root(temp.path(), 4100, "PKG/2");
    assert!(destination.ends_with("4100 - PKG-2"));

    let summary = organize(
        &report,
        &ExportOptions {
            categories: ExportCategory::ALL.to_vec(),
            destination: destination.clone(),
            overwrite: false,
        },
    )?;

    assert_eq!(summary.copied, 6);
    assert!(summary.failed.is_empty());
    assert!(destination.join("NC/ASSEMBLIES/A1-weld.nc1").is_file());
    assert!(destination.join("NC/PARTS/B2.nc1").is_file());
    assert!(destination.join("DXF/PARTS/B2-plate.dxf").is_file());
    assert!(destination.join("ENC/line1.enc").is_file());
    assert!(destination.join("PDF/ASSEMBLIES/A1.pdf").is_file());
    assert!(destination.join("PDF/PARTS/B2.pdf").is_file());
    assert!(!destination.join("DXF/ASSEMBLIES").exists());

    let report_path =
        write_miss_report(&destination, 4100, &report.misses, &summary.failed_paths())?;
    assert_eq!(report_path, destination.join(MISS_REPORT_FILE_NAME));
    let text = fs::read_to_string(&report_path)?;
    assert!(text.contains("nc Mainmark:\n  - a7"));
    assert!(text.contains("All files Copied Successfully"));

    let archive = compress(&destination, false)?;
    assert_eq!(archive, temp.path().join("4100 - PKG-2.zip"));
    assert!(archive.is_file());

    // Re-running the organizer without overwrite does no new work.
    let second = organize(
        &report,
        &ExportOptions {
            categories: ExportCategory::ALL.to_vec(),
            destination,
            overwrite: false,
        },
    )?;
    assert_eq!(second.copied, 0);
    assert_eq!(second.skipped_existing, 6);

    Ok(())
}
