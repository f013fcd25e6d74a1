use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgAction;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jobscan_core::{
    collect_doctor_info, compress, default_drawing_root, default_nc_root, export_root, organize,
    run_discovery, write_miss_report, DiscoverOptions, ExportCategory, ExportOptions,
    FileMarkSource, JobFolderMatch, MarkSource, ScanReport,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "jobscan",
    version,
    about = "Locate, classify, and export production files for a job package."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan both shares for a job's files and emit a JSON report.
    Discover(DiscoverArgs),
    /// Run the full pipeline: discover, export, miss report, optional zip.
    Export(ExportArgs),
    /// Show environment and share reachability information.
    Doctor(DoctorArgs),
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum CliJobFolderMatch {
    Prefix,
    Delimited,
}

impl From<CliJobFolderMatch> for JobFolderMatch {
    fn from(value: CliJobFolderMatch) -> Self {
        match value {
            CliJobFolderMatch::Prefix => JobFolderMatch::Prefix,
            CliJobFolderMatch::Delimited => JobFolderMatch::Delimited,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum CliCategory {
    Assembly,
    Part,
    Nc,
    Dxf,
    Enc,
}

impl From<CliCategory> for ExportCategory {
    fn from(value: CliCategory) -> Self {
        match value {
            CliCategory::Assembly => ExportCategory::Assembly,
            CliCategory::Part => ExportCategory::Part,
            CliCategory::Nc => ExportCategory::Nc,
            CliCategory::Dxf => ExportCategory::Dxf,
            CliCategory::Enc => ExportCategory::Enc,
        }
    }
}

#[derive(Debug, Args)]
struct ShareArgs {
    /// NC files share root. Defaults to the production share.
    #[arg(long, value_name = "DIR")]
    nc_root: Option<PathBuf>,

    /// Shop drawings share root. Defaults to the production share.
    #[arg(long, value_name = "DIR")]
    drawing_root: Option<PathBuf>,

    /// How job folders are matched against the job code.
    #[arg(long, value_enum, default_value = "prefix")]
    job_folder_match: CliJobFolderMatch,
}

#[derive(Debug, Args)]
struct DiscoverArgs {
    /// Job code whose folders are scanned.
    #[arg(long)]
    job: u64,

    /// JSON file holding the package's expected mainmarks and parts.
    #[arg(long, value_name = "FILE")]
    marks_file: PathBuf,

    /// Package code passed through to the mark source.
    #[arg(long, default_value = "")]
    package: String,

    #[command(flatten)]
    shares: ShareArgs,

    /// Output report path.
    #[arg(long, default_value = "jobscan-report.json", value_name = "FILE")]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Job code whose folders are scanned.
    #[arg(long)]
    job: u64,

    /// Package code, used for the export folder name.
    #[arg(long)]
    package: String,

    /// JSON file holding the package's expected mainmarks and parts.
    #[arg(long, value_name = "FILE")]
    marks_file: PathBuf,

    #[command(flatten)]
    shares: ShareArgs,

    /// Base folder the export tree is created under.
    #[arg(long, default_value = "JobScan Exports", value_name = "DIR")]
    output_base: PathBuf,

    /// Categories to export (default: all).
    #[arg(long = "categories", value_enum, value_name = "CATEGORY", num_args = 1.., action = ArgAction::Append)]
    categories: Vec<CliCategory>,

    /// Replace files that already exist in the export tree.
    #[arg(long)]
    overwrite: bool,

    /// Compress the export folder into a sibling zip archive.
    #[arg(long)]
    zip: bool,

    /// Optional path for the JSON classification report.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DoctorArgs {
    #[command(flatten)]
    shares: ShareArgs,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Discover(args) => run_discover_command(args),
        Commands::Export(args) => run_export_command(args),
        Commands::Doctor(args) => {
            run_doctor_command(args);
            Ok(())
        }
    }
}

fn run_discover_command(args: DiscoverArgs) -> Result<()> {
    let marks = FileMarkSource::new(&args.marks_file).package_contents(args.job, &args.package)?;
    if marks.is_empty() {
        println!("No marks found in {}.", args.marks_file.display());
        return Ok(());
    }

    let report = run_discovery(&discover_options(args.job, marks.mainmarks, marks.parts, &args.shares));
    write_report_json(&report, &args.output)?;

    println!("Report written to {}", args.output.display());
    print_scan_summary(&report);
    Ok(())
}

fn run_export_command(args: ExportArgs) -> Result<()> {
    let package = args.package.trim().to_uppercase();
    let marks = FileMarkSource::new(&args.marks_file).package_contents(args.job, &package)?;
    if marks.is_empty() {
        println!("No marks found for package {package}.");
        return Ok(());
    }

    let report = run_discovery(&discover_options(args.job, marks.mainmarks, marks.parts, &args.shares));
    print_scan_summary(&report);

    let categories = if args.categories.is_empty() {
        ExportCategory::ALL.to_vec()
    } else {
        args.categories.iter().map(|c| (*c).into()).collect()
    };
    let destination = export_root(&args.output_base, args.job, &package);

    let summary = organize(
        &report,
        &ExportOptions {
            categories,
            destination: destination.clone(),
            overwrite: args.overwrite,
        },
    )?;
    println!(
        "Exported to {}: {} copied, {} skipped, {} missing, {} failed.",
        destination.display(),
        summary.copied,
        summary.skipped_existing,
        summary.missing_sources.len(),
        summary.failed.len()
    );

    let miss_report =
        write_miss_report(&destination, args.job, &report.misses, &summary.failed_paths())?;
    println!("Miss report written to {}", miss_report.display());

    if let Some(report_path) = &args.report {
        write_report_json(&report, report_path)?;
        println!("Report written to {}", report_path.display());
    }

    if args.zip {
        let archive = compress(&destination, args.overwrite)?;
        println!("Archive written to {}", archive.display());
    }

    Ok(())
}

fn run_doctor_command(args: DoctorArgs) {
    let nc_root = args
        .shares
        .nc_root
        .unwrap_or_else(|| default_nc_root().to_path_buf());
    let drawing_root = args
        .shares
        .drawing_root
        .unwrap_or_else(|| default_drawing_root().to_path_buf());

    let info = collect_doctor_info(&nc_root, &drawing_root);
    println!("OS: {} ({})", info.os, info.arch);
    if let Some(current_dir) = info.current_dir {
        println!("Current directory: {}", current_dir);
    }
    println!(
        "NC share: {} ({})",
        info.nc_root.path,
        reachable_label(info.nc_root.reachable)
    );
    println!(
        "Drawings share: {} ({})",
        info.drawing_root.path,
        reachable_label(info.drawing_root.reachable)
    );
    println!("Mounted disks: {}", info.mounts.len());
    for mount in info.mounts {
        println!(
            "- {} [{}] total={} free={} fs={} removable={}",
            mount.name,
            mount.mount_point,
            human_bytes(mount.total_space_bytes),
            human_bytes(mount.free_space_bytes),
            mount.file_system.as_deref().unwrap_or("unknown"),
            mount.is_removable
        );
    }
    for note in info.notes {
        println!("Note: {}", note);
    }
}

fn discover_options(
    job: u64,
    mainmarks: Vec<String>,
    parts: Vec<String>,
    shares: &ShareArgs,
) -> DiscoverOptions {
    DiscoverOptions {
        job_code: job,
        mainmarks,
        parts,
        nc_root: shares
            .nc_root
            .clone()
            .unwrap_or_else(|| default_nc_root().to_path_buf()),
        drawing_root: shares
            .drawing_root
            .clone()
            .unwrap_or_else(|| default_drawing_root().to_path_buf()),
        job_folder_match: shares.job_folder_match.into(),
        scan_id: None,
    }
}

fn write_report_json(report: &ScanReport, path: &PathBuf) -> Result<()> {
    let payload = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(path, payload)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn print_scan_summary(report: &ScanReport) {
    println!(
        "Scanned {} file(s) in {} ms: {} NC, {} DXF, {} ENC, {} PDF matched.",
        report.scan_metrics.scanned_files,
        report.scan_metrics.elapsed_ms,
        report.nc.len(),
        report.dxf.len(),
        report.enc.len(),
        report.pdf.len()
    );
    if report.misses.total() > 0 {
        println!("{} expected mark(s) were not found.", report.misses.total());
    }
    if !report.failures.is_empty() {
        println!(
            "{} path(s) could not be read; see the report for details.",
            report.failures.len()
        );
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
}

fn reachable_label(reachable: bool) -> &'static str {
    if reachable {
        "reachable"
    } else {
        "NOT reachable"
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if value == 0 {
        return "0 B".to_string();
    }
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
