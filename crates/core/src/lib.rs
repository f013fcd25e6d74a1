pub mod archive;
pub mod discover;
pub mod doctor;
pub mod marks;
pub mod matcher;
pub mod model;
pub mod naming;
pub mod organize;
pub mod report;
pub mod walk;

pub use archive::{compress, ArchiveError};
pub use discover::{run_discovery, DiscoverOptions};
pub use doctor::{collect_doctor_info, DoctorInfo, MountInfo, RootProbe};
pub use marks::{FileMarkSource, MarkLists, MarkSource};
pub use matcher::MarkSets;
pub use model::{
    CopyFailure, ExportCategory, ExportSummary, FailureStage, JobFolderMatch, Misses, Role,
    RoleSplit, ScanMetadata, ScanMetrics, ScanReport, TraversalFailure, REPORT_VERSION,
};
pub use naming::{default_drawing_root, default_nc_root, export_root, sanitize_component};
pub use organize::{organize, ExportOptions};
pub use report::{render_miss_report, write_miss_report, MISS_REPORT_FILE_NAME};
