use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sysinfo::Disks;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorInfo {
    pub os: String,
    pub arch: String,
    pub current_dir: Option<String>,
    pub nc_root: RootProbe,
    pub drawing_root: RootProbe,
    pub mounts: Vec<MountInfo>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootProbe {
    pub path: String,
    pub reachable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountInfo {
    pub name: String,
    pub mount_point: String,
    pub total_space_bytes: u64,
    pub free_space_bytes: u64,
    pub file_system: Option<String>,
    pub is_removable: bool,
}

/// Probe the environment before a scan: whether both share roots are
/// reachable, and what is currently mounted. Diagnoses the common "network
/// drive not mounted" failure without running a discovery.
pub fn collect_doctor_info(nc_root: &Path, drawing_root: &Path) -> DoctorInfo {
    let current_dir = env::current_dir()
        .ok()
        .map(|path| path.to_string_lossy().to_string());

    let nc_probe = probe_root(nc_root);
    let drawing_probe = probe_root(drawing_root);

    let mut notes = Vec::new();
    for probe in [&nc_probe, &drawing_probe] {
        if !probe.reachable {
            notes.push(format!(
                "share not reachable: {}; check that the network drive is mounted",
                probe.path
            ));
        }
    }

    let mounts = enumerate_mounts();
    if mounts.is_empty() {
        notes.push("no mounted disks detected by sysinfo".to_string());
    }

    DoctorInfo {
        os: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        current_dir,
        nc_root: nc_probe,
        drawing_root: drawing_probe,
        mounts,
        notes,
    }
}

fn probe_root(path: &Path) -> RootProbe {
    RootProbe {
        path: path.to_string_lossy().to_string(),
        reachable: fs::read_dir(path).is_ok(),
    }
}

fn enumerate_mounts() -> Vec<MountInfo> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .map(|disk| MountInfo {
            name: disk.name().to_string_lossy().to_string(),
            mount_point: disk.mount_point().to_string_lossy().to_string(),
            total_space_bytes: disk.total_space(),
            free_space_bytes: disk.available_space(),
            file_system: Some(disk.file_system().to_string_lossy().to_string()),
            is_removable: disk.is_removable(),
        })
        .collect()
}
