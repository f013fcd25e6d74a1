use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive source not found: {0}")]
    SourceMissing(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("zip error on {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Compress a directory (or single file) into a zip archive placed as a
/// sibling: `<parent>/<name>.zip`.
///
/// An existing target is left untouched and returned when `overwrite` is
/// false; with `overwrite` it is replaced. The archive is written to a
/// temporary path first and renamed into place once complete.
pub fn compress(path: &Path, overwrite: bool) -> Result<PathBuf, ArchiveError> {
    if !path.exists() {
        return Err(ArchiveError::SourceMissing(path.to_path_buf()));
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| name.clone());
    let target = if path.is_dir() {
        parent.join(format!("{name}.zip"))
    } else {
        parent.join(format!("{stem}.zip"))
    };

    if target.exists() && !overwrite {
        info!("archive already exists, skipping: {}", target.display());
        return Ok(target);
    }

    let temp = target.with_extension("zip.tmp");
    if let Err(err) = write_archive(path, &name, &temp) {
        if temp.exists() {
            if let Err(cleanup) = fs::remove_file(&temp) {
                warn!("failed to remove partial archive {}: {}", temp.display(), cleanup);
            }
        }
        return Err(err);
    }

    if target.exists() {
        fs::remove_file(&target).map_err(|source| ArchiveError::Io {
            path: target.clone(),
            source,
        })?;
    }
    fs::rename(&temp, &target).map_err(|source| ArchiveError::Io {
        path: target.clone(),
        source,
    })?;

    info!("archived {} to {}", path.display(), target.display());
    Ok(target)
}

fn write_archive(path: &Path, name: &str, temp: &Path) -> Result<(), ArchiveError> {
    let file = File::create(temp).map_err(|source| ArchiveError::Io {
        path: temp.to_path_buf(),
        source,
    })?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if path.is_dir() {
        for item in WalkDir::new(path).follow_links(false).sort_by_file_name() {
            let entry = item.map_err(|err| {
                let entry_path = err.path().unwrap_or(path).to_path_buf();
                ArchiveError::Io {
                    path: entry_path,
                    source: err.into(),
                }
            })?;
            let Ok(relative) = entry.path().strip_prefix(path) else {
                continue;
            };
            let arc_name = archive_entry_name(name, relative);

            if entry.file_type().is_dir() {
                writer
                    .add_directory(arc_name, options)
                    .map_err(|source| ArchiveError::Zip {
                        path: entry.path().to_path_buf(),
                        source,
                    })?;
            } else if entry.file_type().is_file() {
                writer
                    .start_file(arc_name, options)
                    .map_err(|source| ArchiveError::Zip {
                        path: entry.path().to_path_buf(),
                        source,
                    })?;
                let mut reader =
                    File::open(entry.path()).map_err(|source| ArchiveError::Io {
                        path: entry.path().to_path_buf(),
                        source,
                    })?;
                io::copy(&mut reader, &mut writer).map_err(|source| ArchiveError::Io {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
            }
        }
    } else {
        writer
            .start_file(name, options)
            .map_err(|source| ArchiveError::Zip {
                path: path.to_path_buf(),
                source,
            })?;
        let mut reader = File::open(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        io::copy(&mut reader, &mut writer).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    writer.finish().map_err(|source| ArchiveError::Zip {
        path: temp.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn archive_entry_name(root_name: &str, relative: &Path) -> String {
    let mut arc_name = root_name.to_string();
    for component in relative.components() {
        arc_name.push('/');
        arc_name.push_str(&component.as_os_str().to_string_lossy());
    }
    arc_name
}
