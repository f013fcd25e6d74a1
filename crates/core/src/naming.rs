use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

static DEFAULT_NC_ROOT: Lazy<PathBuf> = Lazy::new(|| PathBuf::from(r"\\mfcsa1\NC Files"));
static DEFAULT_DRAWING_ROOT: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(r"\\mfcsa1\Shop Drawings\Jobs"));

/// The NC share scanned when no root is supplied.
pub fn default_nc_root() -> &'static Path {
    &DEFAULT_NC_ROOT
}

/// The shop-drawings share scanned when no root is supplied.
pub fn default_drawing_root() -> &'static Path {
    &DEFAULT_DRAWING_ROOT
}

/// Replace characters that are invalid in folder names (`< > : " / \ | ? *`)
/// with `-` and trim surrounding whitespace.
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '-'
            } else {
                ch
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Compose the export folder for one job/package:
/// `<base>/<job_code> - <sanitized_package_code>`.
pub fn export_root(base: &Path, job_code: u64, package_code: &str) -> PathBuf {
    base.join(format!(
        "{job_code} - {}",
        sanitize_component(package_code)
    ))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{export_root, sanitize_component};

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_component(r#"A<B>C:D"E/F\G|H?I*J"#), "A-B-C-D-E-F-G-H-I-J");
    }

    #[test]
    fn sanitize_trims_whitespace() {
        assert_eq!(sanitize_component("  PKG 2 "), "PKG 2");
    }

    #[test]
    fn export_root_combines_job_and_package() {
        let root = export_root(Path::new("/exports"), 4100, "P/1");
        assert_eq!(root, Path::new("/exports/4100 - P-1"));
    }
}
