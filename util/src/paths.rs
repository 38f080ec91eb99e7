use crate::config;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Global storage root (absolute), from `config::storage_root()`.
/// If relative in env, resolve against current_dir().
pub fn storage_root() -> PathBuf {
    let root = config::storage_root();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// Report artifacts live under: {STORAGE_ROOT}/reports
pub fn reports_dir() -> PathBuf {
    storage_root().join("reports")
}

/// Per-student report folder: {STORAGE_ROOT}/reports/{safe-email}
pub fn student_reports_dir(email: &str) -> PathBuf {
    reports_dir().join(safe_segment(email))
}

/// One stored report document: {STORAGE_ROOT}/reports/{safe-email}/{artifact_id}.xml
pub fn report_artifact_path(email: &str, artifact_id: i64) -> PathBuf {
    student_reports_dir(email).join(format!("{artifact_id}.xml"))
}

/// Collapse an arbitrary identifier (usually an email address) into a
/// filesystem-safe path segment. Anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn safe_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
