//! Per-invocation working directories.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::warn;
use util::config;

/// Filename the submitted credentials are staged under for the suite to read.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Filename the suite writes its report to. Presence of this file after the
/// process exits is the sole success criterion; the exit code is not.
pub const REPORT_FILE: &str = "TestResult.xml";

/// An exclusively owned scratch directory for one grading run.
///
/// The directory name embeds a hash of the trace token so a log line can be
/// matched to a directory by eye. The hash is a readability aid only;
/// uniqueness comes from the random suffix. The directory is removed on drop
/// or via [`Workspace::release`].
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under the configured work root (the system
    /// temp dir when unset), including any missing parents.
    pub fn allocate(trace: &str) -> io::Result<Self> {
        let base = work_base()?;
        fs::create_dir_all(&base)?;

        let mut hasher = DefaultHasher::new();
        trace.hash(&mut hasher);
        let prefix = format!("grade_{:x}_", hasher.finish());

        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(&base)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the submitted credentials payload verbatim into the workspace.
    pub fn write_credentials(&self, payload: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(CREDENTIALS_FILE);
        fs::write(&path, payload)?;
        Ok(path)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join(REPORT_FILE)
    }

    /// Read the report the suite left behind, if any.
    pub fn read_report(&self) -> Option<String> {
        fs::read_to_string(self.report_path()).ok()
    }

    /// Delete the directory now rather than waiting for drop. Cleanup is
    /// best-effort: failures are logged as warnings, never escalated.
    pub fn release(self, trace: &str) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(
                "failed to clean up workspace {} for trace {trace}: {e}",
                path.display()
            );
        }
    }
}

fn work_base() -> io::Result<PathBuf> {
    let configured = config::work_root();
    if configured.trim().is_empty() {
        return Ok(std::env::temp_dir());
    }
    let path = PathBuf::from(configured);
    if path.is_relative() {
        Ok(std::env::current_dir()?.join(path))
    } else {
        Ok(path)
    }
}
