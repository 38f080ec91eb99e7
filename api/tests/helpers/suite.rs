use std::path::Path;
use tempfile::TempDir;
use util::config::AppConfig;

/// A fake suite always parses the same flag contract as the real one.
pub const ARG_PARSE: &str = r#"
for arg in "$@"; do
  case "$arg" in
    --credentials=*) creds="${arg#--credentials=}" ;;
    --work=*) work="${arg#--work=}" ;;
    --trace=*) trace="${arg#--trace=}" ;;
    --where=*) filter="${arg#--where=}" ;;
  esac
done
"#;

/// Full grading environment for endpoint tests: suite, work and storage
/// directories wired into the global config, torn back down on drop.
pub struct GraderSandbox {
    pub suite: TempDir,
    pub work: TempDir,
    pub storage: TempDir,
}

impl GraderSandbox {
    pub fn new(timeout_ms: u64) -> Self {
        let suite = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let storage = TempDir::new().unwrap();
        AppConfig::set_suite_root(suite.path().to_string_lossy().to_string());
        AppConfig::set_work_root(work.path().to_string_lossy().to_string());
        AppConfig::set_storage_root(storage.path().to_string_lossy().to_string());
        AppConfig::set_grade_timeout_ms(timeout_ms);
        AppConfig::set_dotnet_path("");
        AppConfig::set_task_manifest("");
        Self {
            suite,
            work,
            storage,
        }
    }

    /// Install a shell script as the native suite binary.
    pub fn install_suite(&self, body: &str) {
        write_script(&self.suite.path().join("provquest-tests"), body);
    }
}

impl Drop for GraderSandbox {
    fn drop(&mut self) {
        AppConfig::reset();
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{ARG_PARSE}\n{body}\n")).unwrap();
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}
