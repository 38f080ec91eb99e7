//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub storage_root: String,
    pub host: String,
    pub port: u16,
    /// Directory holding the prebuilt grading suite (native binary and/or assembly).
    pub suite_root: String,
    /// Root for per-invocation working directories; empty means the system temp dir.
    pub work_root: String,
    /// Explicit host-runtime executable; empty means "search well-known locations".
    pub dotnet_path: String,
    /// Wall-clock ceiling for one grading run, in milliseconds.
    pub grade_timeout_ms: u64,
    /// Optional generated JSON task manifest overriding the builtin catalog.
    pub task_manifest: String,
    pub gemini_api_key: String,
    pub rephrase_cache_ttl_secs: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "provquest".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/provquest.db".into()),
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "data/storage".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            suite_root: env::var("SUITE_ROOT").unwrap_or_else(|_| "suite".into()),
            work_root: env::var("GRADER_WORK_ROOT").unwrap_or_default(),
            dotnet_path: env::var("DOTNET_PATH").unwrap_or_default(),
            grade_timeout_ms: env::var("GRADE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            task_manifest: env::var("TASK_MANIFEST").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            rephrase_cache_ttl_secs: env::var("REPHRASE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.storage_root = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_suite_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.suite_root = value.into());
    }

    pub fn set_work_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.work_root = value.into());
    }

    pub fn set_dotnet_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.dotnet_path = value.into());
    }

    pub fn set_grade_timeout_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.grade_timeout_ms = value);
    }

    pub fn set_task_manifest(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.task_manifest = value.into());
    }

    pub fn set_gemini_api_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.gemini_api_key = value.into());
    }

    pub fn set_rephrase_cache_ttl_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.rephrase_cache_ttl_secs = value);
    }
}

// --- Free accessors used across the workspace ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn storage_root() -> String {
    AppConfig::global().storage_root.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn suite_root() -> String {
    AppConfig::global().suite_root.clone()
}

pub fn work_root() -> String {
    AppConfig::global().work_root.clone()
}

pub fn dotnet_path() -> String {
    AppConfig::global().dotnet_path.clone()
}

pub fn grade_timeout_ms() -> u64 {
    AppConfig::global().grade_timeout_ms
}

pub fn task_manifest() -> String {
    AppConfig::global().task_manifest.clone()
}

pub fn gemini_api_key() -> String {
    AppConfig::global().gemini_api_key.clone()
}

pub fn rephrase_cache_ttl_secs() -> u64 {
    AppConfig::global().rephrase_cache_ttl_secs
}
