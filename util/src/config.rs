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
    pub exchange_root: String,
    pub course_root: String,
    pub course_id: String,
    pub notebooks_root: String,
    pub gradebook_path: String,
    pub webhook_url: String,
    pub webhook_secret: String,
    pub docker_host: String,
    pub host: String,
    pub port: u16,
    pub max_concurrent_gradings: usize,
    pub watch_poll_seconds: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every option has a documented default, so a bare environment still
    /// yields a usable configuration.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "grading-service".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "grading.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            exchange_root: env::var("EXCHANGE_ROOT")
                .unwrap_or_else(|_| "/srv/nbgrader/exchange".into()),
            course_root: env::var("COURSE_ROOT").unwrap_or_else(|_| "/srv/nbgrader/course".into()),
            course_id: env::var("COURSE_ID").unwrap_or_else(|_| "ujaiclub".into()),
            notebooks_root: env::var("NOTEBOOKS_ROOT").unwrap_or_else(|_| "/srv/notebooks".into()),
            gradebook_path: env::var("GRADEBOOK_PATH").unwrap_or_else(|_| "/data/nbgrader.db".into()),
            webhook_url: env::var("GRADING_WEBHOOK_URL")
                .unwrap_or_else(|_| "http://backend:8000/webhooks/nbgrader/grade".into()),
            webhook_secret: env::var("NBGRADER_WEBHOOK_SECRET").unwrap_or_default(),
            docker_host: env::var("DOCKER_HOST")
                .unwrap_or_else(|_| "unix:///var/run/docker.sock".into()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("GRADING_SERVICE_PORT")
                .unwrap_or_else(|_| "9100".into())
                .parse()
                .unwrap_or(9100),
            max_concurrent_gradings: env::var("MAX_CONCURRENT_GRADINGS")
                .unwrap_or_else(|_| "4".into())
                .parse()
                .unwrap_or(4),
            watch_poll_seconds: env::var("WATCH_POLL_SECONDS")
                .unwrap_or_else(|_| "2".into())
                .parse()
                .unwrap_or(2),
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
    ///
    /// Used by public per-field setter methods.
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

    pub fn set_exchange_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.exchange_root = value.into());
    }

    pub fn set_course_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.course_root = value.into());
    }

    pub fn set_course_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.course_id = value.into());
    }

    pub fn set_notebooks_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.notebooks_root = value.into());
    }

    pub fn set_gradebook_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.gradebook_path = value.into());
    }

    pub fn set_webhook_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.webhook_url = value.into());
    }

    pub fn set_webhook_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.webhook_secret = value.into());
    }

    pub fn set_docker_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.docker_host = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_max_concurrent_gradings(value: usize) {
        AppConfig::set_field(|cfg| cfg.max_concurrent_gradings = value);
    }

    pub fn set_watch_poll_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.watch_poll_seconds = value);
    }
}
