//! Layered configuration for Leafcast.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. `{CONFIG_DIR}/default.*`
//! 2. `{CONFIG_DIR}/{RUN_ENV}.*`
//! 3. environment variables such as `LEAFCAST__DATABASE__URL`
//!
//! A `.env` file is loaded once before the environment is read.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the application configuration from the default locations.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env_vars::get_config_dir();
    let run_env = env_vars::get_run_env();
    let prefix = env_vars::get_config_prefix();

    load_config_from(Path::new(&config_dir), &run_env, &prefix)
}

/// Loads the application configuration from an explicit directory, run
/// environment and environment variable prefix.
pub fn load_config_from(
    config_dir: &Path,
    run_env: &str,
    prefix: &str,
) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    debug!(
        "Loading config: default={}, env={}, prefix={}",
        default_path.display(),
        env_path.display(),
        prefix
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(prefix)
                .prefix_separator(env_vars::CONFIG_SEPARATOR)
                .separator(env_vars::CONFIG_SEPARATOR),
        );

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `.env` unless `DOTENV_OVERRIDE` names another one. Loading
/// happens at most once per process; a missing file is not an error.
///
/// # Returns
///
/// The path of the dotenv file that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path =
        std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_files_yield_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path(), "debug", "LEAFCAST_TEST_EMPTY").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_run_env_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[database]\nurl = \"sqlite://default.db\"\nmax_connections = 2\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("debug.toml"),
            "[database]\nurl = \"sqlite://debug.db\"\n",
        )
        .unwrap();

        let config = load_config_from(dir.path(), "debug", "LEAFCAST_TEST_LAYERS").unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "sqlite://debug.db");
        assert_eq!(database.max_connections, 2);
        assert_eq!(database.acquire_timeout_secs, 3);
        assert_eq!(config.logging.unwrap().level, "warn");
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[database]\nurl = \"sqlite://default.db\"\n",
        )
        .unwrap();
        std::env::set_var("LEAFCAST_TEST_ENV__DATABASE__URL", "sqlite::memory:");

        let config = load_config_from(dir.path(), "debug", "LEAFCAST_TEST_ENV").unwrap();
        assert_eq!(config.database.unwrap().url, "sqlite::memory:");
    }
}
