//! Environment variable handling for the Leafcast configuration.
//!
//! Configuration values can be overridden through environment variables named
//! after their configuration path, e.g. `database.url` becomes
//! `LEAFCAST__DATABASE__URL`.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "LEAFCAST";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The default run environment, selecting `config/debug.*`
pub const DEFAULT_RUN_ENV: &str = "debug";

/// The default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Get the run environment (`RUN_ENV`), which selects the second configuration layer
pub fn get_run_env() -> String {
    env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_RUN_ENV.to_string())
}

/// Get the directory holding the configuration files (`CONFIG_DIR`)
pub fn get_config_dir() -> String {
    env::var("CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string())
}

