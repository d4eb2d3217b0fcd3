//! Configuration storage.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_CONFIG, ENV_LOGIN, ENV_PASSWORD, ENV_TIMEOUT,
    ResolvedConfig,
};
pub use paths::AppPaths;
