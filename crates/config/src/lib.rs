//! Configuration loading and env substitution for credport.
//!
//! Config files: `credport.toml`, `credport.yaml`, or `credport.json`
//! Searched in `./` then `~/.config/credport/`.
//!
//! Supports `${ENV_VAR}` substitution in the raw file before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        apply_env_overrides, config_dir, discover_and_load, load_config, resolve_config_dir,
    },
    schema::{AuthConfig, CredportConfig, DEFAULT_IMPORT_TIMEOUT_SECS, KiroConfig},
};
