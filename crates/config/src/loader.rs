use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::CredportConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "credport.toml",
    "credport.yaml",
    "credport.yml",
    "credport.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CredportConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply env overrides.
///
/// Search order:
/// 1. `./credport.{toml,yaml,yml,json}` (project-local)
/// 2. `<config dir>/credport.{toml,yaml,yml,json}` where the config dir is
///    `config_dir_override` or `~/.config/credport/`
///
/// Falls back to `CredportConfig::default()` when no file is found or the
/// file cannot be parsed.
pub fn discover_and_load(config_dir_override: Option<&Path>) -> CredportConfig {
    let dir = resolve_config_dir(config_dir_override);

    let mut config = match find_config_file(dir.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                CredportConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            CredportConfig::default()
        },
    };

    if config.auth.dir.is_none()
        && let Some(dir) = &dir
    {
        config.auth.dir = Some(dir.join("auth"));
    }

    apply_env_overrides(config)
}

/// Returns the user-global config directory (`~/.config/credport/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "credport").map(|d| d.config_dir().to_path_buf())
}

/// An explicit directory wins over the user-global one.
pub fn resolve_config_dir(config_dir_override: Option<&Path>) -> Option<PathBuf> {
    config_dir_override.map(Path::to_path_buf).or_else(config_dir)
}

/// Apply `CREDPORT_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: CredportConfig) -> CredportConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: CredportConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> CredportConfig {
    if let Some(dir) = lookup("CREDPORT_AUTH_DIR").filter(|v| !v.is_empty()) {
        config.auth.dir = Some(PathBuf::from(dir));
    }
    if let Some(path) = lookup("CREDPORT_KIRO_IDE_TOKEN_PATH").filter(|v| !v.is_empty()) {
        config.kiro.ide_token_path = Some(PathBuf::from(path));
    }
    if let Some(raw) = lookup("CREDPORT_IMPORT_TIMEOUT_SECS") {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.kiro.import_timeout_secs = secs,
            Err(e) => {
                warn!(value = %raw, error = %e, "ignoring invalid CREDPORT_IMPORT_TIMEOUT_SECS");
            },
        }
    }
    config
}

/// Find the first config file in standard locations.
fn find_config_file(config_dir: Option<&Path>) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .chain(
            config_dir
                .into_iter()
                .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name))),
        )
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CredportConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
