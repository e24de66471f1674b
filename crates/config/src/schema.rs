/// Config schema types (credential storage, Kiro login settings).
use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Interactive import deadline when nothing is configured.
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 5 * 60;

/// Kiro IDE token cache, relative to the home directory.
const KIRO_IDE_TOKEN_RELATIVE: &str = ".aws/sso/cache/kiro-auth-token.json";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredportConfig {
    pub auth: AuthConfig,
    pub kiro: KiroConfig,
}

/// Where credential records are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Directory holding one JSON file per saved credential.
    /// Filled in by the loader when left unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KiroConfig {
    /// Token cache written by the Kiro IDE, read by `credport kiro import`.
    pub ide_token_path: Option<PathBuf>,
    /// Seconds the interactive import page waits for a submission.
    pub import_timeout_secs: u64,
}

impl Default for KiroConfig {
    fn default() -> Self {
        Self {
            ide_token_path: None,
            import_timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
        }
    }
}

impl CredportConfig {
    /// Resolved credential directory. Falls back to `<config dir>/auth`.
    pub fn auth_dir(&self) -> PathBuf {
        self.auth.dir.clone().unwrap_or_else(|| {
            crate::loader::config_dir()
                .unwrap_or_else(|| PathBuf::from(".config/credport"))
                .join("auth")
        })
    }

    /// Resolved Kiro IDE token path. Falls back to `~/.aws/sso/cache/...`.
    pub fn kiro_ide_token_path(&self) -> PathBuf {
        self.kiro.ide_token_path.clone().unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map(|d| d.home_dir().join(KIRO_IDE_TOKEN_RELATIVE))
                .unwrap_or_else(|| PathBuf::from(KIRO_IDE_TOKEN_RELATIVE))
        })
    }

    /// Interactive import deadline. A zero value means the default.
    pub fn import_timeout(&self) -> Duration {
        match self.kiro.import_timeout_secs {
            0 => Duration::from_secs(DEFAULT_IMPORT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}
