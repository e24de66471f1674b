use std::path::PathBuf;

use {credport_config::CredportConfig, tracing::info};

use crate::{Result, types::CredentialRecord};

/// Persists credential records.
pub trait CredentialStore: Send + Sync {
    /// Save `record` and return where it was written.
    fn save(&self, record: &CredentialRecord, config: &CredportConfig) -> Result<PathBuf>;
}

/// One pretty-printed JSON file per credential under the auth directory.
#[derive(Debug, Clone, Default)]
pub struct FileCredentialStore {
    dir: Option<PathBuf>,
}

impl FileCredentialStore {
    /// Store under `config.auth_dir()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store under a fixed directory, ignoring the config (useful for testing).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    fn file_name(record: &CredentialRecord) -> String {
        let suffix = record
            .label
            .as_deref()
            .map(slug)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
                    .to_string()
            });
        format!("{}-{suffix}.json", slug(&record.provider))
    }
}

/// Lowercase, keeping `[a-z0-9._-]` and collapsing everything else to `-`.
fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, record: &CredentialRecord, config: &CredportConfig) -> Result<PathBuf> {
        let dir = self.dir.clone().unwrap_or_else(|| config.auth_dir());
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(Self::file_name(record));
        let data = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %path.display(), provider = %record.provider, "credential saved");
        Ok(path)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::KiroToken;

    fn record(json: &str) -> CredentialRecord {
        CredentialRecord::kiro(serde_json::from_str::<KiroToken>(json).unwrap())
    }

    #[test]
    fn saves_under_label_slug() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::with_dir(dir.path().to_path_buf());
        let path = store
            .save(
                &record(r#"{"accessToken":"x","email":"Dev User@Example.com"}"#),
                &CredportConfig::default(),
            )
            .unwrap();

        assert_eq!(path, dir.path().join("kiro-dev-user-example.com.json"));
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["type"], "kiro");
        assert_eq!(saved["accessToken"], "x");
    }

    #[test]
    fn unlabelled_record_gets_timestamp_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::with_dir(dir.path().to_path_buf());
        let path = store
            .save(&record(r#"{"refreshToken":"r"}"#), &CredportConfig::default())
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("kiro-"));
        assert!(name.trim_start_matches("kiro-").trim_end_matches(".json").parse::<u64>().is_ok());
    }

    #[test]
    fn default_store_uses_config_auth_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CredportConfig::default();
        config.auth.dir = Some(dir.path().join("nested").join("auth"));

        let path = FileCredentialStore::new()
            .save(&record(r#"{"accessToken":"x","provider":"Google"}"#), &config)
            .unwrap();
        assert_eq!(path, dir.path().join("nested/auth/kiro-google.json"));
    }

    #[test]
    fn unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let store = FileCredentialStore::with_dir(blocker.join("auth"));
        assert!(
            store
                .save(&record(r#"{"accessToken":"x"}"#), &CredportConfig::default())
                .is_err()
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::with_dir(dir.path().to_path_buf());
        let path = store
            .save(&record(r#"{"accessToken":"x"}"#), &CredportConfig::default())
            .unwrap();
        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("  a@@b  c "), "a-b-c");
        assert_eq!(slug("@@"), "");
    }
}
