use {
    async_trait::async_trait,
    credport_config::CredportConfig,
    tracing::{debug, info},
};

use crate::{
    Error, Result,
    types::{CredentialRecord, KiroToken, LoginOptions},
};

/// Performs the actual credential exchange for each login strategy.
///
/// Implementations own the protocol details; the orchestrator only routes
/// to the matching entry point and forwards the resulting record.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Google OAuth via the browser and a protocol-handler callback.
    async fn login_with_google(
        &self,
        config: &CredportConfig,
        options: &LoginOptions,
    ) -> Result<CredentialRecord>;

    /// AWS Builder ID device-code flow.
    async fn login(
        &self,
        config: &CredportConfig,
        options: &LoginOptions,
    ) -> Result<CredentialRecord>;

    /// AWS Builder ID authorization-code flow.
    async fn login_with_auth_code(
        &self,
        config: &CredportConfig,
        options: &LoginOptions,
    ) -> Result<CredentialRecord>;

    /// Import the token the Kiro IDE cached on disk.
    async fn import_from_kiro_ide(&self, config: &CredportConfig) -> Result<CredentialRecord>;

    /// Import a token from raw JSON bytes.
    async fn import_from_json(
        &self,
        config: &CredportConfig,
        payload: &[u8],
    ) -> Result<CredentialRecord>;
}

/// Authenticator for tokens that already exist: the Kiro IDE cache and
/// pasted JSON. The OAuth flows are not wired into this build.
#[derive(Debug, Clone, Default)]
pub struct KiroAuthenticator;

impl KiroAuthenticator {
    pub fn new() -> Self {
        Self
    }

    fn oauth_unavailable(flow: &str) -> Error {
        Error::message(format!(
            "{flow} is not available in this build; log in with Kiro IDE and run \
             `credport kiro import`, or paste the token with `credport kiro import-json`"
        ))
    }
}

fn parse_token(payload: &[u8]) -> Result<KiroToken> {
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    if !value.is_object() {
        return Err(Error::message("token JSON must be an object"));
    }
    let token: KiroToken = serde_json::from_value(value)?;
    if !token.has_token_material() {
        return Err(Error::message(
            "token JSON has neither accessToken nor refreshToken",
        ));
    }
    Ok(token)
}

#[async_trait]
impl Authenticator for KiroAuthenticator {
    async fn login_with_google(
        &self,
        _config: &CredportConfig,
        _options: &LoginOptions,
    ) -> Result<CredentialRecord> {
        Err(Self::oauth_unavailable("Google OAuth"))
    }

    async fn login(
        &self,
        _config: &CredportConfig,
        _options: &LoginOptions,
    ) -> Result<CredentialRecord> {
        Err(Self::oauth_unavailable("AWS Builder ID device-code login"))
    }

    async fn login_with_auth_code(
        &self,
        _config: &CredportConfig,
        _options: &LoginOptions,
    ) -> Result<CredentialRecord> {
        Err(Self::oauth_unavailable("AWS Builder ID auth-code login"))
    }

    async fn import_from_kiro_ide(&self, config: &CredportConfig) -> Result<CredentialRecord> {
        let path = config.kiro_ide_token_path();
        debug!(path = %path.display(), "reading Kiro IDE token");
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::message(format!(
                    "Kiro IDE token not found at {}",
                    path.display()
                )));
            },
            Err(e) => return Err(e.into()),
        };
        let token = parse_token(&data)?;
        info!(path = %path.display(), "imported Kiro IDE token");
        Ok(CredentialRecord::kiro(token)
            .with_metadata("source", "kiro-ide")
            .with_metadata("source_path", path.display().to_string()))
    }

    async fn import_from_json(
        &self,
        _config: &CredportConfig,
        payload: &[u8],
    ) -> Result<CredentialRecord> {
        let token = parse_token(payload)?;
        info!(bytes = payload.len(), "imported Kiro token JSON");
        Ok(CredentialRecord::kiro(token).with_metadata("source", "json-import"))
    }
}
