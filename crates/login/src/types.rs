use std::collections::HashMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Per-invocation login settings. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Print the URL instead of launching a browser.
    pub no_browser: bool,
    /// Prompt hint forwarded to the OAuth authenticators.
    pub prompt: String,
    pub metadata: HashMap<String, String>,
}

/// Kiro token material as exported by the Kiro IDE or pasted into the
/// import page.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KiroToken {
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<Secret<String>>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_secret: Option<Secret<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identity provider, e.g. `BuilderId`, `Google`, `Github`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_arn: Option<String>,
    /// RFC 3339 timestamp, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl KiroToken {
    /// A token is usable when it carries an access or a refresh token.
    pub fn has_token_material(&self) -> bool {
        let present = |s: &Option<Secret<String>>| {
            s.as_ref()
                .is_some_and(|s| !s.expose_secret().trim().is_empty())
        };
        present(&self.access_token) || present(&self.refresh_token)
    }
}

impl std::fmt::Debug for KiroToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KiroToken")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("region", &self.region)
            .field("email", &self.email)
            .field("provider", &self.provider)
            .field("auth_method", &self.auth_method)
            .field("profile_arn", &self.profile_arn)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a successful login, handed unchanged from the authenticator to
/// the credential store.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialRecord {
    #[serde(rename = "type")]
    pub provider: String,
    /// Human-readable account name, used for status output only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub token: KiroToken,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CredentialRecord {
    pub fn kiro(token: KiroToken) -> Self {
        let label = token
            .email
            .clone()
            .or_else(|| token.provider.clone())
            .filter(|l| !l.trim().is_empty());
        Self {
            provider: "kiro".into(),
            label,
            token,
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Serialize an `Option<Secret<String>>` by exposing its inner value.
/// Only for records that must round-trip through the credential file.
pub fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
