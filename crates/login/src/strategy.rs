use std::fmt;

/// The five ways credport can obtain a Kiro credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStrategy {
    /// Google OAuth through the `kiro://` protocol handler.
    BrowserOAuth,
    /// AWS Builder ID device-code flow.
    DeviceCodeOAuth,
    /// AWS Builder ID authorization-code flow with a redirect callback.
    AuthCodeOAuth,
    /// Reuse the token cached by the Kiro IDE.
    FileImport,
    /// Paste token JSON into a local web form.
    InteractiveJsonImport,
}

impl LoginStrategy {
    pub const ALL: [Self; 5] = [
        Self::BrowserOAuth,
        Self::DeviceCodeOAuth,
        Self::AuthCodeOAuth,
        Self::FileImport,
        Self::InteractiveJsonImport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BrowserOAuth => "Kiro Google",
            Self::DeviceCodeOAuth => "Kiro AWS",
            Self::AuthCodeOAuth => "Kiro AWS (auth code)",
            Self::FileImport => "Kiro token import",
            Self::InteractiveJsonImport => "Kiro JSON import",
        }
    }

    /// Whether the credential comes from an existing token rather than a
    /// fresh login. Only affects how the label is reported.
    pub fn is_import(self) -> bool {
        matches!(self, Self::FileImport | Self::InteractiveJsonImport)
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::BrowserOAuth => "Kiro Google authentication successful!",
            Self::DeviceCodeOAuth | Self::AuthCodeOAuth => "Kiro AWS authentication successful!",
            Self::FileImport => "Kiro token import successful!",
            Self::InteractiveJsonImport => "Kiro JSON import successful!",
        }
    }

    /// Numbered hints shown after the authenticator fails.
    pub fn troubleshooting(self) -> &'static [&'static str] {
        match self {
            Self::BrowserOAuth => &[
                "Make sure the protocol handler is installed",
                "Complete the Google login in the browser",
                "If callback fails, try: credport kiro import (after logging in via Kiro IDE)",
            ],
            Self::DeviceCodeOAuth => &[
                "Make sure you have an AWS Builder ID",
                "Complete the authorization in the browser",
                "If callback fails, try: credport kiro import (after logging in via Kiro IDE)",
            ],
            Self::AuthCodeOAuth => &[
                "Make sure you have an AWS Builder ID",
                "Complete the authorization in the browser",
                "If callback fails, try: credport kiro aws (device code flow)",
            ],
            Self::FileImport => &[
                "Open Kiro IDE",
                "Click 'Sign in with Google' (or GitHub)",
                "Complete the login process",
                "Run this command again",
            ],
            Self::InteractiveJsonImport => &[
                "Paste the complete token JSON exported from Kiro",
                "The JSON needs an accessToken or a refreshToken",
                "If the token came from Kiro IDE, try: credport kiro import",
            ],
        }
    }
}

impl fmt::Display for LoginStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
