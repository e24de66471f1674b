use std::{collections::HashMap, sync::Arc};

use {
    anyhow::Result,
    clap::{Args, Subcommand},
    credport_config::CredportConfig,
    credport_login::{
        FileCredentialStore, KiroAuthenticator, LoginOptions, LoginOrchestrator, LoginStrategy,
    },
};

#[derive(Subcommand)]
pub enum KiroAction {
    /// Log in with Google OAuth (default Kiro login).
    Google(LoginArgs),
    /// Log in with an AWS Builder ID using the device code flow.
    Aws(LoginArgs),
    /// Log in with an AWS Builder ID using the authorization code flow.
    AwsAuthcode(LoginArgs),
    /// Import the token cached by Kiro IDE.
    Import(LoginArgs),
    /// Paste token JSON into a local web page.
    ImportJson(LoginArgs),
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Print URLs instead of opening a browser.
    #[arg(long)]
    no_browser: bool,
    /// Prompt hint for the OAuth logins; ignored by imports.
    #[arg(long, default_value = "")]
    prompt: String,
    /// OAuth login metadata, `key=value` (repeatable); ignored by imports.
    #[arg(long = "meta", value_parser = parse_key_val)]
    metadata: Vec<(String, String)>,
}

impl KiroAction {
    fn split(self) -> (LoginStrategy, LoginArgs) {
        match self {
            Self::Google(args) => (LoginStrategy::BrowserOAuth, args),
            Self::Aws(args) => (LoginStrategy::DeviceCodeOAuth, args),
            Self::AwsAuthcode(args) => (LoginStrategy::AuthCodeOAuth, args),
            Self::Import(args) => (LoginStrategy::FileImport, args),
            Self::ImportJson(args) => (LoginStrategy::InteractiveJsonImport, args),
        }
    }
}

impl From<LoginArgs> for LoginOptions {
    fn from(args: LoginArgs) -> Self {
        Self {
            no_browser: args.no_browser,
            prompt: args.prompt,
            metadata: args.metadata.into_iter().collect::<HashMap<_, _>>(),
        }
    }
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn handle_kiro(action: KiroAction, config: &CredportConfig) -> Result<()> {
    let (strategy, args) = action.split();
    let options = LoginOptions::from(args);

    let orchestrator = LoginOrchestrator::new(
        Arc::new(KiroAuthenticator::new()),
        Arc::new(FileCredentialStore::new()),
    );
    orchestrator.run(strategy, config, &options).await?;
    Ok(())
}
