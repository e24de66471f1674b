use std::{path::PathBuf, sync::Arc};

use {
    axum::body::Bytes,
    credport_config::CredportConfig,
    tracing::{error, info},
};

use crate::{
    Error, Result,
    authenticator::Authenticator,
    browser::{BrowserLauncher, SystemBrowser},
    import_server::ImportServer,
    notify::{ConsoleNotifier, Notifier},
    store::CredentialStore,
    strategy::LoginStrategy,
    types::{CredentialRecord, LoginOptions},
};

/// What a successful login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub storage_path: PathBuf,
    pub label: Option<String>,
}

/// Runs one login strategy end to end: acquire, persist, report.
///
/// Holds no per-login state, so one instance can serve concurrent calls.
pub struct LoginOrchestrator {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn CredentialStore>,
    browser: Arc<dyn BrowserLauncher>,
    notifier: Arc<dyn Notifier>,
}

impl LoginOrchestrator {
    /// Uses the system browser and prints progress to stdout.
    pub fn new(authenticator: Arc<dyn Authenticator>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            authenticator,
            store,
            browser: Arc::new(SystemBrowser::new()),
            notifier: Arc::new(ConsoleNotifier),
        }
    }

    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Obtain a credential with `strategy` and persist it.
    ///
    /// Nothing is saved unless the authenticator succeeds, and a record the
    /// store rejects is dropped rather than kept for a retry.
    pub async fn run(
        &self,
        strategy: LoginStrategy,
        config: &CredportConfig,
        options: &LoginOptions,
    ) -> Result<LoginOutcome> {
        info!(%strategy, no_browser = options.no_browser, "starting login");

        let record = match self.acquire(strategy, config, options).await {
            Ok(record) => record,
            Err(e) => {
                error!(%strategy, error = %e, "login failed");
                if matches!(e, Error::Authentication { .. }) {
                    self.troubleshoot(strategy);
                }
                return Err(e);
            },
        };

        let storage_path = match self.persist(&record, config) {
            Ok(path) => path,
            Err(e) => {
                error!(%strategy, error = %e, "failed to save auth");
                return Err(e);
            },
        };

        let label = record.label.filter(|l| !l.is_empty());
        self.notifier.notify(&format!(
            "Authentication saved to {}",
            storage_path.display()
        ));
        if let Some(label) = &label {
            let verb = if strategy.is_import() {
                "Imported"
            } else {
                "Authenticated"
            };
            self.notifier.notify(&format!("{verb} as {label}"));
        }
        self.notifier.notify(strategy.success_message());
        info!(%strategy, path = %storage_path.display(), "login complete");

        Ok(LoginOutcome {
            storage_path,
            label,
        })
    }

    async fn acquire(
        &self,
        strategy: LoginStrategy,
        config: &CredportConfig,
        options: &LoginOptions,
    ) -> Result<CredentialRecord> {
        let auth = &self.authenticator;
        let result = match strategy {
            LoginStrategy::BrowserOAuth => auth.login_with_google(config, options).await,
            LoginStrategy::DeviceCodeOAuth => auth.login(config, options).await,
            LoginStrategy::AuthCodeOAuth => auth.login_with_auth_code(config, options).await,
            LoginStrategy::FileImport => auth.import_from_kiro_ide(config).await,
            LoginStrategy::InteractiveJsonImport => {
                // Capture failures are not authenticator failures; surface them as-is.
                let payload = self.capture_json(config, options).await?;
                auth.import_from_json(config, &payload).await
            },
        };
        result.map_err(|source| Error::authentication(strategy, source))
    }

    async fn capture_json(&self, config: &CredportConfig, options: &LoginOptions) -> Result<Bytes> {
        let server = ImportServer::bind().await?;
        let url = server.url();

        if options.no_browser {
            self.notifier
                .notify(&format!("Open this URL in your browser: {url}"));
        } else {
            self.notifier.notify(&format!("Opening browser: {url}"));
            self.browser.open(&url);
        }
        self.notifier
            .notify("Please paste your JSON in the browser and click Submit.");

        server.capture(config.import_timeout()).await
    }

    fn persist(&self, record: &CredentialRecord, config: &CredportConfig) -> Result<PathBuf> {
        let path = self.store.save(record, config).map_err(Error::persistence)?;
        if path.as_os_str().is_empty() {
            return Err(Error::persistence(Error::message(
                "credential store returned an empty path",
            )));
        }
        Ok(path)
    }

    fn troubleshoot(&self, strategy: LoginStrategy) {
        self.notifier.notify("");
        self.notifier.notify("Troubleshooting:");
        for (i, hint) in strategy.troubleshooting().iter().enumerate() {
            self.notifier.notify(&format!("{}. {hint}", i + 1));
        }
    }
}
