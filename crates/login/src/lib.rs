//! Credential acquisition for credport.
//!
//! A [`LoginOrchestrator`] picks one [`LoginStrategy`], obtains a
//! [`CredentialRecord`] from an [`Authenticator`] (driving the loopback
//! [`ImportServer`] for the interactive import), and hands the record to a
//! [`CredentialStore`].

pub mod authenticator;
pub mod browser;
pub mod error;
pub mod import_server;
pub mod notify;
pub mod orchestrator;
pub mod store;
pub mod strategy;
pub mod types;

pub use {
    authenticator::{Authenticator, KiroAuthenticator},
    browser::{BrowserLauncher, HostPlatform, SystemBrowser},
    import_server::{ImportServer, KIRO_IMPORT_PAGE},
    notify::{ConsoleNotifier, Notifier},
    orchestrator::{LoginOrchestrator, LoginOutcome},
    store::{CredentialStore, FileCredentialStore},
    strategy::LoginStrategy,
    types::{CredentialRecord, KiroToken, LoginOptions},
};

pub use error::{Error, Result};
