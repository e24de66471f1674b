use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Opens a URL for the user. Best-effort: failures are logged, never returned.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str);
}

/// Host OS family, which decides how the default browser is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    MacOs,
    Windows,
    /// Linux and the BSDs, anything with `xdg-open`.
    Unix,
}

impl HostPlatform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Unix,
        }
    }

    /// Command that hands `url` to the default browser.
    pub fn command(self, url: &str) -> Command {
        let mut cmd = match self {
            Self::MacOs => Command::new("open"),
            Self::Windows => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/c", "start"]);
                cmd
            },
            Self::Unix => Command::new("xdg-open"),
        };
        cmd.arg(url);
        cmd
    }
}

/// Launches the host's default browser.
#[derive(Debug, Clone, Copy)]
pub struct SystemBrowser {
    platform: HostPlatform,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self {
            platform: HostPlatform::detect(),
        }
    }

    pub fn for_platform(platform: HostPlatform) -> Self {
        Self { platform }
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) {
        let mut cmd = self.platform.command(url);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.spawn() {
            Ok(mut child) => {
                debug!(platform = ?self.platform, url, "browser launched");
                // Reap the launcher so it does not linger as a zombie.
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            },
            Err(e) => {
                warn!(platform = ?self.platform, error = %e, "could not open browser");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    fn argv(cmd: &Command) -> Vec<&OsStr> {
        std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .collect()
    }

    #[test]
    fn detects_platform_from_os_name() {
        assert_eq!(HostPlatform::from_os("macos"), HostPlatform::MacOs);
        assert_eq!(HostPlatform::from_os("windows"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_os("linux"), HostPlatform::Unix);
        assert_eq!(HostPlatform::from_os("freebsd"), HostPlatform::Unix);
    }

    #[test]
    fn builds_platform_commands() {
        let url = "http://127.0.0.1:4242";
        assert_eq!(argv(&HostPlatform::MacOs.command(url)), ["open", url]);
        assert_eq!(argv(&HostPlatform::Windows.command(url)), [
            "cmd", "/c", "start", url
        ]);
        assert_eq!(argv(&HostPlatform::Unix.command(url)), ["xdg-open", url]);
    }
}
