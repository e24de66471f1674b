/// Receives the human-readable progress and troubleshooting lines of a login.
pub trait Notifier: Send + Sync {
    fn notify(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, line: &str) {
        println!("{line}");
    }
}
