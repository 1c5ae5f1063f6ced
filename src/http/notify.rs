//! User-visible notifications raised by the HTTP client.

/// Shows a short message to the user (a toast in a UI, stderr in the CLI).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Reports notifications through `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(text = message, "user notification");
    }
}
