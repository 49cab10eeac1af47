//! User-facing notifications
//!
//! Repositories report outcomes through a `Notifier`; how the message reaches
//! the user (toast, terminal, log) is up to the front end.

use log::{error, info};

/// Sink for user-facing success and error messages
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that forwards to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
