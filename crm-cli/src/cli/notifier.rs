//! Terminal notifications

use colored::*;

use crate::repository::Notifier;

/// Prints notifications to stderr so stdout stays machine-readable
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".bright_green(), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red(), message.red());
    }
}
