use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// User-facing notification sink.
///
/// Workflow and live-sync code report through this instead of touching any
/// presentation layer directly, so a desktop toast, a terminal, or a test
/// recorder can be plugged in.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

// Default sink: structured log records
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => {
                tracing::info!(%severity, title, message, "Notification")
            }
            Severity::Warning => tracing::warn!(%severity, title, message, "Notification"),
            Severity::Error => tracing::error!(%severity, title, message, "Notification"),
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        (**self).notify(title, message, severity)
    }
}
