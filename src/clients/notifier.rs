use console_framework::{NoticeKind, Notifier};
use tracing::{error, info, warn};

/// Writes notifications to the log instead of a toast.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success | NoticeKind::Info => info!(?kind, "{message}"),
            NoticeKind::Warning => warn!(?kind, "{message}"),
            NoticeKind::Error => error!(?kind, "{message}"),
        }
    }
}
