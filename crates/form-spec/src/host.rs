use serde::{Deserialize, Serialize};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Side-effect capabilities supplied by the embedding UI.
pub trait Host {
    /// Asks the user to confirm `prompt`.
    fn confirm(&mut self, prompt: &str) -> bool;
    /// Shows a transient message.
    fn notify(&mut self, message: &str, kind: NoticeKind);
}
