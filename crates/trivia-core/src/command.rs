//! Command envelope shared by quiz session operations.

use uuid::Uuid;

/// Trait implemented by every state-changing request against a quiz session.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in log lines (e.g. `quiz.submit_answer`).
    fn command_type(&self) -> &'static str;

    /// Correlation ID tying together the log lines of one request.
    fn correlation_id(&self) -> Uuid;

    /// Name of the participant the command concerns, if any.
    fn subject(&self) -> Option<&str> {
        None
    }
}
