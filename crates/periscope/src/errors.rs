use thiserror::Error;

/// Errors surfaced by the automation core.
///
/// Only two of these abort a request outright: [`ServiceUnavailable`] when the
/// accessibility connection is gone, and [`InvalidArgument`] which is rejected
/// before any provider call is made. Everything else is recoverable by the
/// caller (re-snapshot, re-target).
///
/// [`ServiceUnavailable`]: AutomationError::ServiceUnavailable
/// [`InvalidArgument`]: AutomationError::InvalidArgument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    /// The accessibility connection cannot be established or has died.
    /// Fatal for the current request, not for the process.
    #[error("Accessibility service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Resolution of an expired, unknown, or gone reference. The caller is
    /// expected to re-snapshot; the id will never resolve again in this
    /// generation.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// Lookup of a group id that was never created. An existing group with
    /// zero members is not an error.
    #[error("Window group not found: {0}")]
    GroupNotFound(String),

    /// No window matched a discovery query, or an unknown window id.
    #[error("Window not found: {0}")]
    WindowNotFound(String),

    /// Malformed input, rejected before any provider call is attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A fault reported by the accessibility service for a single node.
    /// Non-fatal during traversal: the affected subtree is skipped.
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// The operation was cancelled through the desktop's cancellation token.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl AutomationError {
    /// Whether a traversal hitting this error must abandon the whole walk
    /// (as opposed to skipping the current subtree and continuing).
    pub fn is_fatal_for_traversal(&self) -> bool {
        matches!(
            self,
            AutomationError::ServiceUnavailable(_) | AutomationError::Cancelled(_)
        )
    }
}
