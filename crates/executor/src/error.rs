// Error types for the bounded executor

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for executor operations
pub type Result<T, E> = std::result::Result<T, ExecutorError<E>>;

/// Errors that can end a run
///
/// `E` is the task's own failure type. It is carried verbatim in
/// [`ExecutorError::TaskFailed`].
#[derive(Debug, Error)]
pub enum ExecutorError<E> {
    /// Configuration was rejected before any task was launched
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// A task rejected
    #[error("task {index} failed: {reason}")]
    TaskFailed { index: usize, reason: E },

    /// A task panicked instead of settling
    #[error("task {index} panicked: {message}")]
    TaskPanicked { index: usize, message: String },
}

impl<E> ExecutorError<E> {
    /// Create a task failure error
    pub fn task_failed(index: usize, reason: E) -> Self {
        ExecutorError::TaskFailed { index, reason }
    }

    /// Index of the task that ended the run, if a task did
    pub fn index(&self) -> Option<usize> {
        match self {
            ExecutorError::InvalidConfiguration(_) => None,
            ExecutorError::TaskFailed { index, .. } | ExecutorError::TaskPanicked { index, .. } => {
                Some(*index)
            }
        }
    }

    /// The task's rejection reason, if this is a task failure
    pub fn reason(&self) -> Option<&E> {
        match self {
            ExecutorError::TaskFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Take the task's rejection reason, if this is a task failure
    pub fn into_reason(self) -> Option<E> {
        match self {
            ExecutorError::TaskFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Check if this error came from configuration validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, ExecutorError::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_failed_accessors() {
        let err: ExecutorError<String> = ExecutorError::task_failed(2, "timeout".to_string());
        assert_eq!(err.index(), Some(2));
        assert_eq!(err.reason().map(String::as_str), Some("timeout"));
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "task 2 failed: timeout");
        assert_eq!(err.into_reason(), Some("timeout".to_string()));
    }

    #[test]
    fn test_configuration_error_has_no_index() {
        let err: ExecutorError<String> = ConfigError::InvalidMaxConcurrent(0).into();
        assert!(err.is_configuration());
        assert_eq!(err.index(), None);
        assert!(err.reason().is_none());
        assert_eq!(
            err.to_string(),
            "invalid configuration: max_concurrent must be a positive integer, got 0"
        );
    }

    #[test]
    fn test_panicked_error() {
        let err: ExecutorError<String> = ExecutorError::TaskPanicked {
            index: 4,
            message: "index out of bounds".to_string(),
        };
        assert_eq!(err.index(), Some(4));
        assert!(err.into_reason().is_none());
    }
}
