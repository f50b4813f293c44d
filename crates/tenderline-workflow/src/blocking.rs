//! Run synchronous collaborators off the async executor

use crate::error::WorkflowError;

/// Run `f` on the blocking pool
///
/// A panicked or cancelled task surfaces as [`WorkflowError::Storage`].
pub(crate) async fn run_blocking<T, F>(what: &'static str, f: F) -> Result<T, WorkflowError>
where
    F: FnOnce() -> Result<T, WorkflowError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WorkflowError::Storage(format!("{} task failed: {}", what, e)))?
}
