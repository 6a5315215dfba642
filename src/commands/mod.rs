pub mod attribution;
pub mod db;
pub mod decisions;
pub mod metrics;
pub mod settings;

use crate::error::EngineError;

/// Runs a read-compute-write unit on the blocking pool so store I/O never
/// stalls the async runtime.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?
}
