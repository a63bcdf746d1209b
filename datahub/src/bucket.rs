//! Target bucket setup

use datahub_storage::{ObjectStore, StorageError};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Makes sure the configured bucket exists before data is served.
///
/// Success is remembered for the life of the process. Failure is not, so the
/// next call checks again.
pub struct BucketInitializer {
    store: Arc<dyn ObjectStore>,
    name: String,
    ready: OnceCell<()>,
}

impl BucketInitializer {
    pub fn new(store: Arc<dyn ObjectStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            ready: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Check the bucket and create it when the check fails.
    ///
    /// Concurrent callers share one in-flight attempt.
    pub async fn ensure(&self) -> Result<(), StorageError> {
        self.ready
            .get_or_try_init(|| async {
                if self.store.head_bucket(&self.name).await.is_ok() {
                    return Ok(());
                }

                match self.store.create_bucket(&self.name).await {
                    Ok(()) => {
                        info!(bucket = %self.name, "Created bucket");
                        Ok(())
                    }
                    Err(StorageError::BucketAlreadyOwned(_)) => Ok(()),
                    Err(e) => Err(e),
                }
            })
            .await
            .map(|_| ())
    }

    /// Like [`ensure`](Self::ensure), but failure is only logged.
    pub async fn ensure_best_effort(&self) {
        if let Err(e) = self.ensure().await {
            warn!(bucket = %self.name, error = %e, "Could not ensure bucket exists");
        }
    }
}
