//! Worker coordination for the single blocking provider connection.
//!
//! The accessibility connection is non-reentrant: concurrent calls into it are
//! unsafe. The gateway funnels every provider call through one mutex and runs
//! the blocking work on tokio's blocking pool, so request futures stay
//! responsive while they wait their turn.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task;
use tracing::debug;

use crate::errors::AutomationError;
use crate::provider::TreeProvider;

/// Serialized access to the blocking [`TreeProvider`].
///
/// Requests that arrive while a call is in progress queue in arrival order
/// (tokio's mutex hands the lock out fairly). The lock guard moves into the
/// blocking worker, so it is always the worker that releases it — a caller
/// that abandons its request (dropped future) cannot leave the lock held, and
/// the in-flight provider call simply runs to completion with its result
/// discarded.
#[derive(Clone)]
pub struct ProviderGateway {
    provider: Arc<dyn TreeProvider>,
    lock: Arc<Mutex<()>>,
}

impl ProviderGateway {
    pub fn new(provider: Arc<dyn TreeProvider>) -> Self {
        Self {
            provider,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run one unit of blocking provider work.
    ///
    /// The closure may issue as many provider calls as it needs; the lock is
    /// held for the whole unit, so a multi-call traversal observes a
    /// consistent, non-interleaved view of the connection.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AutomationError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TreeProvider) -> Result<T, AutomationError> + Send + 'static,
    {
        let guard = self.lock.clone().lock_owned().await;
        let provider = self.provider.clone();
        debug!("provider lock acquired, offloading blocking call");
        task::spawn_blocking(move || {
            let _guard = guard;
            op(provider.as_ref())
        })
        .await
        .map_err(|e| AutomationError::PlatformError(format!("Provider worker failed: {e}")))?
    }
}
