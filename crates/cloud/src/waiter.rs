//! Asynchronous operation polling.
//!
//! Mutations against the control plane return an [`Operation`] handle
//! that settles out-of-band. The waiter polls it by scope until it
//! reaches `DONE`, then inspects the error payload. The same loop
//! serves zonal, regional and global operations.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::providers::gcp::models::Operation;
use crate::providers::{ComputeApi, OperationScope, ProvisionError};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls in-flight operations to a terminal state.
#[derive(Debug, Clone)]
pub struct OperationWaiter {
    /// Interval between status polls.
    poll_interval: Duration,
    /// Optional wall-clock deadline. Remote operations have unbounded
    /// latency; without a deadline a stuck operation polls forever.
    timeout: Option<Duration>,
}

impl Default for OperationWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl OperationWaiter {
    /// Create a waiter with the given poll interval and no deadline.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            timeout: None,
        }
    }

    /// Set a deadline for the whole wait.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Poll `operation` at `scope` until it reaches `DONE`.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Operation`] with the provider's payload
    /// if the operation terminates with an error field set,
    /// [`ProvisionError::Timeout`] if the deadline elapses first, or any
    /// transport error from a status poll.
    pub async fn wait<C: ComputeApi + ?Sized>(
        &self,
        api: &C,
        scope: &OperationScope,
        operation: &Operation,
    ) -> Result<(), ProvisionError> {
        info!(operation = %operation.name, scope = %scope, "Waiting for operation to finish");

        let start = Instant::now();

        loop {
            let current = api.get_operation(scope, &operation.name).await?;

            debug!(
                operation = %current.name,
                status = %current.status,
                elapsed_secs = start.elapsed().as_secs(),
                "Polling operation status"
            );

            if current.is_done() {
                if let Some(error) = current.error {
                    return Err(ProvisionError::Operation {
                        name: current.name,
                        error,
                    });
                }
                info!(operation = %current.name, "Operation finished");
                return Ok(());
            }

            if let Some(timeout) = self.timeout {
                if start.elapsed() >= timeout {
                    return Err(ProvisionError::Timeout(timeout.as_secs()));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
