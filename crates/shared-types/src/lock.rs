//! # Queue Lock
//!
//! The single mutual-exclusion lock guarding queue, submitter-log and
//! tracked-transaction mutation. Acquisition is bounded; a timeout surfaces as
//! [`RegistrarError::LockTimeout`] and implies no partial effect.

use crate::errors::{RegistrarError, RegistrarResult};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Default bounded wait for the queue lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

pub struct QueueLock {
    inner: Mutex<()>,
    timeout: Duration,
}

/// Proof that the queue lock is held. Released on drop.
pub struct QueueGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl QueueLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait up to the configured timeout for the lock.
    pub async fn acquire(&self) -> RegistrarResult<QueueGuard<'_>> {
        match tokio::time::timeout(self.timeout, self.inner.lock()).await {
            Ok(guard) => Ok(QueueGuard { _guard: guard }),
            Err(_) => {
                let waited_ms = self.timeout.as_millis() as u64;
                warn!(waited_ms, "Queue lock acquisition timed out");
                Err(RegistrarError::LockTimeout { waited_ms })
            }
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

impl Default for QueueLock {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}
