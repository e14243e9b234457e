use std::thread::ThreadId;
use std::time::Duration;

use thiserror::Error;

/// An error during resource acquisition.
#[derive(Debug, Error)]
pub enum AcquireError<E> {
    /// No resource became available within the requested wait budget
    #[error("timed out waiting for a resource ({elapsed:?} of {requested:?} elapsed)")]
    Timeout {
        /// The wait budget given to the acquire
        requested: Duration,
        /// The time actually spent before giving up
        elapsed: Duration,
    },
    /// The resource pool has been shut down
    #[error("the resource pool is shut down")]
    Shutdown,
    /// Wraps an error result from the pool's `create` callback
    #[error("resource error: {0}")]
    ResourceError(E),
}

impl<E> AcquireError<E> {
    /// Check if this error is the result of an acquire timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error is the result of acquiring from a shut down pool.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown)
    }
}

/// A configuration error, raised when building or resizing a pool.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Pool capacity must be a positive integer
    #[error("pool capacity must be positive")]
    ZeroCapacity,
    /// The default acquire timeout must be positive
    #[error("default acquire timeout must be positive")]
    ZeroTimeout,
    /// A timeout given in seconds was negative or not finite
    #[error("invalid timeout: {0} seconds")]
    InvalidTimeout(f64),
}

/// Raised by `checkin` when the calling thread holds no checked-out resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("checkin without a matching checkout on thread {thread:?}")]
pub struct ImbalanceError {
    pub(crate) thread: ThreadId,
}

impl ImbalanceError {
    /// The thread which attempted the unbalanced checkin.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }
}
