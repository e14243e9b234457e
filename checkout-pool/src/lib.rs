//! A bounded pool of expensive resources, such as network connections,
//! shared between threads.
//!
//! [`BoundedPool`] creates resources on demand up to its capacity and blocks
//! callers, up to a timeout, once all of them are in use. [`Pool`] builds
//! on it with reentrant checkouts: nested checkouts on one thread share a
//! single resource rather than waiting on themselves.
//!
//! ```
//! use checkout_pool::PoolConfig;
//!
//! let pool = PoolConfig::<Vec<u8>, ()>::new(|| Ok(Vec::new()))
//!     .capacity(2)
//!     .build()
//!     .unwrap();
//! let len = pool.with(|buf| buf.len()).unwrap();
//! assert_eq!(len, 0);
//! ```

mod pool;
pub use self::pool::{
    timeout_from_secs, AcquireError, BoundedPool, ConfigError, ImbalanceError, Pool, PoolConfig,
    Wrapper, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CAPACITY,
};

mod resource;
pub use self::resource::Managed;
