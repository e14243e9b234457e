mod borrow;

mod bounded;
pub use bounded::BoundedPool;

mod config;
pub use config::{timeout_from_secs, PoolConfig, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CAPACITY};

mod error;
pub use error::{AcquireError, ConfigError, ImbalanceError};

mod pool;
pub use pool::Pool;

mod wrap;
pub use wrap::Wrapper;
