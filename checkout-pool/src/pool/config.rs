use std::sync::Arc;
use std::time::Duration;

use super::bounded::{BoundedPool, CreateFn, DisposeFn};
use super::error::ConfigError;
use super::pool::Pool;

/// The default number of resources held by a pool.
pub const DEFAULT_CAPACITY: usize = 5;

/// The default time to wait for a resource when none are available.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Convert a timeout in seconds to a `Duration`, rejecting negative,
/// non-finite and overflowing values.
pub fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
}

/// Builder for a resource pool of type `T`, whose `create` callback may fail
/// with an error of type `E`.
pub struct PoolConfig<T, E> {
    acquire_timeout: Result<Duration, ConfigError>,
    capacity: usize,
    create: CreateFn<T, E>,
    on_dispose: Option<DisposeFn<T>>,
}

impl<T, E> PoolConfig<T, E> {
    pub fn new<C>(create: C) -> Self
    where
        C: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            acquire_timeout: Ok(DEFAULT_ACQUIRE_TIMEOUT),
            capacity: DEFAULT_CAPACITY,
            create: Box::new(create),
            on_dispose: None,
        }
    }

    pub fn acquire_timeout(mut self, val: Duration) -> Self {
        self.acquire_timeout = Ok(val);
        self
    }

    pub fn acquire_timeout_secs(mut self, secs: f64) -> Self {
        self.acquire_timeout = timeout_from_secs(secs);
        self
    }

    pub fn capacity(mut self, val: usize) -> Self {
        self.capacity = val;
        self
    }

    /// Set a callback for resources discarded when the pool shrinks.
    pub fn dispose<F>(mut self, dispose: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.on_dispose.replace(Arc::new(dispose));
        self
    }

    fn validate(&self) -> Result<Duration, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        match self.acquire_timeout.clone()? {
            timeout if timeout == Duration::from_secs(0) => Err(ConfigError::ZeroTimeout),
            timeout => Ok(timeout),
        }
    }

    /// Build a reentrant [`Pool`] of `Arc<T>` resources.
    pub fn build(self) -> Result<Pool<T, E>, ConfigError>
    where
        T: Send + Sync + 'static,
        E: 'static,
    {
        let timeout = self.validate()?;
        let create = self.create;
        let on_dispose = self.on_dispose;
        let inner = BoundedPool::from_parts(
            self.capacity,
            Box::new(move || create().map(Arc::new)),
            on_dispose.map(|dispose| -> DisposeFn<Arc<T>> {
                Arc::new(move |res: Arc<T>| {
                    // a resource still shared with a caller is only dropped
                    if let Ok(res) = Arc::try_unwrap(res) {
                        dispose(res)
                    }
                })
            }),
        );
        Ok(Pool::new(inner, timeout))
    }

    /// Build a plain [`BoundedPool`], without per-thread reentrancy. The
    /// acquire timeout is validated but left to the caller of `pop`.
    pub fn build_bounded(self) -> Result<BoundedPool<T, E>, ConfigError> {
        self.validate()?;
        Ok(BoundedPool::from_parts(
            self.capacity,
            self.create,
            self.on_dispose,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PoolConfig<u32, ()> {
        PoolConfig::new(|| Ok(1))
    }

    #[test]
    fn timeout_secs() {
        assert_eq!(timeout_from_secs(0.5), Ok(Duration::from_millis(500)));
        assert_eq!(timeout_from_secs(0.0), Ok(Duration::from_secs(0)));
        assert_eq!(
            timeout_from_secs(-1.0),
            Err(ConfigError::InvalidTimeout(-1.0))
        );
        assert!(timeout_from_secs(f64::NAN).is_err());
        assert!(timeout_from_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn config_defaults() {
        let pool = config().build().unwrap();
        assert_eq!(pool.capacity(), DEFAULT_CAPACITY);
        assert_eq!(pool.default_timeout(), DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn config_invalid() {
        assert_eq!(
            config().capacity(0).build().unwrap_err(),
            ConfigError::ZeroCapacity
        );
        assert_eq!(
            config()
                .acquire_timeout(Duration::from_secs(0))
                .build()
                .unwrap_err(),
            ConfigError::ZeroTimeout
        );
        assert_eq!(
            config().acquire_timeout_secs(-2.5).build().unwrap_err(),
            ConfigError::InvalidTimeout(-2.5)
        );
        assert!(config().capacity(0).build_bounded().is_err());
    }
}
