use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::error::AcquireError;
use super::pool::Pool;
use crate::resource::Managed;

/// A handle which forwards each call to a resource checked out for the
/// duration of that call only.
///
/// This stands in for a pooled resource where code expects to hold a single
/// shared connection:
///
/// ```
/// use checkout_pool::PoolConfig;
///
/// let conn = PoolConfig::<String, ()>::new(|| Ok("db".to_owned()))
///     .capacity(2)
///     .build()
///     .unwrap()
///     .wrap();
/// assert_eq!(conn.call(|c| c.len()).unwrap(), 2);
/// ```
pub struct Wrapper<T, E> {
    pool: Pool<T, E>,
}

impl<T, E> Wrapper<T, E> {
    pub fn new(pool: Pool<T, E>) -> Self {
        Self { pool }
    }

    /// Forward a single call to a checked-out resource. The resource is
    /// checked in whether the call returns or unwinds.
    pub fn call<F, R>(&self, f: F) -> Result<R, AcquireError<E>>
    where
        F: FnOnce(&T) -> R,
    {
        self.pool.with(f)
    }

    /// Hold one resource across several operations. Calls made through this
    /// wrapper reuse the same resource until the returned guard is dropped.
    pub fn with(&self) -> Result<Managed<'_, T, E>, AcquireError<E>> {
        self.pool.acquire()
    }

    /// Shut down the wrapped pool.
    pub fn pool_shutdown<F>(&self, hook: F) -> bool
    where
        F: Fn(Arc<T>) + Send + Sync + 'static,
    {
        self.pool.shutdown(hook)
    }

    pub fn pool(&self) -> &Pool<T, E> {
        &self.pool
    }

    pub fn into_pool(self) -> Pool<T, E> {
        self.pool
    }
}

impl<T, E> Clone for Wrapper<T, E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl<T, E> Debug for Wrapper<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wrapper").field(&self.pool).finish()
    }
}
