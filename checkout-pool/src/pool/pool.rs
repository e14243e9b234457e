use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use super::borrow::Borrows;
use super::bounded::BoundedPool;
use super::error::{AcquireError, ConfigError, ImbalanceError};
use super::wrap::Wrapper;
use crate::resource::Managed;

pub(crate) struct PoolInternal<T, E> {
    borrows: Borrows<T>,
    bounded: BoundedPool<Arc<T>, E>,
    default_timeout: Duration,
}

/// A resource pool instance which lends resources of type `T` to threads.
///
/// Checkouts are reentrant: while a thread holds a resource, further
/// checkouts on the same thread return the identical instance without
/// touching the underlying [`BoundedPool`], and the resource is only
/// returned once every checkout has been matched by a checkin.
///
/// Cloning a `Pool` produces another handle to the same resources.
pub struct Pool<T, E> {
    pub(crate) inner: Arc<PoolInternal<T, E>>,
}

impl<T, E> Pool<T, E> {
    pub(crate) fn new(bounded: BoundedPool<Arc<T>, E>, default_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(PoolInternal {
                borrows: Borrows::new(),
                bounded,
                default_timeout,
            }),
        }
    }

    /// Check out a resource, waiting up to the default timeout.
    pub fn checkout(&self) -> Result<Arc<T>, AcquireError<E>> {
        self.checkout_timeout(self.inner.default_timeout)
    }

    /// Check out a resource, waiting up to `timeout` if the current thread
    /// does not already hold one.
    ///
    /// Every successful checkout must be paired with a [`checkin`](Pool::checkin)
    /// on the same thread.
    ///
    /// A resource discarded after a shrinking resize only reaches the
    /// configured dispose hook if the returned handle is dropped before the
    /// final checkin.
    pub fn checkout_timeout(&self, timeout: Duration) -> Result<Arc<T>, AcquireError<E>> {
        if self.inner.bounded.is_shutdown() {
            return Err(AcquireError::Shutdown);
        }
        if let Some(res) = self.inner.borrows.reenter() {
            return Ok(res);
        }
        let res = self.inner.bounded.pop(timeout)?;
        self.inner.borrows.enter(res.clone());
        Ok(res)
    }

    /// Release one checkout made by the current thread. The resource goes
    /// back to the pool when the outermost checkout is released.
    pub fn checkin(&self) -> Result<(), ImbalanceError> {
        if let Some(res) = self.inner.borrows.leave()? {
            self.inner.bounded.push(res);
        }
        Ok(())
    }

    /// Check out a resource as a guard which checks it in when dropped.
    pub fn acquire(&self) -> Result<Managed<'_, T, E>, AcquireError<E>> {
        self.acquire_timeout(self.inner.default_timeout)
    }

    /// Check out a resource as a guard, waiting up to `timeout`.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<Managed<'_, T, E>, AcquireError<E>> {
        let res = self.checkout_timeout(timeout)?;
        Ok(Managed::new(self, res))
    }

    /// Run `f` with a checked-out resource. The resource is checked in when
    /// `f` returns or unwinds.
    pub fn with<F, R>(&self, f: F) -> Result<R, AcquireError<E>>
    where
        F: FnOnce(&T) -> R,
    {
        self.with_timeout(self.inner.default_timeout, f)
    }

    /// Run `f` with a checked-out resource, waiting up to `timeout` for one.
    pub fn with_timeout<F, R>(&self, timeout: Duration, f: F) -> Result<R, AcquireError<E>>
    where
        F: FnOnce(&T) -> R,
    {
        let res = self.acquire_timeout(timeout)?;
        Ok(f(&*res))
    }

    /// Shut down the pool, passing each idle resource and each resource
    /// returned later to `hook`. Any further checkout fails with
    /// [`AcquireError::Shutdown`].
    ///
    /// Returns `false` if the pool was already shut down, in which case
    /// `hook` is not used.
    pub fn shutdown<F>(&self, hook: F) -> bool
    where
        F: Fn(Arc<T>) + Send + Sync + 'static,
    {
        let done = self.inner.bounded.shutdown(hook);
        if !done {
            debug!("Pool was already shut down");
        }
        done
    }

    /// Change the capacity of the pool.
    pub fn resize(&self, capacity: usize) -> Result<(), ConfigError> {
        self.inner.bounded.resize(capacity)
    }

    /// Wrap this pool in a [`Wrapper`], which checks out a resource for
    /// each call made through it.
    pub fn wrap(self) -> Wrapper<T, E> {
        Wrapper::new(self)
    }

    /// Access the underlying bounded pool.
    pub fn bounded(&self) -> &BoundedPool<Arc<T>, E> {
        &self.inner.bounded
    }

    pub fn capacity(&self) -> usize {
        self.inner.bounded.capacity()
    }

    pub fn default_timeout(&self) -> Duration {
        self.inner.default_timeout
    }

    /// The number of idle resources in the pool.
    pub fn len(&self) -> usize {
        self.inner.bounded.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bounded.is_empty()
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.bounded.is_shutdown()
    }

    /// Count the idle resources matching a predicate.
    /// Use [`len`](Pool::len) to count every idle resource.
    pub fn count<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.inner.bounded.count(|res| pred(&**res))
    }

    /// Visit each idle resource. `f` must not use the pool.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.inner.bounded.each(|res| f(&**res))
    }

    /// The number of nested checkouts held by the current thread.
    pub fn depth(&self) -> usize {
        self.inner.borrows.depth()
    }

    /// The number of threads currently holding a resource.
    pub fn holders(&self) -> usize {
        self.inner.borrows.holders()
    }
}

impl<T, E> Clone for Pool<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Debug for Pool<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("bounded", &self.inner.bounded)
            .field("default_timeout", &self.inner.default_timeout)
            .field("holders", &self.holders())
            .finish()
    }
}
