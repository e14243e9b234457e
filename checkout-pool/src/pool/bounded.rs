use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};
use scopeguard::{guard, ScopeGuard};

use super::error::{AcquireError, ConfigError};

pub(crate) type CreateFn<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

pub(crate) type DisposeFn<T> = Arc<dyn Fn(T) + Send + Sync>;

struct State<T> {
    available: Vec<T>,
    capacity: usize,
    created: usize,
    // set once the pool is shut down, receives every resource seen afterward
    shutdown: Option<DisposeFn<T>>,
}

/// A capacity-limited stack of resources of type `T`, created on demand by a
/// fallible factory.
///
/// Resources are handed out most-recently-returned first. When every slot
/// has been created and none are idle, [`pop`](BoundedPool::pop) blocks
/// until a resource is pushed back, capacity grows, or the timeout elapses.
/// Each `push` wakes one arbitrary waiter; no fairness between waiters is
/// provided.
///
/// The pool does not track which thread holds a resource, and does not
/// verify that pushed resources were created by it.
pub struct BoundedPool<T, E> {
    create: CreateFn<T, E>,
    dispose: Option<DisposeFn<T>>,
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T, E> BoundedPool<T, E> {
    /// Create an empty pool with room for `capacity` resources.
    pub fn new<C>(capacity: usize, create: C) -> Result<Self, ConfigError>
    where
        C: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self::from_parts(capacity, Box::new(create), None))
    }

    pub(crate) fn from_parts(
        capacity: usize,
        create: CreateFn<T, E>,
        dispose: Option<DisposeFn<T>>,
    ) -> Self {
        Self {
            create,
            dispose,
            state: Mutex::new(State {
                available: Vec::with_capacity(capacity),
                capacity,
                created: 0,
                shutdown: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Obtain a resource, waiting up to `timeout` if none can be handed out
    /// immediately. A zero timeout never blocks.
    pub fn pop(&self, timeout: Duration) -> Result<T, AcquireError<E>> {
        let start = Instant::now();
        let deadline = start.checked_add(timeout);
        let mut state = self.state.lock();

        loop {
            if state.shutdown.is_some() {
                return Err(AcquireError::Shutdown);
            }

            if let Some(res) = state.available.pop() {
                return Ok(res);
            }

            if state.created < state.capacity {
                // reserve the slot before releasing the lock
                state.created += 1;
                drop(state);
                return self.create_reserved();
            }

            // the state is always inspected once more after the final wakeup,
            // so a resource pushed during a timeout race is not missed
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(
                    "Timed out waiting for a resource after {:?} (capacity {})",
                    elapsed, state.capacity
                );
                return Err(AcquireError::Timeout {
                    requested: timeout,
                    elapsed,
                });
            }

            match deadline {
                Some(deadline) => {
                    self.ready.wait_until(&mut state, deadline);
                }
                None => self.ready.wait(&mut state),
            }
        }
    }

    /// Obtain a resource without blocking.
    pub fn try_pop(&self) -> Result<T, AcquireError<E>> {
        self.pop(Duration::from_secs(0))
    }

    fn create_reserved(&self) -> Result<T, AcquireError<E>> {
        // a failed or panicking factory gives the slot back
        let slot = guard((), |()| self.release_slot());
        match (self.create)() {
            Ok(res) => {
                ScopeGuard::into_inner(slot);
                trace!("Created pooled resource");
                Ok(res)
            }
            Err(err) => {
                warn!("Failed to create pooled resource");
                drop(slot);
                Err(AcquireError::ResourceError(err))
            }
        }
    }

    fn release_slot(&self) {
        let mut state = self.state.lock();
        state.created = state.created.saturating_sub(1);
        drop(state);
        self.ready.notify_one();
    }

    /// Return a resource to the pool, waking one waiter. Never blocks.
    ///
    /// After a shutdown the resource is passed to the shutdown hook instead.
    /// While the pool holds more resources than its capacity (following a
    /// shrinking [`resize`](BoundedPool::resize)) the resource is discarded.
    pub fn push(&self, resource: T) {
        let mut state = self.state.lock();

        if let Some(hook) = state.shutdown.clone() {
            state.created = state.created.saturating_sub(1);
            drop(state);
            trace!("Finalizing resource returned after shutdown");
            hook(resource);
            return;
        }

        if state.created > state.capacity {
            state.created -= 1;
            let (created, capacity) = (state.created, state.capacity);
            drop(state);
            debug!(
                "Discarding returned resource ({} created, capacity {})",
                created, capacity
            );
            self.discard(resource);
            return;
        }

        state.available.push(resource);
        drop(state);
        self.ready.notify_one();
    }

    /// Change the capacity of the pool.
    ///
    /// Growing the pool wakes all waiters so they may create new resources.
    /// Shrinking it discards idle resources, longest idle first, until the
    /// created count fits; checked-out resources are discarded as they are
    /// returned.
    pub fn resize(&self, capacity: usize) -> Result<(), ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut state = self.state.lock();
        let previous = std::mem::replace(&mut state.capacity, capacity);
        let excess = state
            .created
            .saturating_sub(capacity)
            .min(state.available.len());
        let discarded: Vec<T> = state.available.drain(..excess).collect();
        state.created -= excess;
        drop(state);

        debug!(
            "Resized pool from {} to {}, discarding {} idle resources",
            previous, capacity, excess
        );
        if capacity > previous {
            self.ready.notify_all();
        }
        for res in discarded {
            self.discard(res);
        }
        Ok(())
    }

    /// Shut down the pool, passing every idle resource to `hook`.
    ///
    /// Resources pushed back afterward are passed to `hook` as well, and
    /// all current and future waiters fail with [`AcquireError::Shutdown`].
    /// Returns `false` without calling `hook` if the pool was already shut
    /// down.
    pub fn shutdown<F>(&self, hook: F) -> bool
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let hook: DisposeFn<T> = Arc::new(hook);
        let mut state = self.state.lock();
        if state.shutdown.is_some() {
            return false;
        }
        state.shutdown.replace(hook.clone());
        let drained = std::mem::take(&mut state.available);
        state.created = state.created.saturating_sub(drained.len());
        let outstanding = state.created;
        drop(state);

        debug!(
            "Shutting down pool: {} idle resources, {} outstanding",
            drained.len(),
            outstanding
        );
        self.ready.notify_all();
        for res in drained {
            hook(res);
        }
        true
    }

    fn discard(&self, resource: T) {
        if let Some(dispose) = self.dispose.as_ref() {
            dispose(resource);
        }
    }

    /// Check whether the pool has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown.is_some()
    }

    /// The current capacity of the pool.
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// The number of live resources created by the pool, idle or checked out.
    pub fn created(&self) -> usize {
        self.state.lock().created
    }

    /// The number of idle resources. Advisory only under concurrent use.
    pub fn len(&self) -> usize {
        self.state.lock().available.len()
    }

    /// Check whether there are no idle resources.
    pub fn is_empty(&self) -> bool {
        self.state.lock().available.is_empty()
    }

    /// Count the idle resources matching a predicate.
    /// Use [`len`](BoundedPool::len) to count every idle resource.
    pub fn count<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.state
            .lock()
            .available
            .iter()
            .filter(|res| pred(res))
            .count()
    }

    /// Visit each idle resource.
    ///
    /// The pool is locked for the duration of the call, so `f` must not use
    /// the pool.
    pub fn each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.state.lock().available.iter().for_each(f)
    }
}

impl<T, E> Debug for BoundedPool<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedPool")
            .field("capacity", &state.capacity)
            .field("created", &state.created)
            .field("available", &state.available.len())
            .field("shutdown", &state.shutdown.is_some())
            .finish()
    }
}
