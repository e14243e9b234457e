use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use log::warn;

use crate::pool::Pool;

/// A resource checked out of a [`Pool`], which is checked back in when
/// dropped.
///
/// The guard cannot be sent to another thread, as the checkin must happen
/// on the thread which performed the checkout.
pub struct Managed<'p, T, E> {
    pool: &'p Pool<T, E>,
    value: Option<Arc<T>>,
    _local: PhantomData<*const ()>,
}

impl<'p, T, E> Managed<'p, T, E> {
    pub(crate) fn new(pool: &'p Pool<T, E>, value: Arc<T>) -> Self {
        Self {
            pool,
            value: Some(value),
            _local: PhantomData,
        }
    }

    /// Access the shared handle to the resource, for identity comparisons.
    pub fn shared(mng_self: &Self) -> &Arc<T> {
        mng_self.value.as_ref().unwrap()
    }
}

impl<T: Debug, E> Debug for Managed<'_, T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("Managed")
                .field("value", self.deref())
                .finish()
        } else {
            Debug::fmt(self.deref(), f)
        }
    }
}

impl<T: Display, E> Display for Managed<'_, T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.deref(), f)
    }
}

impl<T, E> Deref for Managed<'_, T, E> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // note: panics after drop when value is taken
        self.value.as_ref().unwrap()
    }
}

impl<T, E> Drop for Managed<'_, T, E> {
    fn drop(&mut self) {
        // the guard's handle must be gone before the pool can reclaim the value
        drop(self.value.take());
        if let Err(err) = self.pool.checkin() {
            warn!("Managed resource dropped without a checkout: {}", err);
        }
    }
}
