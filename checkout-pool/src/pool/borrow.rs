use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use super::error::ImbalanceError;

/// The resource held by one thread, and how many times it has been checked
/// out without a matching checkin.
struct Borrow<T> {
    resource: Arc<T>,
    depth: usize,
}

/// Tracks the checked-out resource of each thread for a single pool.
///
/// Every nested checkout on a thread shares the resource of the outermost
/// one, so the stack of borrows collapses to a depth counter. Only the
/// owning thread ever reads or changes its entry; the lock only guards the
/// map itself and is never held while waiting on the pool.
pub(crate) struct Borrows<T> {
    held: Mutex<HashMap<ThreadId, Borrow<T>>>,
}

impl<T> Borrows<T> {
    pub fn new() -> Self {
        Self {
            held: Mutex::new(HashMap::new()),
        }
    }

    /// Re-enter the current thread's borrow, if any.
    pub fn reenter(&self) -> Option<Arc<T>> {
        let mut held = self.held.lock();
        let borrow = held.get_mut(&thread::current().id())?;
        borrow.depth += 1;
        Some(borrow.resource.clone())
    }

    /// Record a freshly acquired resource as the current thread's borrow.
    pub fn enter(&self, resource: Arc<T>) {
        let prev = self
            .held
            .lock()
            .insert(thread::current().id(), Borrow { resource, depth: 1 });
        debug_assert!(prev.is_none(), "Thread already holds a resource");
    }

    /// Leave one level of the current thread's borrow, returning the
    /// resource when the outermost level is released.
    pub fn leave(&self) -> Result<Option<Arc<T>>, ImbalanceError> {
        let thread = thread::current().id();
        let mut held = self.held.lock();
        let borrow = held.get_mut(&thread).ok_or(ImbalanceError { thread })?;
        borrow.depth -= 1;
        if borrow.depth == 0 {
            Ok(held.remove(&thread).map(|borrow| borrow.resource))
        } else {
            Ok(None)
        }
    }

    /// The nesting depth of the current thread's borrow.
    pub fn depth(&self) -> usize {
        self.held
            .lock()
            .get(&thread::current().id())
            .map_or(0, |borrow| borrow.depth)
    }

    /// The number of threads currently holding a resource.
    pub fn holders(&self) -> usize {
        self.held.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_depth() {
        let borrows = Borrows::new();
        assert!(borrows.reenter().is_none());

        borrows.enter(Arc::new(5u32));
        let inner = borrows.reenter().unwrap();
        assert_eq!(*inner, 5);
        assert_eq!(borrows.depth(), 2);

        assert!(borrows.leave().unwrap().is_none());
        assert_eq!(borrows.depth(), 1);
        let outer = borrows.leave().unwrap().unwrap();
        assert!(Arc::ptr_eq(&inner, &outer));
        assert_eq!(borrows.holders(), 0);
    }

    #[test]
    fn borrow_imbalance() {
        let borrows = Borrows::<u32>::new();
        let err = borrows.leave().unwrap_err();
        assert_eq!(err.thread(), thread::current().id());
    }

    #[test]
    fn borrow_per_thread() {
        let borrows = Arc::new(Borrows::new());
        borrows.enter(Arc::new(1u32));

        let other = borrows.clone();
        std::thread::spawn(move || {
            assert!(other.reenter().is_none());
            assert_eq!(other.depth(), 0);
            other.enter(Arc::new(2u32));
            assert_eq!(*other.leave().unwrap().unwrap(), 2);
        })
        .join()
        .unwrap();

        assert_eq!(*borrows.reenter().unwrap(), 1);
        assert_eq!(borrows.holders(), 1);
    }
}
