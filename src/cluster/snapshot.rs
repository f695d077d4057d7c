use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Copy-on-write holder for router state.
///
/// Readers clone the current `Arc` and work on that snapshot, so a lookup never
/// waits for a mutation to finish rebuilding. Writers are serialized, build the
/// next state on a private clone, and publish it with a single pointer swap.
pub(crate) struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
    writer: Mutex<()>,
}

impl<T: Clone> SnapshotCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
            writer: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Arc<T> {
        // a poisoned lock still holds a fully published snapshot
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Applies `mutate` to a private copy and publishes it only if it succeeds.
    pub fn update<R, E>(&self, mutate: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = (*self.load()).clone();
        let result = mutate(&mut next)?;

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
        Ok(result)
    }
}
