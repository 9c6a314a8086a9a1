//! Per-key table of pending fetches so overlapping renders share one request.

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

pub struct InFlight<K, V> {
    pending: RefCell<HashMap<K, Shared<LocalBoxFuture<'static, V>>>>,
}

impl<K, V> Default for InFlight<K, V> {
    fn default() -> Self {
        Self {
            pending: RefCell::new(HashMap::new()),
        }
    }
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the pending fetch for `key`, starting it with `start` if none is running.
    ///
    /// The entry is dropped once the fetch settles, so a later call for the
    /// same key starts a fresh request.
    pub async fn run<F>(&self, key: K, start: F) -> V
    where
        F: FnOnce() -> LocalBoxFuture<'static, V>,
    {
        let fetch = self
            .pending
            .borrow_mut()
            .entry(key.clone())
            .or_insert_with(|| start().shared())
            .clone();

        let value = fetch.clone().await;

        let mut pending = self.pending.borrow_mut();
        if pending.get(&key).is_some_and(|current| current.ptr_eq(&fetch)) {
            pending.remove(&key);
        }
        value
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.borrow().contains_key(key)
    }
}
