use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of an [`ObserverEntry`].
///
/// Returned when an entry is registered and accepted by
/// [`ObservableStore::remove_observer`](super::ObservableStore::remove_observer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type ObserverFn<S> = dyn Fn(&S, &S);
type DepsGate<S> = dyn Fn(&S, &S) -> bool;

/// An observer callback, optionally paired with a dependency projection.
///
/// The observer is called with `(current, prev)` after the store's state
/// changes. With a dependency projection it is only called when the projected
/// key differs between `prev` and `current`.
///
/// Clones share the same identity: registering a clone of an entry that is
/// already registered moves it to the end of the notification order instead of
/// adding a second registration.
pub struct ObserverEntry<S> {
    id: SubscriptionId,
    observer: Rc<ObserverFn<S>>,
    deps: Option<Rc<DepsGate<S>>>,
}

impl<S: 'static> ObserverEntry<S> {
    /// Create an entry that is notified on every change.
    pub fn new<F>(observer: F) -> Self
    where
        F: Fn(&S, &S) + 'static,
    {
        Self {
            id: SubscriptionId::next(),
            observer: Rc::new(observer),
            deps: None,
        }
    }

    /// Create an entry that is notified only when `deps` projects the new
    /// state to a different key than the previous state.
    ///
    /// # Examples
    ///
    /// ```
    /// use observable_store::{create_store, ObserverEntry};
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let store = create_store((1, 1));
    /// let calls = Rc::new(Cell::new(0));
    /// let entry = ObserverEntry::with_deps(
    ///     {
    ///         let calls = calls.clone();
    ///         move |_: &(i32, i32), _: &(i32, i32)| calls.set(calls.get() + 1)
    ///     },
    ///     |state: &(i32, i32)| state.0,
    /// );
    /// store.add_observer(&entry);
    ///
    /// store.set((1, 2));
    /// assert_eq!(calls.get(), 0);
    /// store.set((2, 2));
    /// assert_eq!(calls.get(), 1);
    /// ```
    pub fn with_deps<F, D, K>(observer: F, deps: D) -> Self
    where
        F: Fn(&S, &S) + 'static,
        D: Fn(&S) -> K + 'static,
        K: PartialEq,
    {
        Self {
            id: SubscriptionId::next(),
            observer: Rc::new(observer),
            deps: Some(Rc::new(move |current: &S, prev: &S| {
                deps(current) != deps(prev)
            })),
        }
    }

    /// Like [`with_deps`](Self::with_deps), comparing keys with `key_eq`.
    pub fn with_deps_by<F, D, K, E>(observer: F, deps: D, key_eq: E) -> Self
    where
        F: Fn(&S, &S) + 'static,
        D: Fn(&S) -> K + 'static,
        E: Fn(&K, &K) -> bool + 'static,
    {
        Self {
            id: SubscriptionId::next(),
            observer: Rc::new(observer),
            deps: Some(Rc::new(move |current: &S, prev: &S| {
                !key_eq(&deps(current), &deps(prev))
            })),
        }
    }
}

impl<S> ObserverEntry<S> {
    /// The identity shared by this entry and its clones.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether notification is gated by a dependency projection.
    pub fn has_deps(&self) -> bool {
        self.deps.is_some()
    }

    pub(crate) fn should_notify(&self, current: &S, prev: &S) -> bool {
        match &self.deps {
            Some(changed) => changed(current, prev),
            None => true,
        }
    }

    pub(crate) fn notify(&self, current: &S, prev: &S) {
        (self.observer)(current, prev);
    }
}

impl<S> Clone for ObserverEntry<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observer: Rc::clone(&self.observer),
            deps: self.deps.clone(),
        }
    }
}

impl<S> fmt::Debug for ObserverEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverEntry")
            .field("id", &self.id)
            .field("has_deps", &self.has_deps())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn entries_get_distinct_ids() {
        let a = ObserverEntry::<i32>::new(|_, _| {});
        let b = ObserverEntry::<i32>::new(|_, _| {});
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn deps_gate_compares_projected_keys() {
        let entry = ObserverEntry::with_deps(|_: &(i32, i32), _| {}, |s: &(i32, i32)| s.0);
        assert!(entry.has_deps());
        assert!(!entry.should_notify(&(1, 10), &(1, 20)));
        assert!(entry.should_notify(&(2, 10), &(1, 10)));
    }

    #[test]
    fn deps_gate_uses_custom_key_equality() {
        let entry = ObserverEntry::with_deps_by(
            |_: &(i32, i32), _| {},
            |s: &(i32, i32)| s.0,
            |a: &i32, b: &i32| a.abs() == b.abs(),
        );
        assert!(!entry.should_notify(&(-3, 0), &(3, 0)));
        assert!(entry.should_notify(&(4, 0), &(3, 0)));
    }

    #[test]
    fn ungated_entry_always_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let entry = ObserverEntry::new({
            let seen = seen.clone();
            move |current: &i32, prev: &i32| seen.borrow_mut().push((*current, *prev))
        });
        assert!(entry.should_notify(&1, &1));
        entry.notify(&2, &1);
        assert_eq!(*seen.borrow(), vec![(2, 1)]);
    }
}
