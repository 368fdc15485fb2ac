use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::observer::{ObserverEntry, SubscriptionId};

/// Comparison strategy deciding whether a candidate state differs from the
/// current one.
pub(crate) type Equality<S> = Rc<dyn Fn(&S, &S) -> bool>;

/// The next state handed to [`ObservableStore::apply`].
pub enum Next<S> {
    /// Replace the state with this value.
    Value(S),
    /// Compute the next state from the previous one.
    Updater(Box<dyn FnOnce(&S) -> S>),
}

impl<S> Next<S> {
    /// Wrap an updater function.
    pub fn updater<F>(f: F) -> Self
    where
        F: FnOnce(&S) -> S + 'static,
    {
        Next::Updater(Box::new(f))
    }
}

impl<S> From<S> for Next<S> {
    fn from(value: S) -> Self {
        Next::Value(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for Next<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Next::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

struct StoreInner<S> {
    name: Option<String>,
    state: RefCell<Rc<S>>,
    observers: RefCell<Vec<ObserverEntry<S>>>,
    equality: Equality<S>,
    version: Cell<u64>,
}

impl<S> StoreInner<S> {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("store")
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|entry| entry.id() != id);
        let removed = observers.len() != before;
        if removed {
            debug!(store = self.label(), %id, remaining = observers.len(), "observer removed");
        }
        removed
    }
}

trait Registry {
    fn unregister(&self, id: SubscriptionId) -> bool;
}

impl<S> Registry for StoreInner<S> {
    fn unregister(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }
}

/// A single-threaded observable state container.
///
/// The store holds one value and a registry of observers. Replacing the value
/// with one that is not equal to the current value (per the store's equality
/// strategy, structural [`PartialEq`] by default) stores it and then notifies
/// every registered observer, in registration order, with `(current, prev)`.
///
/// Cloning a store creates another handle to the **same** state and registry.
/// An observer holding such a clone keeps the store alive through its own
/// registry; capture a [`WeakStore`] from [`downgrade`](Self::downgrade)
/// instead, or unregister the observer with
/// [`remove_observer`](Self::remove_observer) or a [`Subscription`].
///
/// The default equality is [`PartialEq`], so state must be reflexive for an
/// equal `set` to be a no-op. `f64::NAN != f64::NAN`: for float state pick
/// [`equality::reflexive_eq`](crate::equality::reflexive_eq) or the JSON
/// strategy of [`StoreBuilder`](crate::StoreBuilder).
///
/// No internal borrow is held while user code runs, so observers and updaters
/// may read, write and (un)register on the store re-entrantly. A panic in an
/// observer propagates to the caller of `set` and skips the observers after it
/// in that pass.
///
/// # Examples
///
/// ```
/// use observable_store::ObservableStore;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let store = ObservableStore::new(0);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// store.on_change({
///     let seen = seen.clone();
///     move |current: &i32, prev: &i32| seen.borrow_mut().push((*current, *prev))
/// });
///
/// store.set(1);
/// store.set(1); // equal, no notification
/// store.update(|n| n + 1);
///
/// assert_eq!(*seen.borrow(), vec![(1, 0), (2, 1)]);
/// ```
pub struct ObservableStore<S> {
    inner: Rc<StoreInner<S>>,
}

impl<S: PartialEq + 'static> ObservableStore<S> {
    /// Create a store comparing states with [`PartialEq`].
    pub fn new(initial: S) -> Self {
        Self::from_parts(initial, None, Rc::new(|a: &S, b: &S| a == b))
    }
}

impl<S: 'static> ObservableStore<S> {
    /// Create a store with a custom equality strategy.
    ///
    /// `equality(prev, next)` returning `true` suppresses the change.
    pub fn with_equality<E>(initial: S, equality: E) -> Self
    where
        E: Fn(&S, &S) -> bool + 'static,
    {
        Self::from_parts(initial, None, Rc::new(equality))
    }

    pub(crate) fn from_parts(initial: S, name: Option<String>, equality: Equality<S>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                name,
                state: RefCell::new(Rc::new(initial)),
                observers: RefCell::new(Vec::new()),
                equality,
                version: Cell::new(0),
            }),
        }
    }

    /// The diagnostic name given through the builder, if any.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Number of changes applied since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Whether two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Shared pointer to the current state.
    pub fn snapshot(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Read the current state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.snapshot();
        f(&state)
    }

    /// Replace the state.
    ///
    /// Does nothing if `next` equals the current state.
    pub fn set(&self, next: S) {
        let prev = self.snapshot();
        self.commit(prev, next);
    }

    /// Compute the next state from the previous one.
    ///
    /// Does nothing if the result equals the previous state.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&S) -> S,
    {
        let prev = self.snapshot();
        let next = f(&prev);
        self.commit(prev, next);
    }

    /// Apply either a plain value or an updater.
    pub fn apply(&self, next: impl Into<Next<S>>) {
        match next.into() {
            Next::Value(value) => self.set(value),
            Next::Updater(f) => self.update(f),
        }
    }

    fn commit(&self, prev: Rc<S>, next: S) {
        if (self.inner.equality)(&prev, &next) {
            trace!(store = self.inner.label(), "state unchanged, skipping notification");
            return;
        }

        let current = Rc::new(next);
        *self.inner.state.borrow_mut() = Rc::clone(&current);
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        debug!(store = self.inner.label(), version, "state changed");

        self.notify_observers(&current, &prev);
    }

    /// Notify observers of a transition from `prev` to `current`.
    ///
    /// Each observer without dependencies is called; an observer with
    /// dependencies is called only if its projected key changed. The pass
    /// runs over the registry as it was when the call started: observers
    /// added during the pass are not called, observers removed during the
    /// pass still are.
    pub fn notify_observers(&self, current: &S, prev: &S) {
        let observers = self.inner.observers.borrow().clone();
        trace!(store = self.inner.label(), observers = observers.len(), "notifying observers");

        for entry in &observers {
            if entry.should_notify(current, prev) {
                entry.notify(current, prev);
            } else {
                trace!(store = self.inner.label(), id = %entry.id(), "dependencies unchanged");
            }
        }
    }

    /// Register an entry, moving it to the end if it is already registered.
    pub fn add_observer(&self, entry: &ObserverEntry<S>) -> SubscriptionId {
        let id = entry.id();
        let mut observers = self.inner.observers.borrow_mut();
        observers.retain(|existing| existing.id() != id);
        observers.push(entry.clone());
        debug!(store = self.inner.label(), %id, total = observers.len(), "observer added");
        id
    }

    /// Remove the entry with the given identity.
    ///
    /// Returns `false` if no such entry was registered.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        self.inner.remove(id)
    }

    /// Register an observer called on every change.
    pub fn on_change<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&S, &S) + 'static,
    {
        self.add_observer(&ObserverEntry::new(observer))
    }

    /// Register an observer called only when `deps` projects the state to a
    /// different key.
    pub fn on_change_with_deps<F, D, K>(&self, observer: F, deps: D) -> SubscriptionId
    where
        F: Fn(&S, &S) + 'static,
        D: Fn(&S) -> K + 'static,
        K: PartialEq,
    {
        self.add_observer(&ObserverEntry::with_deps(observer, deps))
    }

    /// Like [`on_change_with_deps`](Self::on_change_with_deps), comparing the
    /// projected keys with `key_eq` instead of [`PartialEq`].
    ///
    /// Use this to keep the gate consistent with a store built on a custom
    /// equality, e.g. [`json_eq`](crate::equality::json_eq) keys for a JSON
    /// store.
    pub fn on_change_with_deps_by<F, D, K, E>(
        &self,
        observer: F,
        deps: D,
        key_eq: E,
    ) -> SubscriptionId
    where
        F: Fn(&S, &S) + 'static,
        D: Fn(&S) -> K + 'static,
        E: Fn(&K, &K) -> bool + 'static,
    {
        self.add_observer(&ObserverEntry::with_deps_by(observer, deps, key_eq))
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register an entry for as long as the returned guard lives.
    pub fn subscribe(&self, entry: &ObserverEntry<S>) -> Subscription {
        let id = self.add_observer(entry);
        let weak: Weak<StoreInner<S>> = Rc::downgrade(&self.inner);
        let registry: Weak<dyn Registry> = weak;
        Subscription {
            id,
            registry: Some(registry),
        }
    }
}

impl<S: Clone + 'static> ObservableStore<S> {
    /// A clone of the current state.
    pub fn get(&self) -> S {
        S::clone(&self.snapshot())
    }

    /// Edit a copy of the current state in place, then commit it.
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut S),
    {
        let prev = self.snapshot();
        let mut next = S::clone(&prev);
        f(&mut next);
        self.commit(prev, next);
    }
}

/// Non-owning handle to an [`ObservableStore`].
///
/// Observers that need to reach back into their own store should capture a
/// `WeakStore` rather than a clone, otherwise the store owns a closure that
/// owns the store and neither is ever freed.
pub struct WeakStore<S> {
    inner: Weak<StoreInner<S>>,
}

impl<S> WeakStore<S> {
    /// The store, if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<ObservableStore<S>> {
        self.inner.upgrade().map(|inner| ObservableStore { inner })
    }
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for WeakStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<S> Clone for ObservableStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Default + PartialEq + 'static> Default for ObservableStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for ObservableStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStore")
            .field("name", &self.inner.name)
            .field("state", &self.inner.state.borrow())
            .field("observers", &self.inner.observers.borrow().len())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

/// RAII guard returned by [`ObservableStore::subscribe`].
///
/// Dropping the guard removes the observer. The guard does not keep the store
/// alive.
#[must_use = "dropping a Subscription unregisters its observer"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Option<Weak<dyn Registry>>,
}

impl Subscription {
    /// Identity of the guarded entry.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the observer registered after the guard is gone.
    pub fn detach(mut self) -> SubscriptionId {
        self.registry = None;
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.unregister(self.id);
        }
    }
}
