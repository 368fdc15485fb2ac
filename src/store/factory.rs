use std::fmt;
use std::ops::Deref;

use super::builder::StoreBuilder;
use super::store::ObservableStore;

/// Handle given to an actions factory.
///
/// It is a clone of the store being built, so it exposes `get`, `set`,
/// `update`, `notify_observers`, `add_observer`, `remove_observer` and
/// `on_change` on the same state the finished [`Store`] serves.
pub type StoreHandle<S> = ObservableStore<S>;

/// An [`ObservableStore`] composed with a set of actions.
///
/// The store's own operations are reachable through [`Deref`]; the actions
/// live in their own namespace behind [`Store::actions`], so an action can
/// never shadow a core operation.
///
/// # Examples
///
/// ```
/// use observable_store::{create_store_with_actions, StoreHandle};
///
/// struct Counter {
///     store: StoreHandle<i32>,
/// }
///
/// impl Counter {
///     fn increment(&self) {
///         self.store.update(|n| n + 1);
///     }
/// }
///
/// let counter = create_store_with_actions(0, |store| Counter { store });
/// counter.actions().increment();
/// counter.actions().increment();
/// assert_eq!(counter.get(), 2);
/// ```
pub struct Store<S, A = ()> {
    core: ObservableStore<S>,
    actions: A,
}

impl<S, A> Store<S, A> {
    pub(crate) fn from_parts(core: ObservableStore<S>, actions: A) -> Self {
        Self { core, actions }
    }

    /// The composed actions.
    pub fn actions(&self) -> &A {
        &self.actions
    }

    /// The underlying store.
    pub fn store(&self) -> &ObservableStore<S> {
        &self.core
    }

    /// Split into the underlying store and the actions.
    pub fn into_parts(self) -> (ObservableStore<S>, A) {
        (self.core, self.actions)
    }
}

impl<S, A> Deref for Store<S, A> {
    type Target = ObservableStore<S>;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl<S, A: Clone> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<S: Default + PartialEq + 'static> Default for Store<S> {
    fn default() -> Self {
        create_store(S::default())
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("core", &self.core)
            .field("actions", &std::any::type_name::<A>())
            .finish()
    }
}

/// Create a store holding `initial`, comparing states with [`PartialEq`].
///
/// Use `Option<T>` as the state type to model a store that may hold no value;
/// `Store::<Option<T>>::default()` starts out empty.
pub fn create_store<S: PartialEq + 'static>(initial: S) -> Store<S> {
    StoreBuilder::new(initial).build()
}

/// Create a store holding `initial` and compose the actions built by
/// `actions` from a handle to it.
pub fn create_store_with_actions<S, A, F>(initial: S, actions: F) -> Store<S, A>
where
    S: PartialEq + 'static,
    F: FnOnce(StoreHandle<S>) -> A,
{
    StoreBuilder::new(initial).build_with_actions(actions)
}
