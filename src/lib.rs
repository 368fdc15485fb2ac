//! # observable-store
//!
//! A minimal observable state container.
//!
//! A store holds a single value. Replacing it with a value that is not equal
//! to the current one notifies every registered observer with
//! `(current, previous)`. Observers may carry a dependency projection, in
//! which case they only run when the projected key changes.
//!
//! - [`ObservableStore`] - the state container and its observer registry
//! - [`create_store`] / [`create_store_with_actions`] - construct a [`Store`],
//!   optionally composed with actions closing over the same store
//! - [`StoreBuilder`] - name the store for logging and pick its equality
//! - [`equality`] - deep-equality collaborators
//!
//! Stores are single-threaded (`!Send`) and notify synchronously. Observers
//! that call back into their own store should capture a [`WeakStore`], since
//! a captured clone keeps the store alive for as long as it is registered.
//!
//! ```
//! use observable_store::create_store;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Pos {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let store = create_store(Pos { x: 1, y: 1 });
//! let moves = Rc::new(RefCell::new(Vec::new()));
//! store.on_change_with_deps(
//!     {
//!         let moves = moves.clone();
//!         move |current: &Pos, prev: &Pos| moves.borrow_mut().push((prev.x, current.x))
//!     },
//!     |p: &Pos| p.x,
//! );
//!
//! store.set(Pos { x: 1, y: 2 });
//! store.set(Pos { x: 2, y: 2 });
//! assert_eq!(*moves.borrow(), vec![(1, 2)]);
//! ```

pub mod equality;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{
    create_store, create_store_with_actions, Next, ObservableStore, ObserverEntry, Store,
    StoreBuilder, StoreHandle, Subscription, SubscriptionId, WeakStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = create_store(0);
        assert_eq!(store.get(), 0);
        store.set(42);
        assert_eq!(store.get(), 42);
    }
}
