//! The observable store and its construction helpers.
//!
//! An [`ObservableStore`] holds one value and notifies registered
//! [`ObserverEntry`]s when it changes. [`create_store`] and [`StoreBuilder`]
//! wrap it into a [`Store`], optionally composed with user-defined actions.

mod builder;
mod factory;
mod observer;
mod store;

pub use builder::StoreBuilder;
pub use factory::{create_store, create_store_with_actions, Store, StoreHandle};
pub use observer::{ObserverEntry, SubscriptionId};
pub use store::{Next, ObservableStore, Subscription, WeakStore};
