use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

use super::factory::{Store, StoreHandle};
use super::store::{Equality, ObservableStore};
use crate::equality;
use crate::error::Result;

enum Comparison<S> {
    Custom(Equality<S>),
    Serialized(fn(&S, &S) -> Result<bool>),
}

/// Configures and creates a [`Store`].
///
/// # Examples
///
/// ```
/// use observable_store::StoreBuilder;
/// use serde_json::json;
///
/// let store = StoreBuilder::json(json!({"total": 1}))
///     .name("cart")
///     .build();
///
/// store.set(json!({"total": 1.0})); // numerically equal, not a change
/// assert_eq!(store.version(), 0);
/// assert_eq!(store.name(), Some("cart"));
/// ```
pub struct StoreBuilder<S> {
    initial: S,
    name: Option<String>,
    comparison: Comparison<S>,
}

impl<S: PartialEq + 'static> StoreBuilder<S> {
    /// Start a builder comparing states with [`PartialEq`].
    pub fn new(initial: S) -> Self {
        Self::with_equality(initial, |a: &S, b: &S| a == b)
    }
}

impl<S: Serialize + 'static> StoreBuilder<S> {
    /// Start a builder comparing states by their JSON representation.
    ///
    /// See [`equality::serialized_eq`]. If a state cannot be serialized the
    /// failure is logged and the new state is treated as a change.
    pub fn json(initial: S) -> Self {
        Self {
            initial,
            name: None,
            comparison: Comparison::Serialized(equality::serialized_eq::<S>),
        }
    }
}

impl<S: 'static> StoreBuilder<S> {
    /// Start a builder with a custom equality strategy.
    pub fn with_equality<E>(initial: S, equality: E) -> Self
    where
        E: Fn(&S, &S) -> bool + 'static,
    {
        Self {
            initial,
            name: None,
            comparison: Comparison::Custom(Rc::new(equality)),
        }
    }

    /// Name reported in log events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the equality strategy.
    pub fn equality<E>(mut self, equality: E) -> Self
    where
        E: Fn(&S, &S) -> bool + 'static,
    {
        self.comparison = Comparison::Custom(Rc::new(equality));
        self
    }

    /// Build a store without actions.
    pub fn build(self) -> Store<S> {
        self.build_with_actions(|_| ())
    }

    /// Build a store and compose the actions returned by `actions`.
    ///
    /// The factory receives a handle to the same store the result wraps.
    pub fn build_with_actions<A, F>(self, actions: F) -> Store<S, A>
    where
        F: FnOnce(StoreHandle<S>) -> A,
    {
        let equality = match self.comparison {
            Comparison::Custom(equality) => equality,
            Comparison::Serialized(compare) => {
                let label = self.name.clone().unwrap_or_else(|| "store".to_string());
                Rc::new(move |a: &S, b: &S| match compare(a, b) {
                    Ok(equal) => equal,
                    Err(error) => {
                        warn!(store = %label, %error, "state comparison failed, treating as changed");
                        false
                    }
                }) as Equality<S>
            }
        };

        let core = ObservableStore::from_parts(self.initial, self.name, equality);
        let actions = actions(core.clone());
        Store::from_parts(core, actions)
    }
}

impl<S: fmt::Debug> fmt::Debug for StoreBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comparison = match self.comparison {
            Comparison::Custom(_) => "custom",
            Comparison::Serialized(_) => "json",
        };
        f.debug_struct("StoreBuilder")
            .field("initial", &self.initial)
            .field("name", &self.name)
            .field("comparison", &comparison)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    #[test]
    fn builder_sets_name() {
        let store = StoreBuilder::new(0).name("counter").build();
        assert_eq!(store.name(), Some("counter"));
        assert_eq!(StoreBuilder::new(0).build().name(), None);
    }

    #[test]
    fn equality_override_replaces_default() {
        let store = StoreBuilder::new(String::from("Hello"))
            .equality(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
            .build();

        store.set("HELLO".to_string());
        assert_eq!(store.get(), "Hello");
        store.set("World".to_string());
        assert_eq!(store.get(), "World");
    }

    #[test]
    fn json_equality_ignores_number_representation() {
        let calls = Rc::new(Cell::new(0));
        let store = StoreBuilder::json(json!({"a": [1, 2], "b": {"c": 3}})).build();
        store.on_change({
            let calls = calls.clone();
            move |_, _| calls.set(calls.get() + 1)
        });

        store.set(json!({"b": {"c": 3.0}, "a": [1.0, 2]}));
        assert_eq!(calls.get(), 0);

        store.set(json!({"a": [1, 2], "b": {"c": 4}}));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    #[traced_test]
    fn unserializable_state_counts_as_changed() {
        let mut initial: HashMap<(u8, u8), u8> = HashMap::new();
        initial.insert((0, 0), 1);
        let store = StoreBuilder::json(initial.clone()).name("grid").build();

        store.set(initial);
        assert_eq!(store.version(), 1);
        assert!(logs_contain("state comparison failed"));
    }

    #[test]
    fn actions_share_the_built_store() {
        let store = StoreBuilder::new(1).build_with_actions(|handle| {
            move || handle.update(|n| n * 3)
        });
        (store.actions())();
        assert_eq!(store.get(), 3);
    }
}
