//! Counter application built from a store and composed actions

use observable_store::{StoreBuilder, StoreHandle};

#[derive(Clone, Debug, PartialEq)]
struct CounterState {
    count: i32,
    step: i32,
    history: Vec<i32>,
}

impl CounterState {
    fn new() -> Self {
        Self {
            count: 0,
            step: 1,
            history: vec![0],
        }
    }
}

struct CounterActions {
    store: StoreHandle<CounterState>,
}

impl CounterActions {
    fn increment(&self) {
        self.store.modify(|state| {
            state.count += state.step;
            state.history.push(state.count);
        });
    }

    fn decrement(&self) {
        self.store.modify(|state| {
            state.count -= state.step;
            state.history.push(state.count);
        });
    }

    fn set_step(&self, step: i32) {
        self.store.modify(|state| state.step = step);
    }

    fn reset(&self) {
        self.store.modify(|state| {
            state.count = 0;
            state.history.push(0);
        });
    }
}

fn main() {
    println!("=== Counter Application ===\n");

    println!("1. Initializing counter store with actions");
    let counter = StoreBuilder::new(CounterState::new())
        .name("counter")
        .build_with_actions(|store| CounterActions { store });

    // Log every change
    counter.on_change(|state: &CounterState, _: &CounterState| {
        println!("   [State] Count: {}, Step: {}", state.count, state.step);
    });

    // Derived views only react to the values they depend on
    counter.on_change_with_deps(
        |state: &CounterState, prev: &CounterState| {
            println!(
                "   [Sign] {} -> {}",
                sign(prev.count),
                sign(state.count)
            );
        },
        |state: &CounterState| state.count.signum(),
    );
    counter.on_change_with_deps(
        |state: &CounterState, _: &CounterState| {
            println!("   [Step] now {}", state.step);
        },
        |state: &CounterState| state.step,
    );

    let actions = counter.actions();

    println!("\n2. Incrementing...");
    actions.increment();
    actions.increment();
    actions.increment();

    println!("\n3. Changing step size to 5");
    actions.set_step(5);
    actions.set_step(5);

    println!("\n4. Incrementing with new step...");
    actions.increment();

    println!("\n5. Decrementing...");
    actions.decrement();
    actions.decrement();
    actions.decrement();

    println!("\n6. History:");
    counter.read(|state| {
        println!("   {:?}", state.history);
    });

    println!("\n7. Resetting...");
    actions.reset();

    println!("\n8. Final history:");
    counter.read(|state| {
        println!("   {:?}", state.history);
    });

    println!("\nApplied {} changes", counter.version());
}

fn sign(n: i32) -> &'static str {
    match n.signum() {
        1 => "positive",
        -1 => "negative",
        _ => "zero",
    }
}
