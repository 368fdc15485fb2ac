//! Store example with complex state

use observable_store::create_store;

#[derive(Clone, Debug, PartialEq)]
struct TodoItem {
    id: usize,
    text: String,
    completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct AppState {
    todos: Vec<TodoItem>,
    filter: String,
}

fn main() {
    println!("=== Store Example ===\n");

    // Create a store with initial state
    let store = create_store(AppState {
        todos: vec![],
        filter: "all".to_string(),
    });

    // Observe every change
    store.on_change(|state: &AppState, _prev: &AppState| {
        println!(
            "State updated! Active todos: {}",
            state.todos.iter().filter(|t| !t.completed).count()
        );
    });

    // Observe only the filter
    store.on_change_with_deps(
        |state: &AppState, prev: &AppState| {
            println!("Filter changed: {} -> {}", prev.filter, state.filter);
        },
        |state: &AppState| state.filter.clone(),
    );

    // Add a todo
    println!("Adding todo...");
    store.modify(|state| {
        state.todos.push(TodoItem {
            id: 1,
            text: "Learn observable-store".to_string(),
            completed: false,
        });
    });

    // Writing the same state again is not a change
    println!("\nRe-setting identical state...");
    store.set(store.get());

    // Complete the todo
    println!("\nCompleting todo...");
    store.modify(|state| {
        if let Some(todo) = state.todos.iter_mut().find(|t| t.id == 1) {
            todo.completed = true;
        }
    });

    // Switch the filter
    println!("\nShowing completed...");
    store.modify(|state| state.filter = "completed".to_string());

    // Read final state
    println!("\nFinal state: {:#?}", store.get());
}
