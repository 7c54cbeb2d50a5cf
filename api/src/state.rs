use dispatcher::Dispatcher;
use once_cell::sync::OnceCell;

// Hold the Dispatcher in a global static for shared access across handlers
// and the watcher task.
static DISPATCHER: OnceCell<Dispatcher> = OnceCell::new();

/// Initialize the global dispatcher - called once at startup.
pub fn init_dispatcher(max_concurrent: usize) {
    if DISPATCHER.set(Dispatcher::new(max_concurrent)).is_err() {
        tracing::warn!("Dispatcher was already initialized");
    }
}

/// The global dispatcher.
///
/// # Panics
/// Panics if [`init_dispatcher`] has not been called.
pub fn dispatcher() -> &'static Dispatcher {
    DISPATCHER.get().expect("Dispatcher not initialized")
}
