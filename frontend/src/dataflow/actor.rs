//! Single-value state owner with its own processing task.

use std::future::Future;
use std::sync::Arc;
use zoon::{Mutable, Signal, Task, TaskHandle};

/// Observable state mutated only by its processing task.
///
/// The processor receives the backing `Mutable` and usually loops over one or
/// more relay streams (user events, timer ticks). Views subscribe through
/// [`Actor::signal`]. Dropping every clone of the actor aborts the task.
///
/// ```rust
/// let (badge_refresh_requested_relay, mut refresh_stream) = relay();
/// let counts = Actor::new(PendingCounts::default(), async move |state| {
///     while let Some(force) = refresh_stream.next().await {
///         if let Some(fresh) = fetch_counts(force).await {
///             state.set_neq(fresh);
///         }
///     }
/// });
/// ```
#[derive(Clone)]
pub struct Actor<T>
where
    T: Clone + 'static,
{
    state: Mutable<T>,
    #[allow(dead_code)]
    task_handle: Arc<TaskHandle>,
}

impl<T> Actor<T>
where
    T: Clone + 'static,
{
    pub fn new<F, Fut>(initial_state: T, processor: F) -> Self
    where
        F: FnOnce(Mutable<T>) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let state = Mutable::new(initial_state);
        let task_handle = Arc::new(Task::start_droppable(processor(state.clone())));
        Self { state, task_handle }
    }

    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        self.state.signal_cloned()
    }
}
