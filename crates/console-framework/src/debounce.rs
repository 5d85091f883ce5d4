//! Quiet-window debounce for search and filter inputs.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Runs only the last task scheduled within a quiet window.
///
/// Every [`Debouncer::schedule`] call restarts the window. A task whose
/// window elapses after a newer call was made is dropped without running.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn schedule<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == ticket {
                task().await;
            } else {
                trace!(ticket, "Debounced input superseded");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_input_in_the_window_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let ran = Arc::new(Mutex::new(Vec::new()));

        for query in ["a", "al", "ali"] {
            let ran = ran.clone();
            debouncer.schedule(move || async move {
                ran.lock().unwrap().push(query);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["ali"]);

        let late = ran.clone();
        debouncer.schedule(move || async move {
            late.lock().unwrap().push("alice");
        });
        tokio::time::sleep(Duration::from_millis(301)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["ali", "alice"]);
    }
}
