//! Delays a task until no newer task has been scheduled for a while.

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::task::JoinHandle;

/// Runs only the most recently scheduled task, once `delay` has passed
/// without another task being scheduled.
///
/// Used to rename the open document while the name is being typed without
/// writing to storage on every keystroke.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer that waits `delay` before running a task.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Run `task` after the delay, cancelling any task that has not run yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        if let Some(previous) = self.pending().replace(handle) {
            previous.abort();
        }
        tracing::debug!("Scheduled task to run in {delay:?}");
    }

    /// Cancel the pending task.
    ///
    /// Returns whether there was a task that had not run yet.
    pub fn cancel(&self) -> bool {
        match self.pending().take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Whether a scheduled task has yet to finish.
    pub fn is_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // A panic while holding this lock cannot leave the handle in a bad state.
    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use crate::session::debounce::Debouncer;

    const DELAY: Duration = Duration::from_millis(1000);

    fn counting_task(counter: Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_task_after_delay() {
        let debouncer = Debouncer::new(DELAY);
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(counter.clone(), 1));
        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(DELAY).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_task_runs() {
        let debouncer = Debouncer::new(DELAY);
        let counter = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        for value in 1..=3 {
            let runs = runs.clone();
            let task = counting_task(counter.clone(), value);
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                task.await;
            });
            tokio::time::sleep(DELAY / 4).await;
        }
        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_pending_task() {
        let debouncer = Debouncer::new(DELAY);
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(counter.clone(), 1));
        assert!(debouncer.cancel());
        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }
}
