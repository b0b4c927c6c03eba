use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A deferred task that runs once after a delay.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a task later. Returns a token that cancels it.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> ScheduledTask;
}

/// Cancellation token for a scheduled task.
///
/// Cancelling after the task already ran is a no-op. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    abort: Option<tokio::task::AbortHandle>,
}

impl ScheduledTask {
    /// A token not yet bound to any running timer.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scheduler backed by the ambient tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> ScheduledTask {
        let mut token = ScheduledTask::detached();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // Callers that also check expiry lazily stay correct without the timer.
            warn!("No tokio runtime; task scheduled in {delay:?} will not run");
            return token;
        };

        let cancelled = Arc::clone(&token.cancelled);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !cancelled.load(Ordering::SeqCst) {
                task();
            }
        });
        token.abort = Some(handle.abort_handle());
        token
    }
}
