//! One-shot review timers
//!
//! Each submitted package gets a timer that fires its review once. Timers
//! are children of a root [`CancellationToken`]: cancelling one package's
//! timer leaves the others running, cancelling the root stops them all.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::PackageId;

/// A scheduled timer; `generation` tells a replaced timer from its successor
struct PendingTimer {
    generation: u64,
    token: CancellationToken,
}

type PendingTimers = Arc<Mutex<HashMap<PackageId, PendingTimer>>>;

fn lock(pending: &PendingTimers) -> MutexGuard<'_, HashMap<PackageId, PendingTimer>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drop the entry of `id` if it still belongs to timer `generation`
fn release(pending: &PendingTimers, id: PackageId, generation: u64) {
    let mut timers = lock(pending);
    if timers.get(&id).is_some_and(|t| t.generation == generation) {
        timers.remove(&id);
    }
}

pub(crate) struct ReviewScheduler {
    root: CancellationToken,
    pending: PendingTimers,
    generations: AtomicU64,
}

impl ReviewScheduler {
    pub(crate) fn new(root: CancellationToken) -> Self {
        Self {
            root,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
        }
    }

    /// Run `on_fire` once, `delay` from now, unless cancelled first
    ///
    /// Scheduling an id that already has a timer replaces that timer.
    pub(crate) fn schedule<F, Fut>(&self, id: PackageId, delay: Duration, on_fire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.root.child_token();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let timer = PendingTimer {
            generation,
            token: token.clone(),
        };
        if let Some(previous) = lock(&self.pending).insert(id, timer) {
            previous.token.cancel();
        }

        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    release(&pending, id, generation);
                    debug!(package_id = %id, "Review timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    release(&pending, id, generation);
                    on_fire().await;
                }
            }
        });
    }

    /// Cancel the timer of `id`; false when none was pending
    pub(crate) fn cancel(&self, id: PackageId) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(timer) => {
                timer.token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) {
        self.root.cancel();
        lock(&self.pending).clear();
    }

    pub(crate) fn is_scheduled(&self, id: PackageId) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    pub(crate) fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Drop for ReviewScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
