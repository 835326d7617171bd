//! Serial navigation queue.
//!
//! Screens request transitions independently (bootstrap, PIN unlock, session
//! changes). Handing those straight to the platform router lets two
//! transitions run on top of each other and leaves the screen stack in a
//! half-animated state. Every request therefore goes through a FIFO drained
//! by a single worker task, with a settle delay on either side of each
//! router call.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::intent::{Destination, NavigationIntent, TransitionMode};
use crate::collaborators::ViewRouter;
use crate::error::GateError;
use crate::storage::GateSettings;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<NavigationIntent>,
    /// Popped by the worker but still inside the first settle delay.
    /// `clear()` resets this, which drops the intent before it reaches the router.
    claimed: Option<NavigationIntent>,
    /// Inside the router call or the trailing settle delay.
    executing: Option<NavigationIntent>,
    /// Destination of the most recent intent that reached the router.
    last_started: Option<Destination>,
}

impl QueueState {
    fn is_busy(&self) -> bool {
        self.claimed.is_some() || self.executing.is_some() || !self.pending.is_empty()
    }

    fn latest_destination(&self) -> Option<Destination> {
        self.pending
            .back()
            .or(self.claimed.as_ref())
            .or(self.executing.as_ref())
            .map(|intent| intent.destination.clone())
            .or_else(|| self.last_started.clone())
    }

    fn is_claimed(&self, id: Uuid) -> bool {
        self.claimed.as_ref().is_some_and(|intent| intent.id == id)
    }
}

struct Shared {
    state: Mutex<QueueState>,
    /// Wakes the worker after an enqueue.
    wake: Notify,
    /// Signalled whenever the worker runs out of work.
    idle: Notify,
    router: Arc<dyn ViewRouter>,
    settle_before: Duration,
    settle_after: Duration,
}

/// Aborts the drain worker once the last serializer handle is gone.
struct DrainWorker(JoinHandle<()>);

impl Drop for DrainWorker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle to the process-wide navigation queue.
///
/// Cheap to clone; all clones feed the same queue. Must be created inside a
/// tokio runtime since it spawns its drain worker immediately.
#[derive(Clone)]
pub struct NavigationSerializer {
    shared: Arc<Shared>,
    _worker: Arc<DrainWorker>,
}

impl NavigationSerializer {
    pub fn spawn(router: Arc<dyn ViewRouter>, settings: &GateSettings) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            wake: Notify::new(),
            idle: Notify::new(),
            router,
            settle_before: settings.settle_before(),
            settle_after: settings.settle_after(),
        });

        let worker = tokio::spawn(drain(shared.clone()));
        debug!(
            "Navigation serializer started (settle {:?} / {:?})",
            shared.settle_before, shared.settle_after
        );

        Self {
            shared,
            _worker: Arc::new(DrainWorker(worker)),
        }
    }

    /// Queue a transition to `destination`.
    ///
    /// Malformed destinations are dropped with a warning rather than queued.
    pub async fn enqueue(&self, destination: &str, mode: TransitionMode) {
        match Destination::new(destination) {
            Ok(destination) => {
                self.enqueue_intent(NavigationIntent::new(destination, mode))
                    .await;
            }
            Err(e) => warn!("Ignoring navigation request: {}", e),
        }
    }

    pub async fn enqueue_intent(&self, intent: NavigationIntent) {
        let depth = {
            let mut state = self.shared.state.lock().await;
            state.pending.push_back(intent.clone());
            state.pending.len()
        };
        debug!(
            "Queued {} ({}) as {} [depth {}]",
            intent.destination, intent.mode, intent.id, depth
        );
        self.shared.wake.notify_one();
    }

    /// Drop every intent that has not reached the router yet.
    ///
    /// A transition already handed to the router runs to completion.
    pub async fn clear(&self) {
        let mut state = self.shared.state.lock().await;
        let dropped = state.pending.len() + usize::from(state.claimed.is_some());
        state.pending.clear();
        state.claimed = None;
        if dropped > 0 {
            debug!("Cleared {} pending navigation intent(s)", dropped);
        }
    }

    pub async fn is_busy(&self) -> bool {
        self.shared.state.lock().await.is_busy()
    }

    /// Where the screen stack is headed: the newest queued intent, else the
    /// one in flight, else the last one handed to the router.
    pub async fn latest_destination(&self) -> Option<Destination> {
        self.shared.state.lock().await.latest_destination()
    }

    /// Wait until the queue is drained and nothing is executing.
    pub async fn idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if !self.is_busy().await {
                return;
            }
            notified.await;
        }
    }
}

async fn drain(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut state = shared.state.lock().await;
            let next = state.pending.pop_front();
            state.claimed = next.clone();
            next
        };

        let Some(intent) = next else {
            shared.idle.notify_waiters();
            shared.wake.notified().await;
            continue;
        };

        tokio::time::sleep(shared.settle_before).await;

        {
            let mut state = shared.state.lock().await;
            if !state.is_claimed(intent.id) {
                debug!("Dropping cleared intent {} ({})", intent.id, intent.destination);
                continue;
            }
            state.executing = state.claimed.take();
            state.last_started = Some(intent.destination.clone());
        }

        execute(shared.router.as_ref(), &intent).await;
        tokio::time::sleep(shared.settle_after).await;

        shared.state.lock().await.executing = None;
    }
}

/// Run one intent against the router. Failures are logged and swallowed so
/// the queue keeps moving; a failed transition is never retried.
async fn execute(router: &dyn ViewRouter, intent: &NavigationIntent) {
    debug!("Navigating to {} ({})", intent.destination, intent.mode);

    let outcome = AssertUnwindSafe(router.navigate_to(&intent.destination, intent.mode))
        .catch_unwind()
        .await;

    let failure = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => GateError::Navigation(format!("{:#}", e)),
        Err(payload) => GateError::from_panic(payload),
    };
    error!(
        "Navigation to {} failed, skipping: {}",
        intent.destination, failure
    );
}
