//! Single-flight coordination of token refreshes
//!
//! At most one refresh is outstanding per coordinator, no matter how many
//! requests discover an expired token at the same time. The first caller
//! becomes the leader and performs the refresh; everyone arriving while it is
//! in flight is queued and receives the leader's outcome.
//!
//! ```text
//! caller A ──acquire_or_wait──► Leader ──refresh──► settle(outcome) ─┐
//! caller B ──acquire_or_wait──► Waiter ◄──────── outcome (FIFO) ◄────┤
//! caller C ──acquire_or_wait──► Waiter ◄──────── outcome (FIFO) ◄────┘
//! ```
//!
//! Clearing the in-flight flag and draining the queue happen in the same
//! critical section, so a new refresh can never start while waiters of the
//! previous one are still queued.

use std::collections::VecDeque;
use std::future::Future;

use authwire_domain::ApiError;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome delivered to every participant of one refresh
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Refresh coordinator owned by a client instance
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Result of [`RefreshCoordinator::acquire_or_wait`]
#[derive(Debug)]
pub enum RefreshTicket<'a> {
    /// Caller must perform the refresh and settle the lease
    Leader(RefreshLease<'a>),
    /// Caller must wait for the leader's outcome
    Waiter(RefreshWaiter),
}

impl RefreshCoordinator {
    /// Idle coordinator with no refresh in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the refresh leader or join the queue of waiters
    ///
    /// The check of the in-flight flag, its update and the enqueue decision
    /// are one atomic step.
    pub fn acquire_or_wait(&self) -> RefreshTicket<'_> {
        let mut state = self.state.lock();

        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(queued = state.waiters.len(), "Refresh in flight; queued waiter");
            RefreshTicket::Waiter(RefreshWaiter { rx })
        } else {
            state.refreshing = true;
            debug!("Acquired refresh lease");
            RefreshTicket::Leader(RefreshLease { coordinator: self, settled: false })
        }
    }

    /// Deliver `outcome` to every queued waiter and end the refresh
    ///
    /// # Returns
    /// Number of waiters that were still listening
    pub fn resolve_all(&self, outcome: &RefreshOutcome) -> usize {
        let mut state = self.state.lock();
        state.refreshing = false;

        let mut delivered = 0;
        while let Some(waiter) = state.waiters.pop_front() {
            // A closed receiver belongs to a caller that timed out or was
            // dropped; it no longer cares.
            if waiter.send(outcome.clone()).is_ok() {
                delivered += 1;
            }
        }

        debug!(delivered, success = outcome.is_ok(), "Refresh settled");
        delivered
    }

    /// Whether a leader currently holds the refresh lease
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of callers queued behind the current refresh
    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Run `refresh` under single-flight semantics
    ///
    /// The leader executes `refresh`, shares its outcome with every waiter
    /// and returns it. Waiters never call `refresh`.
    pub async fn run<F, Fut>(&self, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        match self.acquire_or_wait() {
            RefreshTicket::Leader(lease) => {
                let outcome = refresh().await;
                lease.settle(&outcome);
                outcome
            }
            RefreshTicket::Waiter(waiter) => waiter.wait().await,
        }
    }
}

/// Exclusive right to perform the current refresh
///
/// Dropping an unsettled lease (leader panicked or its future was cancelled)
/// rejects every waiter so nobody stays suspended forever.
#[derive(Debug)]
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Publish the refresh outcome to all waiters
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.resolve_all(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Refresh leader went away without settling; rejecting waiters");
            self.coordinator
                .resolve_all(&Err(ApiError::session_expired("token refresh was abandoned")));
        }
    }
}

/// Handle of a caller suspended on another task's refresh
#[derive(Debug)]
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    /// Wait for the leader to settle; a dropped lease counts as failure
    pub async fn wait(self) -> RefreshOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| Err(ApiError::session_expired("token refresh was abandoned")))
    }
}
