//! Concurrency coordinator
//!
//! Two small primitives keep turns and the idle hint in step:
//!
//! - [`TrackedPool`] hands out completion handles for in-flight animations.
//!   The engine awaits the [`Tracked`] half; the animator settles the
//!   [`Completion`] half. Teardown can settle everything still pending.
//! - [`BusyGate`] counts busy sections and lets tasks wait for the count to
//!   reach zero or to leave zero.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};

use futures::future::try_join_all;
use tokio::sync::{oneshot, watch};

/// A tracked operation was failed instead of completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("tracked operation was cancelled")]
pub struct Cancelled;

/// The gate was closed while waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("busy gate closed")]
pub struct GateClosed;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct PoolInner {
    next_key: u64,
    pending: HashMap<u64, oneshot::Sender<()>>,
}

/// Registry of operations that have started but not finished.
#[derive(Debug, Clone, Default)]
pub struct TrackedPool {
    inner: Arc<Mutex<PoolInner>>,
}

impl TrackedPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new operation.
    pub fn track(&self) -> (Completion, Tracked) {
        let (tx, rx) = oneshot::channel();
        let key = {
            let mut inner = lock(&self.inner);
            let key = inner.next_key;
            inner.next_key = inner.next_key.wrapping_add(1);
            inner.pending.insert(key, tx);
            key
        };
        (
            Completion {
                key,
                pool: Arc::downgrade(&self.inner),
            },
            Tracked { rx },
        )
    }

    /// Operations registered and not yet settled.
    pub fn pending(&self) -> usize {
        lock(&self.inner).pending.len()
    }

    /// Complete every pending operation. Returns how many were pending.
    pub fn resolve_all(&self) -> usize {
        let senders: Vec<_> = lock(&self.inner).pending.drain().map(|(_, tx)| tx).collect();
        let count = senders.len();
        for tx in senders {
            let _ = tx.send(());
        }
        count
    }

    /// Fail every pending operation. Returns how many were pending.
    pub fn fail_all(&self) -> usize {
        let senders: Vec<_> = lock(&self.inner).pending.drain().collect();
        senders.len()
    }

    /// Wait for a group of operations; fails if any of them was cancelled.
    pub async fn join<I>(tracked: I) -> Result<(), Cancelled>
    where
        I: IntoIterator<Item = Tracked>,
    {
        try_join_all(tracked).await.map(|_| ())
    }
}

/// The animator's half of a tracked operation.
///
/// Call [`complete`](Completion::complete) when the operation finishes.
/// Dropping it without completing cancels the operation.
#[derive(Debug)]
pub struct Completion {
    key: u64,
    pool: Weak<Mutex<PoolInner>>,
}

impl Completion {
    /// A completion not attached to any pool.
    pub fn detached() -> Self {
        Self {
            key: 0,
            pool: Weak::new(),
        }
    }

    pub fn complete(self) {
        if let Some(tx) = self.take() {
            let _ = tx.send(());
        }
    }

    fn take(&self) -> Option<oneshot::Sender<()>> {
        let pool = self.pool.upgrade()?;
        let tx = lock(&pool).pending.remove(&self.key);
        tx
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        drop(self.take());
    }
}

/// The engine's half of a tracked operation.
#[derive(Debug)]
#[must_use = "a tracked operation does nothing unless awaited"]
pub struct Tracked {
    rx: oneshot::Receiver<()>,
}

impl Future for Tracked {
    type Output = Result<(), Cancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|r| r.map_err(|_| Cancelled))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GateState {
    busy: usize,
    closed: bool,
    /// Incremented on every busy -> free transition
    became_free: u64,
    /// Incremented on every free -> busy transition
    became_busy: u64,
}

/// Counter of busy sections with waitable transitions.
#[derive(Debug, Clone)]
pub struct BusyGate {
    state: Arc<watch::Sender<GateState>>,
}

impl Default for BusyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GateState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Start a busy section; it ends when the guard drops.
    pub fn enter(&self) -> BusyGuard {
        self.state.send_modify(|s| {
            s.busy += 1;
            if s.busy == 1 {
                s.became_busy = s.became_busy.wrapping_add(1);
            }
        });
        BusyGuard {
            state: Arc::clone(&self.state),
        }
    }

    pub fn busy_count(&self) -> usize {
        self.state.borrow().busy
    }

    pub fn is_free(&self) -> bool {
        self.busy_count() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Release every waiter with [`GateClosed`]. Later waits fail immediately.
    pub fn close(&self) {
        self.state.send_modify(|s| s.closed = true);
    }

    /// Resolves at the next transition to zero busy sections after this call.
    pub fn next_free(&self) -> impl Future<Output = Result<(), GateClosed>> + Send + 'static {
        let mut rx = self.state.subscribe();
        let seen = rx.borrow_and_update().became_free;
        wait(rx, move |s| s.became_free != seen)
    }

    /// Resolves at the next transition away from zero busy sections after this call.
    pub fn next_busy(&self) -> impl Future<Output = Result<(), GateClosed>> + Send + 'static {
        let mut rx = self.state.subscribe();
        let seen = rx.borrow_and_update().became_busy;
        wait(rx, move |s| s.became_busy != seen)
    }

    /// Resolves once nothing is busy; immediately if that is already so.
    pub fn until_free(&self) -> impl Future<Output = Result<(), GateClosed>> + Send + 'static {
        wait(self.state.subscribe(), |s| s.busy == 0)
    }

    /// Resolves once something is busy; immediately if that is already so.
    pub fn until_busy(&self) -> impl Future<Output = Result<(), GateClosed>> + Send + 'static {
        wait(self.state.subscribe(), |s| s.busy > 0)
    }

    /// Resolves when the gate is closed.
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.state.subscribe();
        async move {
            let _ = rx.wait_for(|s| s.closed).await;
        }
    }
}

async fn wait<F>(mut rx: watch::Receiver<GateState>, mut ready: F) -> Result<(), GateClosed>
where
    F: FnMut(&GateState) -> bool + Send,
{
    let closed = rx
        .wait_for(|s| s.closed || ready(s))
        .await
        .map_err(|_| GateClosed)?
        .closed;
    if closed {
        Err(GateClosed)
    } else {
        Ok(())
    }
}

/// One busy section of a [`BusyGate`].
#[derive(Debug)]
#[must_use = "the busy section ends when the guard is dropped"]
pub struct BusyGuard {
    state: Arc<watch::Sender<GateState>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.busy = s.busy.saturating_sub(1);
            if s.busy == 0 {
                s.became_free = s.became_free.wrapping_add(1);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, assert_ready_err, assert_ready_ok, task};

    #[test]
    fn completion_resolves_tracked() {
        let pool = TrackedPool::new();
        let (done, tracked) = pool.track();
        let mut tracked = task::spawn(tracked);
        assert_pending!(tracked.poll());
        assert_eq!(pool.pending(), 1);

        done.complete();
        assert!(tracked.is_woken());
        assert_ready_ok!(tracked.poll());
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn dropped_completion_cancels() {
        let pool = TrackedPool::new();
        let (done, tracked) = pool.track();
        let mut tracked = task::spawn(tracked);
        drop(done);
        assert_eq!(assert_ready!(tracked.poll()), Err(Cancelled));
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn resolve_all_settles_everything() {
        let pool = TrackedPool::new();
        let (_a, ta) = pool.track();
        let (_b, tb) = pool.track();
        assert_eq!(pool.resolve_all(), 2);

        let mut joined = task::spawn(TrackedPool::join([ta, tb]));
        assert_ready_ok!(joined.poll());
    }

    #[test]
    fn fail_all_cancels_group() {
        let pool = TrackedPool::new();
        let (_a, ta) = pool.track();
        let (b, tb) = pool.track();
        b.complete();
        assert_eq!(pool.fail_all(), 1);

        let mut joined = task::spawn(TrackedPool::join([ta, tb]));
        assert_ready_err!(joined.poll());
    }

    #[test]
    fn detached_completion_is_inert() {
        Completion::detached().complete();
    }

    #[test]
    fn free_fires_only_after_last_release() {
        let gate = BusyGate::new();
        let first = gate.enter();
        let second = gate.enter();
        assert_eq!(gate.busy_count(), 2);

        let mut free = task::spawn(gate.next_free());
        assert_pending!(free.poll());

        drop(first);
        assert_pending!(free.poll());

        drop(second);
        assert!(free.is_woken());
        assert_ready_ok!(free.poll());
    }

    #[test]
    fn next_busy_ignores_current_state() {
        let gate = BusyGate::new();
        let _held = gate.enter();

        let mut next = task::spawn(gate.next_busy());
        assert_pending!(next.poll());

        let mut until = task::spawn(gate.until_busy());
        assert_ready_ok!(until.poll());
    }

    #[test]
    fn next_busy_fires_on_first_entry() {
        let gate = BusyGate::new();
        let mut busy = task::spawn(gate.next_busy());
        assert_pending!(busy.poll());

        let guard = gate.enter();
        assert_ready_ok!(busy.poll());
        drop(guard);
    }

    #[test]
    fn until_free_is_immediate_when_idle() {
        let gate = BusyGate::new();
        let mut free = task::spawn(gate.until_free());
        assert_ready_ok!(free.poll());
    }

    #[test]
    fn close_releases_waiters() {
        let gate = BusyGate::new();
        let _held = gate.enter();
        let mut free = task::spawn(gate.until_free());
        let mut closed = task::spawn(gate.closed());
        assert_pending!(free.poll());
        assert_pending!(closed.poll());

        gate.close();
        assert_eq!(assert_ready!(free.poll()), Err(GateClosed));
        assert_ready!(closed.poll());
        assert!(gate.is_closed());
    }
}
