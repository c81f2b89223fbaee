//! Bounded worker pool shared by all concurrently running algorithm
//! invocations.
//!
//! One pool serves the whole process so the total number of algorithm
//! threads stays capped no matter how many requests arrive. There is no
//! backlog: a submission is handed directly to an idle worker, spins up a
//! new worker while below capacity, and otherwise blocks the submitter.
//! Idle workers retire after an inactivity window. Task faults are captured
//! on the task's own handle and never take down the pool or sibling tasks.
//!
//! The pool is an explicit service object constructed at process start and
//! passed by reference to request handlers; there is no hidden global.

use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::{Error, Result};

/// Workers allowed per unit of hardware parallelism.
pub const WORKERS_PER_CORE: usize = 10;

/// How long an idle worker waits for a hand-off before retiring.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cooperative cancellation signal checked by long-running searches at safe
/// points. A token trips when its own task is cancelled or when the whole
/// pool is halted via [`WorkerPool::shutdown_now`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    own: Arc<AtomicBool>,
    pool: Arc<AtomicBool>,
}

impl CancelToken {
    /// A free-standing token, for running algorithms outside the pool.
    pub fn new() -> Self {
        Self::default()
    }

    fn scoped(pool: Arc<AtomicBool>) -> Self {
        Self {
            own: Arc::new(AtomicBool::new(false)),
            pool,
        }
    }

    pub fn cancel(&self) {
        self.own.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.own.load(Ordering::SeqCst) || self.pool.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct TaskShared<R> {
    slot: Mutex<Option<Result<R>>>,
    done: Condvar,
    token: CancelToken,
}

/// Future-like handle to one submitted task.
#[derive(Debug)]
pub struct TaskHandle<R> {
    shared: Arc<TaskShared<R>>,
}

impl<R> TaskHandle<R> {
    /// Blocks until the task finishes and yields its outcome. A panic
    /// inside the task surfaces here as [`Error::TaskFailed`].
    pub fn wait(self) -> Result<R> {
        let mut slot = lock(&self.shared.slot);
        loop {
            if let Some(outcome) = slot.take() {
                return outcome;
            }
            slot = self
                .shared
                .done
                .wait(slot)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Waits up to `timeout` for the task to finish. `None` means it is
    /// still running; `Some` consumes the outcome.
    pub fn wait_for(&self, timeout: Duration) -> Option<Result<R>> {
        let deadline = Instant::now() + timeout;
        let mut slot = lock(&self.shared.slot);
        loop {
            if let Some(outcome) = slot.take() {
                return Some(outcome);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .shared
                .done
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            slot = guard;
        }
    }

    /// Requests cancellation. The running task observes it at its next safe
    /// point; a task that has not started yet completes with
    /// [`Error::Cancelled`] without running.
    pub fn cancel(&self) {
        self.shared.token.cancel();
    }
}

struct Counts {
    workers: usize,
    active: usize,
}

struct PoolInner {
    sender: Mutex<Option<Sender<Job>>>,
    receiver: Receiver<Job>,
    capacity: usize,
    counts: Mutex<Counts>,
    quiescent: Condvar,
    shutdown: AtomicBool,
    halt: Arc<AtomicBool>,
}

/// Process-wide bounded execution service for algorithm tasks.
///
/// Capacity is fixed at construction. Workers are created on demand up to
/// the cap and retire after 60 seconds of inactivity, so a quiet server
/// holds no threads at all.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// A pool sized at [`WORKERS_PER_CORE`] times the available hardware
    /// parallelism.
    pub fn new() -> Self {
        let cores = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_capacity(cores * WORKERS_PER_CORE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // Rendezvous channel: a send completes only when a worker is
        // already waiting on the other side, so no backlog can form.
        let (sender, receiver) = bounded(0);
        Self {
            inner: Arc::new(PoolInner {
                sender: Mutex::new(Some(sender)),
                receiver,
                capacity,
                counts: Mutex::new(Counts {
                    workers: 0,
                    active: 0,
                }),
                quiescent: Condvar::new(),
                shutdown: AtomicBool::new(false),
                halt: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Runs `task` on a pool worker. Blocks the submitter when every worker
    /// is busy and the pool is at capacity; capacity exhaustion is never an
    /// error. Fails with [`Error::PoolClosed`] after shutdown.
    pub fn submit<R, F>(&self, task: F) -> Result<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<R> + Send + 'static,
    {
        if self.is_shutdown() {
            return Err(Error::PoolClosed);
        }
        let shared = Arc::new(TaskShared {
            slot: Mutex::new(None),
            done: Condvar::new(),
            token: CancelToken::scoped(Arc::clone(&self.inner.halt)),
        });
        let handle = TaskHandle {
            shared: Arc::clone(&shared),
        };
        let job: Job = Box::new(move || {
            let outcome = if shared.token.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                match catch_unwind(AssertUnwindSafe(|| task(&shared.token))) {
                    Ok(result) => result,
                    Err(payload) => Err(Error::TaskFailed(panic_message(payload.as_ref()))),
                }
            };
            *lock(&shared.slot) = Some(outcome);
            shared.done.notify_all();
        });
        self.dispatch(job)?;
        Ok(handle)
    }

    /// Submits every task and waits for all of them. Outcomes are reported
    /// per task, in submission order.
    pub fn run_all<R, F>(&self, tasks: Vec<F>) -> Result<Vec<Result<R>>>
    where
        R: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<R> + Send + 'static,
    {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            handles.push(self.submit(task)?);
        }
        Ok(handles.into_iter().map(TaskHandle::wait).collect())
    }

    /// Returns the first successful outcome and cancels the rest. With a
    /// deadline, an elapsed timer cancels everything and yields
    /// [`Error::Timeout`]. If no task succeeds, the last failure is
    /// reported.
    pub fn run_any<R, F>(&self, tasks: Vec<F>, timeout: Option<Duration>) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<R> + Send + 'static,
    {
        let total = tasks.len();
        let (result_tx, result_rx) = bounded::<Result<R>>(total.max(1));
        let mut handles = Vec::with_capacity(total);
        for task in tasks {
            let result_tx = result_tx.clone();
            handles.push(self.submit(move |token: &CancelToken| {
                let _ = result_tx.send(task(token));
                Ok(())
            })?);
        }
        drop(result_tx);

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut last_failure = Error::TaskFailed("no task produced a result".into());
        let mut seen = 0;
        while seen < total {
            let message = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    result_rx.recv_timeout(deadline - now).ok()
                }
                None => result_rx.recv().ok(),
            };
            match message {
                Some(Ok(value)) => {
                    for handle in &handles {
                        handle.cancel();
                    }
                    return Ok(value);
                }
                Some(Err(failure)) => {
                    seen += 1;
                    last_failure = failure;
                }
                // Timed out, or every remaining task panicked and dropped
                // its sender.
                None => break,
            }
        }
        for handle in &handles {
            handle.cancel();
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::Timeout);
        }
        Err(last_failure)
    }

    /// Stops accepting new work. In-flight tasks run to completion; idle
    /// workers retire immediately.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        // Dropping the sender disconnects idle receivers right away instead
        // of letting them sit out the idle timeout.
        *lock(&self.inner.sender) = None;
    }

    /// [`Self::shutdown`] plus a halt signal to every in-flight task's
    /// cancel token.
    pub fn shutdown_now(&self) {
        self.inner.halt.store(true, Ordering::SeqCst);
        self.shutdown();
    }

    /// Blocks until the pool is shut down and every worker has exited, or
    /// the timeout elapses. Returns whether quiescence was reached.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut counts = lock(&self.inner.counts);
        while !(self.is_shutdown() && counts.workers == 0 && counts.active == 0) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .inner
                .quiescent
                .wait_timeout(counts, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            counts = guard;
        }
        true
    }

    fn dispatch(&self, job: Job) -> Result<()> {
        let sender = match lock(&self.inner.sender).as_ref() {
            Some(sender) => sender.clone(),
            None => return Err(Error::PoolClosed),
        };
        match sender.try_send(job) {
            // An idle worker took the hand-off.
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                if self.try_reserve_worker() {
                    self.spawn_worker(job)
                } else {
                    // At capacity: block until a worker frees up.
                    sender.send(job).map_err(|_| Error::PoolClosed)
                }
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::PoolClosed),
        }
    }

    fn try_reserve_worker(&self) -> bool {
        let mut counts = lock(&self.inner.counts);
        if counts.workers < self.inner.capacity {
            counts.workers += 1;
            true
        } else {
            false
        }
    }

    fn spawn_worker(&self, initial: Job) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("pool-worker".into())
            .spawn(move || worker_loop(&inner, initial));
        match spawned {
            Ok(_) => Ok(()),
            Err(e) => {
                let mut counts = lock(&self.inner.counts);
                counts.workers -= 1;
                self.inner.quiescent.notify_all();
                Err(Error::TaskFailed(format!("failed to spawn worker: {e}")))
            }
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

fn worker_loop(inner: &PoolInner, initial: Job) {
    run_job(inner, initial);
    // Stay around for more hand-offs; retire after the idle window or as
    // soon as the pool disconnects the channel on shutdown.
    while let Ok(job) = inner.receiver.recv_timeout(IDLE_TIMEOUT) {
        run_job(inner, job);
    }
    let mut counts = lock(&inner.counts);
    counts.workers -= 1;
    inner.quiescent.notify_all();
}

fn run_job(inner: &PoolInner, job: Job) {
    lock(&inner.counts).active += 1;
    job();
    lock(&inner.counts).active -= 1;
    inner.quiescent.notify_all();
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_owned()
    }
}

/// Poisoning only happens if a panic escapes a critical section, and no job
/// runs while holding a pool lock, so recovering the guard is sound.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
