//! Data-fetch controller
//!
//! A [`FetchHandle`] owns one asynchronous producer and publishes its
//! `{data, loading, error}` state through a `watch` channel. A new execution
//! cancels the one still in flight, so the last caller always wins. Executions
//! that were superseded or outlived [`FetchHandle::unmount`] never touch state.

use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use sensus_client::ClientError;
use sensus_core::config::FetchConfig;
use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default execution deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type Producer<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;
type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&ClientError, &str) + Send + Sync>;

/// Observable state of a fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Result of the latest successful execution
    pub data: Option<T>,

    /// An execution is in flight
    pub loading: bool,

    /// Message of the latest failed execution
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Options for a [`FetchHandle`]
pub struct FetchOptions<T> {
    immediate: bool,
    timeout: Duration,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> FetchOptions<T> {
    /// Immediate execution on mount, 30 second deadline, no callbacks
    pub fn new() -> Self {
        Self {
            immediate: true,
            timeout: DEFAULT_TIMEOUT,
            on_success: None,
            on_error: None,
        }
    }

    /// Options taken from the `fetch` configuration section
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new()
            .immediate(config.immediate)
            .timeout(config.timeout())
    }

    /// Whether [`FetchHandle::mount`] starts an execution
    #[must_use]
    pub const fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Deadline after which an execution fails with a timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Called with the new data after every successful execution
    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Called with the error and its display message after every failure
    #[must_use]
    pub fn on_error(mut self, callback: impl Fn(&ClientError, &str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl<T> Default for FetchOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FetchOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("immediate", &self.immediate)
            .field("timeout", &self.timeout)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// The execution allowed to write state
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

struct Inner<T> {
    producer: Producer<T>,
    options: FetchOptions<T>,
    state: watch::Sender<FetchState<T>>,
    slot: Mutex<Slot>,
    mounted: AtomicBool,
    lifetime: CancellationToken,
}

enum Outcome<T> {
    Done(Result<T, ClientError>),
    TimedOut,
    Aborted,
}

/// Controller for one asynchronous producer
pub struct FetchHandle<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for FetchHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for FetchHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("options", &self.inner.options)
            .field("generation", &self.inner.slot.lock().generation)
            .field("unmounted", &self.inner.lifetime.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T> FetchHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a producer; nothing runs until [`mount`](Self::mount) or
    /// [`refetch`](Self::refetch)
    pub fn new<F, Fut>(producer: F, options: FetchOptions<T>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let producer: Producer<T> = Arc::new(move || producer().boxed());
        // Loading from the start when the first execution is already scheduled
        let (state, _) = watch::channel(FetchState {
            loading: options.immediate,
            ..FetchState::default()
        });
        Self {
            inner: Arc::new(Inner {
                producer,
                options,
                state,
                slot: Mutex::new(Slot::default()),
                mounted: AtomicBool::new(false),
                lifetime: CancellationToken::new(),
            }),
        }
    }

    /// Start the initial execution when `immediate` is set
    ///
    /// Only the first call can start it; later calls return `None`.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if !self.inner.options.immediate || self.inner.mounted.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.refetch())
    }

    /// Start a new execution on the runtime, cancelling the one in flight
    ///
    /// The previous execution is superseded before this returns, so of two
    /// back-to-back calls only the second one can write state.
    pub fn refetch(&self) -> JoinHandle<()> {
        let started = self.begin();
        let handle = self.clone();
        tokio::spawn(async move {
            if let Some((generation, token)) = started {
                handle.run(generation, token).await;
            }
        })
    }

    /// Run one execution to completion on the current task
    pub async fn execute(&self) {
        if let Some((generation, token)) = self.begin() {
            self.run(generation, token).await;
        }
    }

    async fn run(&self, generation: u64, token: CancellationToken) {
        let started = Instant::now();
        let work = (self.inner.producer)();
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Outcome::Aborted,
            result = tokio::time::timeout(self.inner.options.timeout, work) => {
                result.map_or(Outcome::TimedOut, Outcome::Done)
            }
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Outcome::Aborted => {
                debug!(generation, elapsed_ms, "fetch aborted");
            }
            Outcome::Done(Ok(data)) => {
                let committed = self.finish(generation, |state| {
                    state.data = Some(data.clone());
                    state.error = None;
                });
                if committed {
                    debug!(generation, elapsed_ms, "fetch succeeded");
                    if let Some(callback) = &self.inner.options.on_success {
                        callback(&data);
                    }
                }
            }
            Outcome::Done(Err(err)) => self.fail(generation, &err),
            Outcome::TimedOut => {
                token.cancel();
                let seconds = whole_seconds(self.inner.options.timeout);
                warn!(generation, timeout_secs = seconds, "fetch timed out");
                self.fail(generation, &ClientError::timeout(seconds));
            }
        }
    }

    /// Cancel the execution in flight, recording a cancellation error
    ///
    /// Returns `false` when nothing was in flight.
    pub fn cancel(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        let Some(token) = slot.token.take() else {
            return false;
        };
        token.cancel();
        slot.generation += 1;
        let err = ClientError::Cancelled;
        let message = err.user_message();
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message.clone());
        });
        drop(slot);

        debug!("fetch cancelled by consumer");
        if let Some(callback) = &self.inner.options.on_error {
            callback(&err, &message);
        }
        true
    }

    /// Abort anything in flight and stop publishing state for good
    pub fn unmount(&self) {
        let mut slot = self.inner.slot.lock();
        self.inner.lifetime.cancel();
        if let Some(token) = slot.token.take() {
            token.cancel();
        }
        slot.generation += 1;
        debug!("fetch unmounted");
    }

    /// Replace the data without running the producer
    pub fn set_data(&self, data: Option<T>) {
        let _slot = self.inner.slot.lock();
        if self.inner.lifetime.is_cancelled() {
            return;
        }
        self.inner.state.send_modify(|state| state.data = data);
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state update
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Stable trigger for this controller
    pub fn refetcher(&self) -> Refetch<T> {
        Refetch {
            handle: self.clone(),
        }
    }

    /// Whether [`unmount`](Self::unmount) was called
    pub fn is_unmounted(&self) -> bool {
        self.inner.lifetime.is_cancelled()
    }

    fn begin(&self) -> Option<(u64, CancellationToken)> {
        let mut slot = self.inner.slot.lock();
        if self.inner.lifetime.is_cancelled() {
            return None;
        }
        let token = self.inner.lifetime.child_token();
        if let Some(previous) = slot.token.replace(token.clone()) {
            previous.cancel();
            debug!(superseded = slot.generation, "fetch superseded");
        }
        slot.generation += 1;
        let generation = slot.generation;
        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        debug!(generation, "fetch started");
        Some((generation, token))
    }

    /// Apply `update` and clear `loading` if `generation` still owns the slot
    fn finish(&self, generation: u64, update: impl FnOnce(&mut FetchState<T>)) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.generation != generation || self.inner.lifetime.is_cancelled() {
            return false;
        }
        slot.token = None;
        self.inner.state.send_modify(|state| {
            update(state);
            state.loading = false;
        });
        true
    }

    fn fail(&self, generation: u64, err: &ClientError) {
        let message = err.user_message();
        let committed = self.finish(generation, |state| state.error = Some(message.clone()));
        if committed {
            debug!(generation, error = %err, "fetch failed");
            if let Some(callback) = &self.inner.options.on_error {
                callback(err, &message);
            }
        }
    }
}

/// Deadline in whole seconds, rounded up so sub-second deadlines never read as zero
fn whole_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

/// Trigger handed to consumers that only need to re-run a fetch
///
/// Two triggers are equal when they drive the same controller.
pub struct Refetch<T> {
    handle: FetchHandle<T>,
}

impl<T> Refetch<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a new execution
    pub fn call(&self) -> JoinHandle<()> {
        self.handle.refetch()
    }
}

impl<T> Clone for Refetch<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T> PartialEq for Refetch<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle.inner, &other.handle.inner)
    }
}

impl<T> Eq for Refetch<T> {}

impl<T> fmt::Debug for Refetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Refetch")
            .field(&Arc::as_ptr(&self.handle.inner))
            .finish()
    }
}
