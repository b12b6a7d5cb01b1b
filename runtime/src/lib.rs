//! # Request State Runtime
//!
//! Runtime implementation for request lifecycle reducers.
//!
//! This crate provides the Store runtime that serializes dispatch, publishes
//! state snapshots to readers, and executes effect descriptions.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state and applies actions one at a time
//! - **Snapshots**: Every mutation publishes the new state to all subscribers
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//!
//! ## Example
//!
//! ```ignore
//! use request_state_runtime::Store;
//! use request_state_core::{RequestAction, RequestReducer, RequestState};
//!
//! let store = Store::new(RequestState::default(), RequestReducer::<String, String>::new(), ());
//!
//! // Dispatch an event
//! store.send(RequestAction::Request)?;
//!
//! // Read state
//! let loading = store.state(|s| s.loading);
//! ```

use request_state_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Reducing an action never fails; these errors come from the runtime
    /// around it.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action or for effects to complete
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Interval at which `shutdown` re-checks pending effects
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use request_state_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of actions buffered for slow action observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// # Arguments
    ///
    /// - `broadcast_capacity`: Actions buffered per observer (at least 1 is used)
    /// - `default_shutdown_timeout`: Default timeout for shutdown operations
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned by
/// that action. Actions fed back by those effects get their own handles; the
/// wait does not follow them.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Submit)?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle and the tracking context the executor updates
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running.
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, SHUTDOWN_POLL_INTERVAL, StoreConfig,
        StoreError,
    };
    use request_state_core::SmallVec;
    use std::future::Future;
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (inside a `watch` channel, so every mutation is published)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and yields another handle to the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        inner: Arc<Inner<S, A, E, R>>,
    }

    struct Inner<S, A, E, R> {
        state: watch::Sender<S>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        shutdown: AtomicBool,
        pending_effects: Arc<AtomicUsize>,
        /// Every reduced action, in the order it was applied.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let config = StoreConfig::default()
        ///     .with_broadcast_capacity(256)
        ///     .with_shutdown_timeout(Duration::from_secs(60));
        ///
        /// let store = Store::with_config(AppState::default(), app_reducer(), env, config);
        /// ```
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (state, _) = watch::channel(initial_state);
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                inner: Arc::new(Inner {
                    state,
                    reducer,
                    environment,
                    config,
                    shutdown: AtomicBool::new(false),
                    pending_effects: Arc::new(AtomicUsize::new(0)),
                    action_broadcast,
                }),
            }
        }

        /// Configuration this store was created with
        #[must_use]
        pub fn config(&self) -> &StoreConfig {
            &self.inner.config
        }

        /// Injected environment
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.inner.environment
        }

        /// Send an action to the store
        ///
        /// 1. Runs the reducer on the state while holding the state lock, so
        ///    transitions are applied strictly one at a time in call order
        /// 2. Publishes the new snapshot to every subscriber
        /// 3. Broadcasts the action to action observers
        /// 4. Starts the returned effects; actions they produce are sent back
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Effects need a Tokio runtime; without one they are logged and dropped.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.inner.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                ::metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            ::metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();
            let observed = action.clone();
            let mut effects = SmallVec::new();

            self.inner.state.send_modify(|state| {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                effects = self.inner.reducer.reduce(state, action, &self.inner.environment);
                ::metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                // Broadcast under the state lock so observers see reduction order.
                let _ = self.inner.action_broadcast.send(observed);
            });

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// The closure runs under a read lock; keep it short.
        ///
        /// ```ignore
        /// let loading = store.state(|s| s.profile.loading);
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.inner.state.borrow())
        }

        /// Clone of the current state
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.inner.state.borrow().clone()
        }

        /// Subscribe to state snapshots
        ///
        /// The receiver always holds the latest snapshot and is notified after
        /// every action. A slow reader skips intermediate snapshots rather than
        /// queueing them.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<S> {
            self.inner.state.subscribe()
        }

        /// Number of live snapshot subscribers
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.inner.state.receiver_count()
        }

        /// Subscribe to all actions reduced by this store
        ///
        /// Receives actions sent by callers as well as those produced by
        /// effects, in the order they were applied. A lagging receiver gets
        /// [`broadcast::error::RecvError::Lagged`] and skips ahead.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.inner.action_broadcast.subscribe()
        }

        /// Send an action and wait for a matching action
        ///
        /// Subscribes before sending, so a matching action produced by the
        /// effects of `action` cannot be missed. The sent action itself is
        /// also offered to the predicate.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        /// - [`StoreError::Timeout`]: No matching action before the timeout
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.inner.action_broadcast.subscribe();

            self.send(action)?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.inner.pending_effects.load(Ordering::Acquire)
        }

        /// Whether [`Store::shutdown`] has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.inner.shutdown.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, then waits for running effects. Actions those
        /// effects produce after this point are rejected and logged.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            ::metrics::counter!("store.shutdown.initiated").increment(1);

            self.inner.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            loop {
                let pending = self.pending_effects();

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    ::metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running",
                        pending
                    );
                    ::metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            }
        }

        /// Execute an effect, registering it with `tracking`
        ///
        /// - `None`: No-op
        /// - `Future`: Awaits the computation, sends the resulting action if `Some`
        /// - `Delay`: Waits for the duration, then sends the action
        /// - `Parallel`: Starts every effect at once
        /// - `Sequential`: Runs effects in order, waiting for each one
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    ::metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    ::metrics::counter!("store.effects.executed", "type" => "future")
                        .increment(1);
                    self.spawn_feedback(tracking, fut);
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    ::metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    self.spawn_feedback(tracking, async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    ::metrics::counter!("store.effects.executed", "type" => "parallel")
                        .increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    ::metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);

                    let store = self.clone();
                    self.spawn_tracked(tracking, async move {
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );
                            let (mut step, step_tracking) = EffectHandle::new();
                            store.execute_effect(effect, &step_tracking);
                            drop(step_tracking);
                            step.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
            }
        }

        /// Spawn a computation whose action, if any, is sent back to the store
        fn spawn_feedback<F>(&self, tracking: &EffectTracking, fut: F)
        where
            F: Future<Output = Option<A>> + Send + 'static,
        {
            let store = self.clone();
            self.spawn_tracked(tracking, async move {
                if let Some(action) = fut.await {
                    tracing::trace!("Effect produced an action, sending to store");
                    if let Err(error) = store.send(action) {
                        tracing::warn!(%error, "Dropped action produced by effect");
                    }
                } else {
                    tracing::trace!("Effect completed with no action");
                }
            });
        }

        /// Spawn a task counted by both the action's handle and the store
        fn spawn_tracked<F>(&self, tracking: &EffectTracking, task: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                tracing::error!("No Tokio runtime available, dropping effect");
                ::metrics::counter!("store.effects.dropped").increment(1);
                return;
            };

            tracking.increment();
            let guard = DecrementGuard(tracking.clone());

            self.inner.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.inner.pending_effects));

            runtime.spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;
                task.await;
            });
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("state", &*self.inner.state.borrow())
                .field("config", &self.inner.config)
                .finish_non_exhaustive()
        }
    }
}

pub use store::Store;
