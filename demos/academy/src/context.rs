//! Wires the store, the API and the notification center together.

use crate::api::AcademyApi;
use crate::app::{AcademyEnvironment, AppAction, AppState, AppStore, app_reducer};
use crate::config::AcademyConfig;
use crate::notify::{NotificationCenter, Toast};
use request_state_core::environment::Clock;
use request_state_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A running client session.
///
/// Must be created inside a Tokio runtime.
pub struct AppContext {
    store: AppStore,
    notifier: JoinHandle<()>,
    toasts: mpsc::UnboundedReceiver<Toast>,
}

impl AppContext {
    /// Start a session against `api`.
    #[must_use]
    pub fn new(config: &AcademyConfig, api: Arc<dyn AcademyApi>, clock: Arc<dyn Clock>) -> Self {
        let environment = AcademyEnvironment::new(api, Arc::clone(&clock));
        let store = Store::with_config(
            AppState::default(),
            app_reducer(),
            environment,
            config.store_config(),
        );
        let (notifier, toasts) = NotificationCenter::new(clock).spawn(store.clone());

        tracing::info!(
            broadcast_capacity = config.broadcast_capacity,
            "Academy session started"
        );

        Self {
            store,
            notifier,
            toasts,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Dispatch an action without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once shutdown has begun.
    pub fn dispatch(&self, action: AppAction) -> Result<EffectHandle, StoreError> {
        self.store.send(action)
    }

    /// Dispatch a command and wait for the `Success` or `Fail` of the slice it drives.
    ///
    /// Terminal events of other slices are skipped. An action without a
    /// slice (a broadcast clear) returns as soon as it is reduced; a terminal
    /// event sent directly settles itself.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the slice does not settle within `timeout`.
    pub async fn run(&self, action: AppAction, timeout: Duration) -> Result<AppAction, StoreError> {
        if action.slice().is_none() {
            self.store.send(action.clone())?;
            return Ok(action);
        }

        let command = action.clone();
        self.store
            .send_and_wait_for(action, move |seen| seen.settles(&command), timeout)
            .await
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.store.snapshot()
    }

    /// Wait up to `timeout` for the next toast.
    pub async fn next_toast(&mut self, timeout: Duration) -> Option<Toast> {
        tokio::time::timeout(timeout, self.toasts.recv())
            .await
            .ok()
            .flatten()
    }

    /// Toasts emitted so far and not yet taken.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = self.toasts.try_recv() {
            toasts.push(toast);
        }
        toasts
    }

    /// Stop accepting actions, wait for running calls, then stop notifying.
    ///
    /// Waits for the store's configured shutdown timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running
    /// when the grace period ends.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let timeout = self.store.config().default_shutdown_timeout;
        let result = self.store.shutdown(timeout).await;
        self.notifier.abort();
        result
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
