//! # Request State Testing
//!
//! Testing utilities and helpers for request lifecycle reducers and stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Helpers for awaiting store state
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use request_state_testing::helpers::wait_for_state;
//! use request_state_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_contact_flow() {
//!     let store = Store::new(AppState::default(), app_reducer(), test_environment());
//!
//!     store.send(AppAction::SubmitContact { .. })?;
//!
//!     let state = wait_for_state(&store, |s| !s.contact.loading, Duration::from_secs(1)).await?;
//!     assert!(state.contact.message.is_some());
//! }
//! ```

use chrono::{DateTime, Utc};
use request_state_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use request_state_testing::mocks::FixedClock;
    /// use request_state_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Test helpers and utilities
pub mod helpers {
    use request_state_core::reducer::Reducer;
    use request_state_runtime::{Store, StoreError};
    use std::time::Duration;

    /// Wait until the store's state satisfies `predicate`, returning that snapshot.
    ///
    /// Checks the current state first, then every published snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if no snapshot matches before the
    /// timeout, or [`StoreError::ChannelClosed`] if the store is dropped.
    pub async fn wait_for_state<S, A, E, R, F>(
        store: &Store<S, A, E, R>,
        predicate: F,
        timeout: Duration,
    ) -> Result<S, StoreError>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: Fn(&S) -> bool,
    {
        let mut updates = store.subscribe();

        tokio::time::timeout(timeout, async {
            loop {
                {
                    let state = updates.borrow_and_update();
                    if predicate(&state) {
                        return Ok(state.clone());
                    }
                }
                if updates.changed().await.is_err() {
                    return Err(StoreError::ChannelClosed);
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Install a `tracing` subscriber that writes through the test harness.
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "request_state_runtime=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use request_state_core::{RequestAction, RequestState};

    /// Any lifecycle event with short string payloads.
    pub fn request_action() -> impl Strategy<Value = RequestAction<String, String>> {
        prop_oneof![
            3 => Just(RequestAction::Request),
            2 => "[A-Za-z ]{1,16}".prop_map(RequestAction::Success),
            2 => "[A-Za-z ]{1,16}".prop_map(RequestAction::Fail),
            1 => Just(RequestAction::ClearError),
            1 => Just(RequestAction::ClearMessage),
        ]
    }

    /// A sequence of lifecycle events.
    pub fn request_actions(
        max_len: usize,
    ) -> impl Strategy<Value = Vec<RequestAction<String, String>>> {
        prop::collection::vec(request_action(), 0..max_len)
    }

    /// Any state, including ones no event sequence from empty produces.
    pub fn request_state() -> impl Strategy<Value = RequestState<String, String>> {
        (
            any::<bool>(),
            proptest::option::of("[A-Za-z ]{1,16}"),
            proptest::option::of("[A-Za-z ]{1,16}"),
        )
            .prop_map(|(loading, error, message)| RequestState {
                loading,
                error,
                message,
            })
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
