//! Client state for a learning platform.
//!
//! Every feature area (profile changes, subscription, contact form, course
//! requests, the signed-in user) tracks its API calls with its own
//! [`RequestState`](request_state_core::RequestState). The slices live in one
//! [`AppStore`](app::AppStore); a [`NotificationCenter`](notify::NotificationCenter)
//! turns recorded outcomes into toasts and clears them.
//!
//! # Example
//!
//! ```ignore
//! let api = Arc::new(InMemoryApi::new(fixtures::learner(), "secret"));
//! let ctx = AppContext::new(&AcademyConfig::default(), api, Arc::new(SystemClock));
//!
//! ctx.run(AppAction::CancelSubscription, Duration::from_secs(1)).await?;
//! assert!(ctx.state().subscription.message.is_some());
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod fixtures;
pub mod forms;
pub mod notify;
pub mod types;

pub use app::{AppAction, AppState, AppStore, Domain, Slice};
pub use config::AcademyConfig;
pub use context::AppContext;
