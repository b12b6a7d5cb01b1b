//! Turns recorded outcomes into user-facing toasts.
//!
//! The notification center watches store snapshots. Whenever a domain holds
//! an error or a message it emits a [`Toast`] and dispatches the matching
//! clear, so each outcome is shown once.

use crate::app::{AppAction, AppState, AppStore, Domain};
use chrono::{DateTime, Utc};
use request_state_core::RequestAction;
use request_state_core::environment::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shown instead of the server's text when a subscription call fails.
pub const SUBSCRIPTION_ERROR_TEXT: &str = "Your time of 7 days of subscription cancelation is over";

/// Toast flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    /// Green
    Success,
    /// Red
    Error,
}

/// One notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Domain the outcome came from
    pub domain: Domain,
    /// Success or error
    pub kind: ToastKind,
    /// Text to display
    pub text: String,
    /// When the outcome was noticed
    pub at: DateTime<Utc>,
}

impl Toast {
    /// Actions to dispatch once this toast is shown.
    #[must_use]
    pub fn follow_ups(&self) -> Vec<AppAction> {
        match (self.kind, self.domain) {
            (ToastKind::Error, domain) => vec![domain.action(RequestAction::ClearError)],
            (ToastKind::Success, Domain::Subscription) => vec![
                Domain::Subscription.action(RequestAction::ClearMessage),
                AppAction::LoadUser,
            ],
            (ToastKind::Success, domain) => vec![domain.action(RequestAction::ClearMessage)],
        }
    }
}

/// Derives toasts from snapshots.
#[derive(Clone)]
pub struct NotificationCenter {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter").finish_non_exhaustive()
    }
}

impl NotificationCenter {
    /// Timestamp toasts with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Toasts for every outcome recorded in `state`, errors first per domain.
    #[must_use]
    pub fn collect(&self, state: &AppState) -> Vec<Toast> {
        let at = self.clock.now();
        let mut toasts = Vec::new();

        for domain in Domain::ALL {
            let slice = state.domain(domain);
            if let Some(error) = &slice.error {
                let text = match domain {
                    Domain::Subscription => SUBSCRIPTION_ERROR_TEXT.to_string(),
                    _ => error.message.clone(),
                };
                toasts.push(Toast {
                    domain,
                    kind: ToastKind::Error,
                    text,
                    at,
                });
            }
            if let Some(message) = &slice.message {
                toasts.push(Toast {
                    domain,
                    kind: ToastKind::Success,
                    text: message.clone(),
                    at,
                });
            }
        }

        toasts
    }

    /// Watch `store` until it shuts down, forwarding toasts to the returned receiver.
    ///
    /// A clear dispatched here can also remove an outcome recorded between
    /// the snapshot read and the clear; that outcome is never shown.
    pub fn spawn(self, store: AppStore) -> (JoinHandle<()>, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut updates = store.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                let toasts = self.collect(&updates.borrow_and_update());

                for toast in toasts {
                    tracing::debug!(
                        domain = toast.domain.name(),
                        kind = ?toast.kind,
                        "Showing notification"
                    );
                    let follow_ups = toast.follow_ups();
                    let _ = tx.send(toast);

                    for action in follow_ups {
                        if let Err(error) = store.send(action) {
                            tracing::debug!(%error, "Notification center stopping");
                            return;
                        }
                    }
                }

                if updates.changed().await.is_err() {
                    return;
                }
            }
        });

        (handle, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiError;
    use request_state_testing::mocks::test_clock;

    fn center() -> NotificationCenter {
        NotificationCenter::new(Arc::new(test_clock()))
    }

    #[test]
    fn quiet_state_has_no_toasts() {
        let mut state = AppState::default();
        state.contact.apply(RequestAction::Request);
        assert!(center().collect(&state).is_empty());
    }

    #[test]
    fn outcomes_become_toasts() {
        let mut state = AppState::default();
        state.contact.apply(RequestAction::Success("Sent".to_string()));
        state.course.apply(RequestAction::Fail(ApiError::new("Please enter course")));

        let toasts = center().collect(&state);

        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].domain, Domain::Contact);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].text, "Please enter course");
        assert_eq!(toasts[1].at, test_clock().now());
    }

    #[test]
    fn subscription_error_uses_fixed_text() {
        let mut state = AppState::default();
        state
            .subscription
            .apply(RequestAction::Fail(ApiError::new("No active subscription")));

        let toasts = center().collect(&state);

        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].text, SUBSCRIPTION_ERROR_TEXT);
    }

    #[test]
    fn subscription_success_reloads_user() {
        let toast = Toast {
            domain: Domain::Subscription,
            kind: ToastKind::Success,
            text: "Subscription Cancelled".to_string(),
            at: test_clock().now(),
        };

        let follow_ups = toast.follow_ups();

        assert_eq!(follow_ups.len(), 2);
        assert!(matches!(
            follow_ups[0],
            AppAction::Subscription(RequestAction::ClearMessage)
        ));
        assert!(matches!(follow_ups[1], AppAction::LoadUser));
    }
}
