//! The request lifecycle shared by every feature area.
//!
//! Each logically independent request flow ("contact form submission",
//! "course list fetch", ...) owns one [`RequestState`]. It moves through the
//! same five events no matter what the request does:
//!
//! | Event          | Effect                                  |
//! |----------------|-----------------------------------------|
//! | `Request`      | `loading = true`                        |
//! | `Success(p)`   | `loading = false`, `message = Some(p)`  |
//! | `Fail(e)`      | `loading = false`, `error = Some(e)`    |
//! | `ClearError`   | `error = None`                          |
//! | `ClearMessage` | `message = None`                        |
//!
//! No event is ever rejected. Events that arrive out of order (a `Success`
//! with no prior `Request`, two `Request`s before one terminal event) are
//! applied as they come: the state records outcomes, it does not police the
//! caller.

use crate::effect::Effect;
use crate::reducer::Reducer;
use crate::{SmallVec, smallvec};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Lifecycle state of one request flow.
///
/// `P` is the success payload (usually a message string), `E` the failure
/// payload. Nothing structurally prevents `error` and `message` from both
/// being set; see [`RequestState::status`] for the tagged view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState<P, E> {
    /// True between a `Request` and the next terminal event.
    pub loading: bool,
    /// Payload of the last failure, until cleared.
    pub error: Option<E>,
    /// Payload of the last success, until cleared.
    pub message: Option<P>,
}

impl<P, E> RequestState<P, E> {
    /// The empty state every flow starts from.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loading: false,
            error: None,
            message: None,
        }
    }

    /// Apply one lifecycle event.
    ///
    /// Total over every `(state, event)` pair.
    pub fn apply(&mut self, action: RequestAction<P, E>) {
        match action {
            RequestAction::Request => {
                self.loading = true;
            },
            RequestAction::Success(payload) => {
                self.loading = false;
                self.message = Some(payload);
            },
            RequestAction::Fail(error) => {
                self.loading = false;
                self.error = Some(error);
            },
            RequestAction::ClearError => {
                self.error = None;
            },
            RequestAction::ClearMessage => {
                self.message = None;
            },
        }
    }

    /// Fold a sequence of events over this state.
    #[must_use]
    pub fn replay<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = RequestAction<P, E>>,
    {
        for action in actions {
            self.apply(action);
        }
        self
    }

    /// Tagged view of the state.
    ///
    /// `loading` wins over any recorded outcome, and a recorded error wins
    /// over a recorded message when both are present.
    #[must_use]
    pub const fn status(&self) -> Status<'_, P, E> {
        if self.loading {
            return Status::Loading;
        }
        match (&self.error, &self.message) {
            (Some(error), _) => Status::Failed(error),
            (None, Some(message)) => Status::Succeeded(message),
            (None, None) => Status::Idle,
        }
    }

    /// Whether an outcome is waiting to be read by a notifier.
    #[must_use]
    pub const fn has_outcome(&self) -> bool {
        self.error.is_some() || self.message.is_some()
    }
}

impl<P, E> Default for RequestState<P, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only tagged view over a [`RequestState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<'a, P, E> {
    /// Nothing in flight, nothing to report.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last outcome was a success.
    Succeeded(&'a P),
    /// The last outcome was a failure.
    Failed(&'a E),
}

/// Lifecycle events for one request flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RequestAction<P, E> {
    /// An operation started.
    Request,
    /// The operation succeeded.
    Success(P),
    /// The operation failed.
    Fail(E),
    /// Forget the last failure.
    ClearError,
    /// Forget the last success.
    ClearMessage,
}

impl<P, E> RequestAction<P, E> {
    /// `Success` or `Fail`: the events that end a loading period.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Fail(_))
    }

    /// Short name for logs and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Success(_) => "success",
            Self::Fail(_) => "fail",
            Self::ClearError => "clear_error",
            Self::ClearMessage => "clear_message",
        }
    }
}

impl<P, E> From<Result<P, E>> for RequestAction<P, E> {
    /// The terminal event for a finished operation.
    fn from(result: Result<P, E>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => Self::Fail(error),
        }
    }
}

/// Reducer over [`RequestState`], instantiated once per domain.
///
/// Needs no environment and never produces effects.
pub struct RequestReducer<P, E> {
    _phantom: PhantomData<fn() -> (P, E)>,
}

impl<P, E> RequestReducer<P, E> {
    /// Create a new request reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<P, E> Default for RequestReducer<P, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, E> Clone for RequestReducer<P, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, E> Copy for RequestReducer<P, E> {}

impl<P, E> std::fmt::Debug for RequestReducer<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestReducer").finish()
    }
}

impl<P, E> Reducer for RequestReducer<P, E> {
    type State = RequestState<P, E>;
    type Action = RequestAction<P, E>;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        state.apply(action);
        smallvec![Effect::None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct ApiError {
        message: String,
    }

    type ProfileState = RequestState<String, ApiError>;
    type ProfileAction = RequestAction<String, ApiError>;

    fn network_error() -> ApiError {
        ApiError {
            message: "Network error".to_string(),
        }
    }

    #[test]
    fn request_starts_loading() {
        let mut state = ProfileState::new();
        state.apply(ProfileAction::Request);

        assert_eq!(
            state,
            ProfileState {
                loading: true,
                error: None,
                message: None,
            }
        );
    }

    #[test]
    fn success_records_message() {
        let mut state = ProfileState {
            loading: true,
            ..ProfileState::new()
        };
        state.apply(ProfileAction::Success("Profile Updated".to_string()));

        assert!(!state.loading);
        assert_eq!(state.message.as_deref(), Some("Profile Updated"));
        assert_eq!(state.error, None);
    }

    #[test]
    fn clear_message_keeps_loading_flag() {
        let mut state = ProfileState {
            loading: false,
            error: None,
            message: Some("Profile Updated".to_string()),
        };
        state.apply(ProfileAction::ClearMessage);

        assert_eq!(state, ProfileState::new());
    }

    #[test]
    fn fail_then_clear_error() {
        let mut state = ProfileState::new();
        state.apply(ProfileAction::Fail(network_error()));

        assert!(!state.loading);
        assert_eq!(state.error, Some(network_error()));

        state.apply(ProfileAction::ClearError);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn two_requests_collapse_into_one_terminal() {
        let state = ProfileState::new().replay([
            ProfileAction::Request,
            ProfileAction::Request,
            ProfileAction::Fail(network_error()),
        ]);

        assert!(!state.loading);
        assert_eq!(state.error, Some(network_error()));
    }

    #[test]
    fn success_without_request_is_applied() {
        let state = ProfileState::new().replay([ProfileAction::Success("done".to_string())]);

        assert!(!state.loading);
        assert_eq!(state.message.as_deref(), Some("done"));
    }

    #[test]
    fn stale_terminal_overwrites_newer_outcome() {
        // First request resolves after the second one already succeeded.
        let state = ProfileState::new().replay([
            ProfileAction::Request,
            ProfileAction::Request,
            ProfileAction::Success("second".to_string()),
            ProfileAction::Fail(network_error()),
        ]);

        assert!(!state.loading);
        assert_eq!(state.message.as_deref(), Some("second"));
        assert_eq!(state.error, Some(network_error()));
    }

    #[test]
    fn clears_touch_only_their_field() {
        let populated = ProfileState {
            loading: true,
            error: Some(network_error()),
            message: Some("kept".to_string()),
        };

        let mut cleared = populated.clone();
        cleared.apply(ProfileAction::ClearError);
        assert!(cleared.loading);
        assert_eq!(cleared.error, None);
        assert_eq!(cleared.message.as_deref(), Some("kept"));

        let mut cleared = populated;
        cleared.apply(ProfileAction::ClearMessage);
        assert!(cleared.loading);
        assert_eq!(cleared.error, Some(network_error()));
        assert_eq!(cleared.message, None);
    }

    #[test]
    fn status_view() {
        let mut state = ProfileState::new();
        assert_eq!(state.status(), Status::Idle);
        assert!(!state.has_outcome());

        state.apply(ProfileAction::Request);
        assert_eq!(state.status(), Status::Loading);

        state.apply(ProfileAction::Success("ok".to_string()));
        assert_eq!(state.status(), Status::Succeeded(&"ok".to_string()));
        assert!(state.has_outcome());

        state.apply(ProfileAction::Fail(network_error()));
        assert_eq!(state.status(), Status::Failed(&network_error()));

        state.apply(ProfileAction::ClearError);
        state.apply(ProfileAction::ClearMessage);
        assert_eq!(state.status(), Status::Idle);
    }

    #[test]
    fn action_metadata() {
        assert!(ProfileAction::Success(String::new()).is_terminal());
        assert!(ProfileAction::Fail(network_error()).is_terminal());
        assert!(!ProfileAction::Request.is_terminal());
        assert!(!ProfileAction::ClearError.is_terminal());
        assert_eq!(ProfileAction::ClearMessage.kind(), "clear_message");
    }

    #[test]
    fn results_become_terminal_events() {
        let ok: Result<String, ApiError> = Ok("Sent".to_string());
        assert_eq!(ProfileAction::from(ok), ProfileAction::Success("Sent".to_string()));

        let err: Result<String, ApiError> = Err(network_error());
        assert_eq!(ProfileAction::from(err), ProfileAction::Fail(network_error()));
    }

    #[test]
    fn reducer_produces_no_effects() {
        let reducer = RequestReducer::<String, ApiError>::new();
        let mut state = ProfileState::new();

        let effects = reducer.reduce(&mut state, ProfileAction::Request, &());

        assert!(state.loading);
        assert!(effects.iter().all(Effect::is_none));
    }

    #[test]
    fn state_serializes_as_plain_object() -> Result<(), serde_json::Error> {
        let state = ProfileState::new().replay([ProfileAction::Fail(network_error())]);
        let json = serde_json::to_value(&state)?;

        assert_eq!(
            json,
            serde_json::json!({
                "loading": false,
                "error": { "message": "Network error" },
                "message": null,
            })
        );
        Ok(())
    }

    #[test]
    fn action_uses_type_tag() -> Result<(), serde_json::Error> {
        let action: ProfileAction =
            serde_json::from_str(r#"{"type":"Success","payload":"Profile Updated"}"#)?;
        assert_eq!(action, ProfileAction::Success("Profile Updated".to_string()));

        let action: ProfileAction = serde_json::from_str(r#"{"type":"ClearError"}"#)?;
        assert_eq!(action, ProfileAction::ClearError);
        Ok(())
    }
}
