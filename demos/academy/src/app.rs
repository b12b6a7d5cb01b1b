//! Application state, actions and the composed reducer.
//!
//! Every feature area owns an independent [`RequestState`]. The slices are
//! driven by one shared [`RequestReducer`] pulled back onto each field, plus a
//! command reducer that turns user intents into API calls.

use crate::api::AcademyApi;
use crate::types::{ApiError, ContactMessage, CourseRequest, Password, UserProfile};
use request_state_core::composition::{BoxedReducer, CombinedReducer};
use request_state_core::effect::Effect;
use request_state_core::environment::Clock;
use request_state_core::reducer::Reducer;
use request_state_core::{
    RequestAction, RequestReducer, RequestState, SmallVec, combine_reducers, pullback, smallvec,
};
use request_state_runtime::Store;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Lifecycle of a flow whose success payload is a server message.
pub type DomainState = RequestState<String, ApiError>;

/// Lifecycle event for a [`DomainState`].
pub type DomainAction = RequestAction<String, ApiError>;

/// Lifecycle of the current-user fetch.
pub type UserState = RequestState<UserProfile, ApiError>;

/// Lifecycle event for the [`UserState`].
pub type UserAction = RequestAction<UserProfile, ApiError>;

/// The message-carrying feature areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Password, picture and playlist changes
    Profile,
    /// Subscription management
    Subscription,
    /// Contact form
    Contact,
    /// Course requests
    Course,
}

impl Domain {
    /// Every domain, in display order.
    pub const ALL: [Self; 4] = [Self::Profile, Self::Subscription, Self::Contact, Self::Course];

    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Subscription => "subscription",
            Self::Contact => "contact",
            Self::Course => "course",
        }
    }

    /// Address a lifecycle event to this domain.
    #[must_use]
    pub const fn action(self, action: DomainAction) -> AppAction {
        match self {
            Self::Profile => AppAction::Profile(action),
            Self::Subscription => AppAction::Subscription(action),
            Self::Contact => AppAction::Contact(action),
            Self::Course => AppAction::Course(action),
        }
    }
}

/// A piece of [`AppState`] with its own lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    /// The signed-in user
    User,
    /// A message-carrying domain
    Domain(Domain),
}

/// State of the whole client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Signed-in user
    pub user: UserState,
    /// Profile changes
    pub profile: DomainState,
    /// Subscription management
    pub subscription: DomainState,
    /// Contact form
    pub contact: DomainState,
    /// Course requests
    pub course: DomainState,
}

impl AppState {
    /// The slice owned by `domain`.
    #[must_use]
    pub const fn domain(&self, domain: Domain) -> &DomainState {
        match domain {
            Domain::Profile => &self.profile,
            Domain::Subscription => &self.subscription,
            Domain::Contact => &self.contact,
            Domain::Course => &self.course,
        }
    }

    /// Whether any flow is waiting on the API.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.user.loading || Domain::ALL.iter().any(|d| self.domain(*d).loading)
    }
}

/// Everything that can happen to [`AppState`].
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Event for the user fetch
    User(UserAction),
    /// Event for the profile domain
    Profile(DomainAction),
    /// Event for the subscription domain
    Subscription(DomainAction),
    /// Event for the contact domain
    Contact(DomainAction),
    /// Event for the course domain
    Course(DomainAction),

    /// Clear the error of every message domain
    ClearError,
    /// Clear the message of every message domain
    ClearMessage,

    /// Fetch the signed-in user
    LoadUser,
    /// Replace the password
    ChangePassword {
        /// Current password
        old_password: Password,
        /// Replacement
        new_password: Password,
    },
    /// Upload a new profile picture
    UpdateProfilePicture {
        /// Raw file bytes
        file: Vec<u8>,
    },
    /// Remove a course from the playlist
    RemoveFromPlaylist {
        /// Course identifier
        course_id: String,
    },
    /// Cancel the active subscription
    CancelSubscription,
    /// Send the contact form
    SubmitContact(ContactMessage),
    /// Ask for a new course
    RequestCourse(CourseRequest),
}

impl AppAction {
    /// The lifecycle event this action carries for `domain`, if any.
    ///
    /// Broadcast clears map onto every domain.
    #[must_use]
    pub fn for_domain(&self, domain: Domain) -> Option<DomainAction> {
        match (self, domain) {
            (Self::Profile(action), Domain::Profile)
            | (Self::Subscription(action), Domain::Subscription)
            | (Self::Contact(action), Domain::Contact)
            | (Self::Course(action), Domain::Course) => Some(action.clone()),
            (Self::ClearError, _) => Some(RequestAction::ClearError),
            (Self::ClearMessage, _) => Some(RequestAction::ClearMessage),
            _ => None,
        }
    }

    /// The slice this action drives: the one a command puts into `loading`,
    /// or the one a lifecycle event is addressed to.
    ///
    /// Broadcast clears have no single owner.
    #[must_use]
    pub const fn slice(&self) -> Option<Slice> {
        match self {
            Self::User(_) | Self::LoadUser => Some(Slice::User),
            Self::Profile(_)
            | Self::ChangePassword { .. }
            | Self::UpdateProfilePicture { .. }
            | Self::RemoveFromPlaylist { .. } => Some(Slice::Domain(Domain::Profile)),
            Self::Subscription(_) | Self::CancelSubscription => {
                Some(Slice::Domain(Domain::Subscription))
            },
            Self::Contact(_) | Self::SubmitContact(_) => Some(Slice::Domain(Domain::Contact)),
            Self::Course(_) | Self::RequestCourse(_) => Some(Slice::Domain(Domain::Course)),
            Self::ClearError | Self::ClearMessage => None,
        }
    }

    /// Whether this is a `Success` or `Fail` for any slice.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::User(action) => action.is_terminal(),
            Self::Profile(action)
            | Self::Subscription(action)
            | Self::Contact(action)
            | Self::Course(action) => action.is_terminal(),
            _ => false,
        }
    }

    /// Whether this is the `Success` or `Fail` that ends `command`.
    ///
    /// Terminal events of other slices (a chained user reload, another
    /// domain's call) never settle it.
    #[must_use]
    pub fn settles(&self, command: &Self) -> bool {
        self.is_terminal() && command.slice().is_some() && self.slice() == command.slice()
    }

    /// Whether this action starts an API call.
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::LoadUser
                | Self::ChangePassword { .. }
                | Self::UpdateProfilePicture { .. }
                | Self::RemoveFromPlaylist { .. }
                | Self::CancelSubscription
                | Self::SubmitContact(_)
                | Self::RequestCourse(_)
        )
    }
}

/// Dependencies injected into the reducers.
#[derive(Clone)]
pub struct AcademyEnvironment {
    /// Platform API
    pub api: Arc<dyn AcademyApi>,
    /// Time source for notifications
    pub clock: Arc<dyn Clock>,
}

impl AcademyEnvironment {
    /// Bundle an API and a clock.
    #[must_use]
    pub fn new(api: Arc<dyn AcademyApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

impl std::fmt::Debug for AcademyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcademyEnvironment").finish_non_exhaustive()
    }
}

/// Turn an API call into an effect that feeds back exactly one terminal event.
fn settle<P, F>(embed: fn(RequestAction<P, ApiError>) -> AppAction, call: F) -> Effect<AppAction>
where
    P: 'static,
    F: Future<Output = Result<P, ApiError>> + Send + 'static,
{
    Effect::Future(Box::pin(async move { Some(embed(RequestAction::from(call.await))) }))
}

/// Refetch the user once the preceding effects have settled.
fn reload_user() -> Effect<AppAction> {
    Effect::Future(Box::pin(async { Some(AppAction::LoadUser) }))
}

/// Starts API calls for command actions.
///
/// The owning domain enters `loading` in the same transition that starts the
/// call, so no snapshot shows a call in flight without it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandReducer;

impl Reducer for CommandReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AcademyEnvironment;

    fn reduce(
        &self,
        state: &mut AppState,
        action: AppAction,
        env: &AcademyEnvironment,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        let api = Arc::clone(&env.api);

        match action {
            AppAction::LoadUser => {
                state.user.apply(RequestAction::Request);
                smallvec![settle(AppAction::User, async move { api.load_user().await })]
            },
            AppAction::ChangePassword {
                old_password,
                new_password,
            } => {
                state.profile.apply(RequestAction::Request);
                smallvec![settle(AppAction::Profile, async move {
                    api.change_password(old_password, new_password).await
                })]
            },
            AppAction::UpdateProfilePicture { file } => {
                state.profile.apply(RequestAction::Request);
                smallvec![Effect::chain(vec![
                    settle(AppAction::Profile, async move {
                        api.update_profile_picture(file).await
                    }),
                    reload_user(),
                ])]
            },
            AppAction::RemoveFromPlaylist { course_id } => {
                state.profile.apply(RequestAction::Request);
                smallvec![Effect::chain(vec![
                    settle(AppAction::Profile, async move {
                        api.remove_from_playlist(course_id).await
                    }),
                    reload_user(),
                ])]
            },
            AppAction::CancelSubscription => {
                state.subscription.apply(RequestAction::Request);
                smallvec![settle(AppAction::Subscription, async move {
                    api.cancel_subscription().await
                })]
            },
            AppAction::SubmitContact(contact) => {
                state.contact.apply(RequestAction::Request);
                smallvec![settle(AppAction::Contact, async move {
                    api.submit_contact(contact).await
                })]
            },
            AppAction::RequestCourse(request) => {
                state.course.apply(RequestAction::Request);
                smallvec![settle(AppAction::Course, async move {
                    api.request_course(request).await
                })]
            },
            _ => smallvec![Effect::None],
        }
    }
}

fn user_state(state: &mut AppState) -> &mut UserState {
    &mut state.user
}

fn profile_state(state: &mut AppState) -> &mut DomainState {
    &mut state.profile
}

fn subscription_state(state: &mut AppState) -> &mut DomainState {
    &mut state.subscription
}

fn contact_state(state: &mut AppState) -> &mut DomainState {
    &mut state.contact
}

fn course_state(state: &mut AppState) -> &mut DomainState {
    &mut state.course
}

// The user slice only reacts to its own events: a broadcast ClearMessage
// would otherwise drop the loaded profile.
fn user_action(action: &AppAction) -> Option<UserAction> {
    match action {
        AppAction::User(action) => Some(action.clone()),
        _ => None,
    }
}

fn profile_action(action: &AppAction) -> Option<DomainAction> {
    action.for_domain(Domain::Profile)
}

fn subscription_action(action: &AppAction) -> Option<DomainAction> {
    action.for_domain(Domain::Subscription)
}

fn contact_action(action: &AppAction) -> Option<DomainAction> {
    action.for_domain(Domain::Contact)
}

fn course_action(action: &AppAction) -> Option<DomainAction> {
    action.for_domain(Domain::Course)
}

fn no_environment(_: &AcademyEnvironment) -> &() {
    &()
}

/// The root reducer type.
pub type AppReducer = CombinedReducer<AppState, AppAction, AcademyEnvironment>;

/// The client store.
pub type AppStore = Store<AppState, AppAction, AcademyEnvironment, AppReducer>;

/// Build the root reducer: one lifecycle reducer per slice, then commands.
#[must_use]
pub fn app_reducer() -> AppReducer {
    let reducers: Vec<BoxedReducer<AppState, AppAction, AcademyEnvironment>> = vec![
        Box::new(pullback(
            RequestReducer::new(),
            user_state,
            user_action,
            AppAction::User,
            no_environment,
        )),
        Box::new(pullback(
            RequestReducer::new(),
            profile_state,
            profile_action,
            AppAction::Profile,
            no_environment,
        )),
        Box::new(pullback(
            RequestReducer::new(),
            subscription_state,
            subscription_action,
            AppAction::Subscription,
            no_environment,
        )),
        Box::new(pullback(
            RequestReducer::new(),
            contact_state,
            contact_action,
            AppAction::Contact,
            no_environment,
        )),
        Box::new(pullback(
            RequestReducer::new(),
            course_state,
            course_action,
            AppAction::Course,
            no_environment,
        )),
        Box::new(CommandReducer),
    ];

    combine_reducers(reducers)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::api::InMemoryApi;
    use crate::fixtures::learner;
    use request_state_testing::assertions::{
        assert_effects_count, assert_has_future_effect, assert_no_effects, resolve_futures,
    };
    use request_state_testing::mocks::test_clock;
    use request_state_testing::ReducerTest;

    fn env() -> AcademyEnvironment {
        AcademyEnvironment::new(
            Arc::new(InMemoryApi::new(learner(), "secret")),
            Arc::new(test_clock()),
        )
    }

    fn offline_env() -> AcademyEnvironment {
        AcademyEnvironment::new(
            Arc::new(InMemoryApi::new(learner(), "secret").offline()),
            Arc::new(test_clock()),
        )
    }

    #[test]
    fn domain_events_stay_in_their_slice() {
        ReducerTest::new(app_reducer())
            .with_env(env())
            .given_state(AppState::default())
            .when_actions([
                AppAction::Contact(RequestAction::Request),
                AppAction::Course(RequestAction::Fail(ApiError::new("E"))),
            ])
            .then_state(|state| {
                assert!(state.contact.loading);
                assert_eq!(state.course.error, Some(ApiError::new("E")));
                assert_eq!(state.profile, DomainState::default());
                assert_eq!(state.subscription, DomainState::default());
            })
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn broadcast_clears_skip_the_user() {
        let mut state = AppState::default();
        state.user.apply(RequestAction::Success(learner()));
        for domain in Domain::ALL {
            let slice = match domain {
                Domain::Profile => &mut state.profile,
                Domain::Subscription => &mut state.subscription,
                Domain::Contact => &mut state.contact,
                Domain::Course => &mut state.course,
            };
            slice.apply(RequestAction::Fail(ApiError::new("E")));
            slice.apply(RequestAction::Success("M".to_string()));
        }

        ReducerTest::new(app_reducer())
            .with_env(env())
            .given_state(state)
            .when_actions([AppAction::ClearError, AppAction::ClearMessage])
            .then_state(|state| {
                for domain in Domain::ALL {
                    assert_eq!(state.domain(domain), &DomainState::default());
                }
                assert_eq!(state.user.message, Some(learner()));
            })
            .run();
    }

    #[test]
    fn command_enters_loading_and_starts_call() {
        ReducerTest::new(app_reducer())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(AppAction::CancelSubscription)
            .then_state(|state| {
                assert!(state.subscription.loading);
                assert!(!state.profile.loading);
            })
            .then_effects(|effects| {
                assert_effects_count(effects, 1);
                assert_has_future_effect(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn command_effect_feeds_back_one_terminal_event() {
        let reducer = app_reducer();
        let mut state = AppState::default();
        let effects = reducer.reduce(
            &mut state,
            AppAction::ChangePassword {
                old_password: Password::new("secret"),
                new_password: Password::new("next"),
            },
            &env(),
        );

        let produced = resolve_futures(effects.into_vec()).await;

        assert_eq!(produced.len(), 1);
        match &produced[0] {
            AppAction::Profile(RequestAction::Success(message)) => {
                assert_eq!(message, "Password Changed Successfully");
            },
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_api_fails_the_domain() {
        let reducer = app_reducer();
        let mut state = AppState::default();
        let effects = reducer.reduce(
            &mut state,
            AppAction::SubmitContact(ContactMessage {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                message: "Hello".to_string(),
            }),
            &offline_env(),
        );

        for action in resolve_futures(effects.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &offline_env());
        }

        assert!(!state.contact.loading);
        assert_eq!(state.contact.error, Some(ApiError::new("Network error")));
        assert_eq!(state.contact.message, None);
    }

    #[test]
    fn picture_update_chains_a_user_reload() {
        let reducer = app_reducer();
        let mut state = AppState::default();
        let effects = reducer.reduce(
            &mut state,
            AppAction::UpdateProfilePicture { file: vec![1, 2] },
            &env(),
        );

        assert!(state.profile.loading);
        assert_effects_count(&effects, 1);
        match &effects[0] {
            Effect::Sequential(steps) => assert_eq!(steps.len(), 2),
            other => panic!("expected a sequential effect, got {other:?}"),
        }
    }

    #[test]
    fn routing() {
        let action = AppAction::Course(RequestAction::Request);
        assert!(action.for_domain(Domain::Course).is_some());
        assert!(action.for_domain(Domain::Contact).is_none());
        assert!(AppAction::ClearMessage.for_domain(Domain::Profile).is_some());
        assert!(AppAction::LoadUser.for_domain(Domain::Profile).is_none());
        assert!(AppAction::LoadUser.is_command());
        assert!(!AppAction::ClearError.is_command());
        assert!(AppAction::User(RequestAction::Fail(ApiError::new("E"))).is_terminal());
        assert!(!AppAction::Contact(RequestAction::ClearMessage).is_terminal());
        assert_eq!(AppAction::ClearError.slice(), None);
    }

    #[test]
    fn commands_settle_only_on_their_own_slice() {
        let picture = AppAction::UpdateProfilePicture { file: vec![1] };
        let contact = AppAction::SubmitContact(ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        });
        let reloaded = AppAction::User(RequestAction::Success(learner()));
        let sent = AppAction::Contact(RequestAction::Success("Sent".to_string()));

        assert!(!reloaded.settles(&contact));
        assert!(!reloaded.settles(&picture));
        assert!(reloaded.settles(&AppAction::LoadUser));
        assert!(sent.settles(&contact));
        assert!(!sent.settles(&picture));
        assert!(
            AppAction::Profile(RequestAction::Fail(ApiError::new("E"))).settles(&picture)
        );
        assert!(!AppAction::Contact(RequestAction::Request).settles(&contact));
        assert_eq!(
            AppAction::CancelSubscription.slice(),
            Some(Slice::Domain(Domain::Subscription))
        );
    }
}
