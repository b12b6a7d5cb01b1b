//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`pullback`**: Run a child reducer on a slice of a larger state, for
//!   the parent actions that map onto child actions
//!
//! An application with several request flows pulls one
//! [`RequestReducer`](crate::RequestReducer) back per flow and combines them:
//!
//! ```
//! use request_state_core::composition::{combine_reducers, pullback};
//! use request_state_core::{Reducer, RequestAction, RequestReducer, RequestState};
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     contact: RequestState<String, String>,
//!     course: RequestState<String, String>,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     Contact(RequestAction<String, String>),
//!     Course(RequestAction<String, String>),
//! }
//!
//! let contact = pullback(
//!     RequestReducer::new(),
//!     |s: &mut AppState| &mut s.contact,
//!     |a: &AppAction| match a {
//!         AppAction::Contact(inner) => Some(inner.clone()),
//!         AppAction::Course(_) => None,
//!     },
//!     AppAction::Contact,
//!     |_: &()| &(),
//! );
//! let course = pullback(
//!     RequestReducer::new(),
//!     |s: &mut AppState| &mut s.course,
//!     |a: &AppAction| match a {
//!         AppAction::Course(inner) => Some(inner.clone()),
//!         AppAction::Contact(_) => None,
//!     },
//!     AppAction::Course,
//!     |_: &()| &(),
//! );
//!
//! let app = combine_reducers(vec![Box::new(contact), Box::new(course)]);
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::Contact(RequestAction::Request), &());
//! assert!(state.contact.loading);
//! assert!(!state.course.loading);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use crate::SmallVec;
use std::marker::PhantomData;

/// Boxed reducer that can live inside a `Store`.
pub type BoxedReducer<S, A, E> =
    Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
/// - `E`: The environment type
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers run for every action
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}

/// Pulls a child reducer back to a parent state, action and environment.
///
/// # Arguments
///
/// - `reducer`: The child reducer
/// - `state`: Lens from the parent state to the child's slice
/// - `extract`: Maps a parent action onto a child action, or `None` to skip
/// - `embed`: Wraps child actions produced by effects back into the parent type
/// - `environment`: Projects the parent environment onto the child's
///
/// One parent action may map onto several children (a broadcast "clear all
/// errors", for instance): each pulled-back reducer decides for itself.
pub fn pullback<S, A, E, R>(
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(&A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
    environment: fn(&E) -> &R::Environment,
) -> PulledBackReducer<S, A, E, R>
where
    R: Reducer,
{
    PulledBackReducer {
        reducer,
        state,
        extract,
        embed,
        environment,
        _phantom: PhantomData,
    }
}

/// A child reducer lifted into a parent domain.
///
/// Created by [`pullback`].
pub struct PulledBackReducer<S, A, E, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    extract: fn(&A) -> Option<R::Action>,
    embed: fn(R::Action) -> A,
    environment: fn(&E) -> &R::Environment,
    _phantom: PhantomData<fn() -> (S, A, E)>,
}

impl<S, A, E, R> Reducer for PulledBackReducer<S, A, E, R>
where
    R: Reducer,
    R::Action: 'static,
    A: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(child_action) = (self.extract)(&action) else {
            return SmallVec::new();
        };

        let child_state = (self.state)(state);
        let child_env = (self.environment)(env);

        self.reducer
            .reduce(child_state, child_action, child_env)
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}
