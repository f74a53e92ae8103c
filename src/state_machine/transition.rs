//! Pure state transition function

use super::{Choice, Effect, Event, SearchOutcome, SearchState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SearchState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SearchState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot search an empty video")]
    EmptyDomain,
    #[error("No search in progress")]
    NotSearching,
    #[error("A search is already in progress")]
    AlreadySearching,
}

/// Pure transition function
///
/// Given the same state and event it always yields the same result; all I/O
/// is described by the returned effects.
pub fn transition(
    state: &SearchState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Fresh search: the bounds need the frame count first
        (SearchState::Init | SearchState::Found { .. }, Event::Start) => {
            Ok(TransitionResult::new(SearchState::Init).with_effect(Effect::ResolveFrameCount))
        }

        (SearchState::Searching { .. }, Event::Start) => Err(TransitionError::AlreadySearching),

        (_, Event::Begin { frame_count }) => {
            let mut next = *state;
            let effect = match next.begin(frame_count)? {
                SearchOutcome::Continue { probe, step } => Effect::SendProbe { index: probe, step },
                SearchOutcome::Found { index } => Effect::SendResult { index },
            };
            Ok(TransitionResult::new(next).with_effect(effect))
        }

        (SearchState::Searching { .. }, Event::Answer(choice)) => {
            let shown = state.probe();
            let mut next = *state;
            let effect = match next.answer(choice.is_yes())? {
                SearchOutcome::Continue { probe, step } => Effect::ShowProbe { index: probe, step },
                SearchOutcome::Found { index } => Effect::ShowResult {
                    index,
                    refresh_frame: shown != Some(index),
                },
            };
            Ok(TransitionResult::new(next).with_effect(effect))
        }

        // "Play again?" -> yes
        (SearchState::Found { index, .. }, Event::Answer(Choice::Yes)) => {
            Ok(TransitionResult::new(SearchState::Init).with_effects([
                Effect::AnnounceRestart { index: *index },
                Effect::ResolveFrameCount,
            ]))
        }

        // "Play again?" -> no
        (SearchState::Found { .. }, Event::Answer(Choice::No)) => Ok(TransitionResult::new(
            SearchState::Init,
        )
        .with_effects([Effect::Farewell, Effect::DiscardSession])),

        (SearchState::Init, Event::Answer(_)) => Err(TransitionError::NotSearching),
    }
}
