//! Per-conversation bisection state machine
//!
//! Pure state transitions; the runtime executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Choice, Event};
pub use state::{SearchOutcome, SearchState};
pub use transition::{transition, TransitionError};
