//! Search state types
//!
//! The search looks for the first frame for which the answer is "yes",
//! assuming answers are monotonic in the frame index (all "no" then all
//! "yes"). Answers are never cross-checked: a contradictory answer simply
//! narrows the range as if it were true.

use super::transition::TransitionError;

/// Per-conversation bisection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No bounds yet
    #[default]
    Init,
    /// `lower < upper`; the probe is the floor midpoint
    Searching { lower: u64, upper: u64, step: u32 },
    /// `lower == upper`; terminal until restarted
    Found { index: u64, step: u32 },
}

/// What the caller should do after `begin` or `answer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Show frame `probe` and ask again
    Continue { probe: u64, step: u32 },
    /// The boundary frame has been located
    Found { index: u64 },
}

/// Floor midpoint; ties go to the lower half. Written to avoid overflow.
fn midpoint(lower: u64, upper: u64) -> u64 {
    lower + (upper - lower) / 2
}

impl SearchState {
    /// Start a new search over `[0, frame_count - 1]`
    ///
    /// Valid from `Init` and `Found`. A single frame is found immediately.
    pub fn begin(&mut self, frame_count: u64) -> Result<SearchOutcome, TransitionError> {
        if matches!(self, SearchState::Searching { .. }) {
            return Err(TransitionError::AlreadySearching);
        }
        if frame_count == 0 {
            return Err(TransitionError::EmptyDomain);
        }

        let (lower, upper, step) = (0, frame_count - 1, 1);
        if lower == upper {
            *self = SearchState::Found { index: 0, step };
            return Ok(SearchOutcome::Found { index: 0 });
        }

        *self = SearchState::Searching { lower, upper, step };
        Ok(SearchOutcome::Continue {
            probe: midpoint(lower, upper),
            step,
        })
    }

    /// Apply one yes/no answer about the current probe
    ///
    /// "Yes" means the event has already happened at the probe, so the probe
    /// becomes the new upper bound; "no" moves the lower bound past it.
    pub fn answer(&mut self, is_yes: bool) -> Result<SearchOutcome, TransitionError> {
        let SearchState::Searching { lower, upper, step } = *self else {
            return Err(TransitionError::NotSearching);
        };

        let mid = midpoint(lower, upper);
        let step = step + 1;
        let (lower, upper) = if is_yes { (lower, mid) } else { (mid + 1, upper) };

        if lower == upper {
            *self = SearchState::Found { index: lower, step };
            Ok(SearchOutcome::Found { index: lower })
        } else {
            *self = SearchState::Searching { lower, upper, step };
            Ok(SearchOutcome::Continue {
                probe: midpoint(lower, upper),
                step,
            })
        }
    }

    /// Frame currently on display, if any
    pub fn probe(&self) -> Option<u64> {
        match *self {
            SearchState::Init => None,
            SearchState::Searching { lower, upper, .. } => Some(midpoint(lower, upper)),
            SearchState::Found { index, .. } => Some(index),
        }
    }

    /// Number of probes issued so far
    pub fn step(&self) -> u32 {
        match *self {
            SearchState::Init => 0,
            SearchState::Searching { step, .. } | SearchState::Found { step, .. } => step,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Found { .. })
    }
}
