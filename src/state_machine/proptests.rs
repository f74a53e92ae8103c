//! Property-based tests for the search state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// `ceil(log2(n))` for `n >= 1`
fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        64 - (n - 1).leading_zeros()
    }
}

/// Drive a search with the monotonic oracle `probe >= threshold`
fn run_monotonic(frame_count: u64, threshold: u64) -> (SearchOutcome, u32) {
    let mut state = SearchState::Init;
    let mut outcome = state.begin(frame_count).unwrap();
    let mut answers = 0;
    while let SearchOutcome::Continue { probe, .. } = outcome {
        outcome = state.answer(probe >= threshold).unwrap();
        answers += 1;
    }
    (outcome, answers)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_count_and_threshold() -> impl Strategy<Value = (u64, u64)> {
    (1u64..200_000).prop_flat_map(|n| (Just(n), 0..n))
}

fn arb_choice() -> impl Strategy<Value = Choice> {
    prop_oneof![Just(Choice::Yes), Just(Choice::No)]
}

fn arb_state() -> impl Strategy<Value = SearchState> {
    prop_oneof![
        Just(SearchState::Init),
        (0u64..1000, 1u64..1000, 1u32..30).prop_map(|(lower, width, step)| {
            SearchState::Searching {
                lower,
                upper: lower + width,
                step,
            }
        }),
        (0u64..1000, 1u32..30).prop_map(|(index, step)| SearchState::Found { index, step }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Monotonic answers always locate the threshold within ceil(log2(n)) answers
    #[test]
    fn prop_monotonic_answers_find_threshold((n, threshold) in arb_count_and_threshold()) {
        let (outcome, answers) = run_monotonic(n, threshold);
        prop_assert_eq!(outcome, SearchOutcome::Found { index: threshold });
        prop_assert!(answers <= ceil_log2(n), "n={} answers={}", n, answers);
    }

    /// begin is deterministic and probes (n - 1) / 2
    #[test]
    fn prop_begin_deterministic(n in 2u64..u64::MAX / 2) {
        let mut a = SearchState::Init;
        let mut b = SearchState::Init;
        let first = a.begin(n).unwrap();
        prop_assert_eq!(first, b.begin(n).unwrap());
        prop_assert_eq!(first, SearchOutcome::Continue { probe: (n - 1) / 2, step: 1 });
    }

    /// Any answer sequence keeps 0 <= lower <= probe <= upper < n and
    /// terminates within ceil(log2(n)) answers, consistent or not.
    #[test]
    fn prop_bounds_hold_for_arbitrary_answers(
        n in 1u64..100_000,
        choices in proptest::collection::vec(arb_choice(), 0..40),
    ) {
        let mut state = SearchState::Init;
        let mut outcome = state.begin(n).unwrap();
        let mut answers = 0;

        for choice in choices {
            if !matches!(outcome, SearchOutcome::Continue { .. }) {
                break;
            }
            outcome = state.answer(choice.is_yes()).unwrap();
            answers += 1;

            match state {
                SearchState::Searching { lower, upper, step } => {
                    prop_assert!(lower < upper);
                    prop_assert!(upper < n);
                    let probe = state.probe().unwrap();
                    prop_assert!(lower <= probe && probe < upper);
                    prop_assert_eq!(step, answers + 1);
                }
                SearchState::Found { index, step } => {
                    prop_assert!(index < n);
                    prop_assert_eq!(step, answers + 1);
                    prop_assert_eq!(outcome, SearchOutcome::Found { index });
                }
                SearchState::Init => prop_assert!(false, "search fell back to Init"),
            }
        }

        prop_assert!(answers <= ceil_log2(n));
    }

    /// Transitions never panic; invalid pairs are errors, not state corruption
    #[test]
    fn prop_transition_total(state in arb_state(), choice in arb_choice(), n in 0u64..50) {
        for event in [Event::Start, Event::Begin { frame_count: n }, Event::Answer(choice)] {
            match transition(&state, event) {
                Ok(result) => {
                    if let SearchState::Searching { lower, upper, .. } = result.new_state {
                        prop_assert!(lower < upper);
                    }
                }
                Err(TransitionError::EmptyDomain) => prop_assert_eq!(n, 0),
                Err(TransitionError::NotSearching) => prop_assert_eq!(state, SearchState::Init),
                Err(TransitionError::AlreadySearching) => {
                    let is_searching = matches!(state, SearchState::Searching { .. });
                    prop_assert!(is_searching);
                }
            }
        }
    }

    /// A found result on "yes" is always the frame already on screen
    #[test]
    fn prop_yes_result_needs_no_media_edit(n in 2u64..5000, choices in proptest::collection::vec(arb_choice(), 0..20)) {
        let mut state = SearchState::Init;
        state.begin(n).unwrap();
        for choice in choices {
            if state.is_terminal() {
                break;
            }
            let result = transition(&state, Event::Answer(choice)).unwrap();
            if let [Effect::ShowResult { index, refresh_frame }] = result.effects.as_slice() {
                prop_assert_eq!(*refresh_frame, state.probe() != Some(*index));
                if choice == Choice::Yes {
                    prop_assert!(!*refresh_frame);
                }
            }
            state = result.new_state;
        }
    }
}

#[test]
fn test_ceil_log2() {
    assert_eq!(ceil_log2(1), 0);
    assert_eq!(ceil_log2(2), 1);
    assert_eq!(ceil_log2(4), 2);
    assert_eq!(ceil_log2(5), 3);
    assert_eq!(ceil_log2(61696), 16);
}
