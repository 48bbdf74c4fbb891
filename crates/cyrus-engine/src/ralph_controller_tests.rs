// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cyrus_core::RalphState;

#[test]
fn no_loop_state_always_stops() {
    let mut state = None;
    let decision = RalphWiggumController::on_session_completed(&mut state, "anything");
    assert_eq!(decision, RalphDecision::Stop);
}

#[test]
fn ralph_loop_bound_with_no_completion_phrase() {
    // spec scenario: maxIterations=3, no completion phrase => exactly 3
    // session starts in total. Mirrors the orchestrator's run_session
    // loop, which starts the runner once before ever consulting this
    // controller, so `starts` begins at 1, not 0.
    let mut state = Some(RalphState::new("build the feature", 3));
    let mut starts = 1;
    loop {
        let decision = RalphWiggumController::on_session_completed(&mut state, "still working");
        match decision {
            RalphDecision::Continue { prompt } => {
                starts += 1;
                assert!(prompt.contains("build the feature"));
                assert!(prompt.contains(&starts.to_string()));
            }
            RalphDecision::Stop => break,
        }
        if starts > 10 {
            panic!("loop did not terminate");
        }
    }
    assert_eq!(starts, 3);
    assert!(!state.unwrap().active);
}

#[test]
fn completion_phrase_stops_the_loop_case_insensitively() {
    let mut state = Some(RalphState::new("ship it", 10));
    state.as_mut().unwrap().completion_phrase = Some("TASK COMPLETE".to_string());

    let decision = RalphWiggumController::on_session_completed(&mut state, "iteration 1 output");
    assert!(matches!(decision, RalphDecision::Continue { .. }));

    let decision = RalphWiggumController::on_session_completed(&mut state, "all done: Task Complete");
    assert_eq!(decision, RalphDecision::Stop);
    assert!(!state.unwrap().active);
}

#[test]
fn continuation_prompt_references_previous_output() {
    let mut state = Some(RalphState::new("refactor the parser", 5));
    let decision = RalphWiggumController::on_session_completed(&mut state, "partial progress, see commit abc123");
    let RalphDecision::Continue { prompt } = decision else { panic!("expected continue") };
    assert!(prompt.contains("refactor the parser"));
    assert!(prompt.contains("partial progress, see commit abc123"));
    assert_eq!(state.unwrap().iteration, 2);
}
