use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tursim::{
    ControlState, ControllerStatus, PatternCatalog, RunController, SimulatorConfig, Step,
    TuringMachine, VirtualScheduler,
};

fn controller(padding: usize) -> RunController<VirtualScheduler> {
    RunController::with_config(
        Arc::new(PatternCatalog::default()),
        SimulatorConfig::default().with_padding(padding),
        VirtualScheduler::new(),
    )
}

/// Steps manually until the run halts, returning the verdict.
fn run_to_halt(controller: &mut RunController<VirtualScheduler>) -> bool {
    loop {
        if let Step::Halt(halt) = controller.step().unwrap() {
            return halt.accepted;
        }
    }
}

fn pattern(catalog: &PatternCatalog, name: &str) -> usize {
    catalog.index_of(name).unwrap()
}

#[test]
fn test_abb_is_accepted() {
    let mut controller = controller(20);
    let index = pattern(controller.catalog(), "(a|b)*abb");
    controller.prepare("abb", index);

    assert!(run_to_halt(&mut controller));
}

#[test]
fn test_alphabet_mismatch_is_rejected() {
    let mut controller = controller(20);
    let index = pattern(controller.catalog(), "0*1*");
    controller.prepare("aab", index);

    assert!(!run_to_halt(&mut controller));
}

#[test]
fn test_empty_input_halts_after_two_steps() {
    let mut controller = controller(20);
    let index = pattern(controller.catalog(), "a*");
    controller.prepare("", index);

    assert!(run_to_halt(&mut controller));
    assert_eq!(controller.machine().unwrap().step_count(), 2);
}

#[test]
fn test_alternating_pairs_are_accepted() {
    let mut controller = controller(20);
    let index = pattern(controller.catalog(), "1(01)*0");
    controller.prepare("101010", index);

    assert!(run_to_halt(&mut controller));
}

#[test]
fn test_ends_in_ba_for_any_padding() {
    for padding in 1..=5 {
        let mut controller = controller(padding);
        let index = pattern(controller.catalog(), "(a|b)*ba");
        controller.prepare("ba", index);

        assert!(run_to_halt(&mut controller));
        assert_eq!(controller.machine().unwrap().step_count(), 4);
    }
}

#[test]
fn test_bounded_termination() {
    let inputs = ["", "a", "ab", "abba", "0011", "a_b", "___", "xyz123", "ñandú"];

    for padding in 1..=4 {
        for input in inputs {
            let mut machine = TuringMachine::new(input, padding);
            let bound = input.chars().count() + padding + 1;

            let executed = machine.run(bound);

            assert!(machine.is_halted(), "{input:?} with padding {padding}");
            assert!(executed <= bound);
            assert_eq!(machine.state(), ControlState::Final);
        }
    }
}

#[test]
fn test_step_count_is_distance_to_blank_plus_two() {
    for input in ["", "a", "ab", "abab", "a_bb", "_a"] {
        let mut machine = TuringMachine::new(input, 2);
        let distance = input.chars().take_while(|&c| c != '_').count();

        machine.run(usize::MAX);

        assert_eq!(machine.step_count(), distance + 2, "{input:?}");
        assert_eq!(machine.head(), 2 + distance);
        assert_eq!(machine.step(), None);
        assert_eq!(machine.step_count(), distance + 2);
    }
}

#[test]
fn test_acceptance_ignores_tape_walk() {
    let mut controller = controller(1);
    let index = pattern(controller.catalog(), "(ab|ba)*");
    controller.prepare("ab_ba", index);

    assert!(!run_to_halt(&mut controller));
    assert_eq!(controller.machine().unwrap().step_count(), 4);
}

#[test]
fn test_auto_run_to_completion_and_export() {
    let mut controller = controller(20);
    let index = pattern(controller.catalog(), "(ab)*");
    controller.prepare("abab", index);
    controller.start_auto().unwrap();

    let mut halted = false;
    for _ in 0..20 {
        controller
            .scheduler_mut()
            .advance(Duration::from_millis(400));
        if let Some(Ok(Step::Halt(halt))) = controller.poll() {
            assert!(halt.accepted);
            halted = true;
            break;
        }
    }
    assert!(halted);
    assert_eq!(controller.status(), ControllerStatus::Armed);

    let dir = tempdir().unwrap();
    let path = controller.export_report(dir.path()).unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    assert!(content.contains("Input: abab"));
    assert!(content.contains("Pattern: (ab)*"));
    assert!(content.contains("Steps executed: 6"));
    assert!(content.contains("Final state: q_final"));
    assert!(content.contains("Accepted: true"));
}

#[test]
fn test_prepare_then_reset_is_fresh() {
    let mut controller = controller(20);
    controller.prepare("abb", 0);
    controller.reset();

    assert_eq!(controller.status(), ControllerStatus::Unarmed);
    assert!(controller.machine().is_none());
    assert!(controller.export_report(std::path::Path::new(".")).is_err());
}
