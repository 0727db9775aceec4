//! This module defines the `TuringMachine` struct, the tape configuration of the scanning
//! automaton. It builds the padded tape, walks it one transition at a time, and records the
//! verdict handed to it once the run is evaluated.

use crate::types::{ControlState, Direction, StepResult, SymbolClass, Transition, BLANK_SYMBOL};
use tracing::debug;

/// The tape configuration of the scanning automaton.
///
/// The tape is the input surrounded by `padding` blank cells on both sides. The head starts
/// on the first input cell and only ever moves right, so the trailing padding guarantees a
/// blank is reached whatever the input is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuringMachine {
    input: String,
    padding: usize,
    symbols: Vec<char>,
    head: usize,
    state: ControlState,
    step_count: usize,
    halted: bool,
    verdict: Option<bool>,
}

impl TuringMachine {
    /// Creates a machine for `input` with `padding` blanks on each side of the tape.
    ///
    /// A padding of zero is raised to one, so the head always stays on the tape. The head is
    /// placed on the first input cell.
    pub fn new(input: &str, padding: usize) -> Self {
        let padding = padding.max(1);
        let symbols = std::iter::repeat(BLANK_SYMBOL)
            .take(padding)
            .chain(input.chars())
            .chain(std::iter::repeat(BLANK_SYMBOL).take(padding))
            .collect();

        Self {
            input: input.to_string(),
            padding,
            symbols,
            head: padding,
            state: ControlState::Initial,
            step_count: 0,
            halted: false,
            verdict: None,
        }
    }

    /// Executes a single transition of the automaton.
    ///
    /// # Returns
    ///
    /// * `None` if the machine was already halted. Nothing is changed in that case.
    /// * `Some(StepResult)` with a snapshot of the state after the transition otherwise.
    pub fn step(&mut self) -> Option<StepResult> {
        if self.halted {
            return None;
        }

        let symbol = self.symbol();
        let description = match self.state {
            ControlState::Initial => {
                self.state = ControlState::Scanning;
                format!("State q0: initial read at position {}", self.head)
            }
            ControlState::Scanning if symbol == BLANK_SYMBOL => {
                self.state = ControlState::Final;
                self.halted = true;
                "Blank detected: stopping for final evaluation".to_string()
            }
            ControlState::Scanning => {
                let description =
                    format!("Read '{}' at position {}; moving right", symbol, self.head);
                self.head += 1;
                description
            }
            ControlState::Final => {
                self.halted = true;
                format!("State {}", self.state)
            }
        };

        self.step_count += 1;
        debug!(
            step = self.step_count,
            state = %self.state,
            head = self.head,
            "{description}"
        );

        Some(self.snapshot(description))
    }

    /// Steps the machine until it halts or `limit` transitions have been executed.
    ///
    /// Returns the number of transitions performed by this call.
    pub fn run(&mut self, limit: usize) -> usize {
        let mut executed = 0;
        while executed < limit && self.step().is_some() {
            executed += 1;
        }
        executed
    }

    /// Restores the configuration built by [`TuringMachine::new`] for the same input and padding.
    pub fn rewind(&mut self) {
        *self = Self::new(&self.input, self.padding);
    }

    /// Marks the run as evaluated.
    ///
    /// The machine is forced into the final state. The verdict is only recorded the first
    /// time; later calls keep the original one. Returns the verdict in effect.
    pub fn finish(&mut self, accepted: bool) -> bool {
        self.state = ControlState::Final;
        self.halted = true;
        *self.verdict.get_or_insert(accepted)
    }

    /// Returns the current control state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Returns the total number of transitions executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Checks if the machine has halted. Once halted it stays halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns the verdict recorded by [`TuringMachine::finish`], if any.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Returns the original input the tape was built from.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the number of blank cells on each side of the input.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Returns the whole tape, padding included.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Returns the head position.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the symbol under the head, or the blank symbol if the head is past the tape.
    pub fn symbol(&self) -> char {
        self.symbols.get(self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    /// Returns the tape as a string.
    pub fn tape_string(&self) -> String {
        self.symbols.iter().collect()
    }

    /// Describes the hard-coded automaton as a list of transition records.
    ///
    /// | from    | read      | to      | move  | halts |
    /// |---------|-----------|---------|-------|-------|
    /// | q0      | any       | q_scan  | stay  | no    |
    /// | q_scan  | blank     | q_final | stay  | yes   |
    /// | q_scan  | non-blank | q_scan  | right | no    |
    /// | q_final | any       | q_final | stay  | yes   |
    pub fn transition_table() -> Vec<Transition> {
        let row = |from, read, to, direction, halts| Transition {
            from,
            read,
            to,
            write: None,
            direction,
            halts,
        };

        vec![
            row(
                ControlState::Initial,
                SymbolClass::Any,
                ControlState::Scanning,
                Direction::Stay,
                false,
            ),
            row(
                ControlState::Scanning,
                SymbolClass::Blank,
                ControlState::Final,
                Direction::Stay,
                true,
            ),
            row(
                ControlState::Scanning,
                SymbolClass::NonBlank,
                ControlState::Scanning,
                Direction::Right,
                false,
            ),
            row(
                ControlState::Final,
                SymbolClass::Any,
                ControlState::Final,
                Direction::Stay,
                true,
            ),
        ]
    }

    /// Returns the transition record describing the next step, or `None` once halted.
    pub fn transition(&self) -> Option<Transition> {
        if self.halted {
            return None;
        }

        let symbol = self.symbol();
        Self::transition_table()
            .into_iter()
            .find(|t| t.from == self.state && t.read.matches(symbol))
    }

    fn snapshot(&self, description: String) -> StepResult {
        StepResult {
            symbols: self.symbols.clone(),
            head: self.head,
            state: self.state,
            description,
            halted: self.halted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_creation() {
        let machine = TuringMachine::new("ab", 2);

        assert_eq!(machine.symbols(), &['_', '_', 'a', 'b', '_', '_']);
        assert_eq!(machine.head(), 2);
        assert_eq!(machine.symbol(), 'a');
        assert_eq!(machine.state(), ControlState::Initial);
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_halted());
        assert_eq!(machine.verdict(), None);
        assert_eq!(machine.tape_string(), "__ab__");
    }

    #[test]
    fn test_initial_step_keeps_head() {
        let mut machine = TuringMachine::new("ab", 1);

        let result = machine.step().unwrap();

        assert_eq!(result.state, ControlState::Scanning);
        assert_eq!(result.head, 1);
        assert!(!result.halted);
        assert!(result.description.contains("position 1"));
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_scanning_moves_right() {
        let mut machine = TuringMachine::new("ab", 1);
        machine.step();

        let result = machine.step().unwrap();

        assert_eq!(result.state, ControlState::Scanning);
        assert_eq!(result.head, 2);
        assert!(result.description.contains("'a'"));
        assert_eq!(result.symbols, vec!['_', 'a', 'b', '_']);
    }

    #[test]
    fn test_blank_halts() {
        let mut machine = TuringMachine::new("a", 1);

        machine.step();
        machine.step();
        let result = machine.step().unwrap();

        assert!(result.halted);
        assert_eq!(result.state, ControlState::Final);
        assert_eq!(result.head, 2);
        assert!(machine.is_halted());
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_step_after_halt_is_noop() {
        let mut machine = TuringMachine::new("", 1);
        machine.run(10);
        let before = machine.clone();

        assert_eq!(machine.step(), None);
        assert_eq!(machine, before);
    }

    #[test]
    fn test_empty_input_halts_in_two_steps() {
        let mut machine = TuringMachine::new("", 3);

        assert_eq!(machine.run(100), 2);
        assert_eq!(machine.state(), ControlState::Final);
        assert_eq!(machine.head(), 3);
    }

    #[test]
    fn test_blank_inside_input_stops_scan() {
        let mut machine = TuringMachine::new("a_b", 1);

        assert_eq!(machine.run(100), 3);
        assert_eq!(machine.head(), 2);
    }

    #[test]
    fn test_zero_padding_is_raised_to_one() {
        let mut machine = TuringMachine::new("ab", 0);

        assert_eq!(machine.padding(), 1);
        assert_eq!(machine.symbols(), &['_', 'a', 'b', '_']);
        assert_eq!(machine.head(), 1);

        assert_eq!(machine.run(100), 4);
        assert_eq!(machine.head(), 3);
        assert!(machine.head() < machine.symbols().len());
        assert_eq!(machine.symbol(), BLANK_SYMBOL);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut machine = TuringMachine::new("ab", 1);
        let mut snapshot = machine.step().unwrap();
        snapshot.symbols[1] = 'z';

        assert_eq!(machine.symbols()[1], 'a');
    }

    #[test]
    fn test_finish_records_verdict_once() {
        let mut machine = TuringMachine::new("a", 1);
        machine.run(100);

        assert!(machine.finish(true));
        assert!(machine.finish(false));
        assert_eq!(machine.verdict(), Some(true));
        assert_eq!(machine.state(), ControlState::Final);
    }

    #[test]
    fn test_rewind() {
        let mut machine = TuringMachine::new("ab", 2);
        machine.run(100);
        machine.finish(false);

        machine.rewind();

        assert_eq!(machine, TuringMachine::new("ab", 2));
    }

    #[test]
    fn test_transition_table_matches_engine() {
        let mut machine = TuringMachine::new("ab", 1);

        while let Some(expected) = machine.transition() {
            let head = machine.head();
            let result = machine.step().unwrap();

            assert_eq!(result.state, expected.to);
            assert_eq!(result.halted, expected.halts);
            match expected.direction {
                Direction::Right => assert_eq!(result.head, head + 1),
                Direction::Stay => assert_eq!(result.head, head),
                Direction::Left => panic!("the scanner never moves left"),
            }
        }

        assert!(machine.is_halted());
        assert_eq!(machine.transition(), None);
    }
}
