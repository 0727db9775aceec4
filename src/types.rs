//! This module defines the core data structures and types shared by the simulator:
//! control states, step snapshots, the descriptive transition record, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The symbol used for empty tape cells. Padding is made of it and reading it halts a scan.
pub const BLANK_SYMBOL: char = '_';
/// The number of blank cells added to each end of the tape by default.
pub const DEFAULT_PADDING: usize = 20;
/// The delay between two automatic steps, in milliseconds.
pub const DEFAULT_AUTO_INTERVAL_MS: u64 = 400;
/// The fixed name of the exported report file.
pub const REPORT_FILE_NAME: &str = "turing_simulator_report.txt";

/// The discrete mode of the scanning automaton.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlState {
    /// Nothing has been read yet.
    #[default]
    Initial,
    /// Reading symbols left to right until a blank is found.
    Scanning,
    /// Terminal state. The run is over and awaits (or holds) its verdict.
    Final,
}

impl ControlState {
    /// Returns the conventional state label shown to users (`q0`, `q_scan`, `q_final`).
    pub fn label(self) -> &'static str {
        match self {
            ControlState::Initial => "q0",
            ControlState::Scanning => "q_scan",
            ControlState::Final => "q_final",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable snapshot of the machine taken right after a transition.
///
/// The engine keeps no reference to it; the caller owns the copy of the tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// A copy of the whole tape, padding included.
    pub symbols: Vec<char>,
    /// The head position after the transition.
    pub head: usize,
    /// The control state after the transition.
    pub state: ControlState,
    /// A human readable account of what the transition did.
    pub description: String,
    /// Whether this transition left the machine halted.
    pub halted: bool,
}

impl StepResult {
    /// Returns the symbol under the head in this snapshot.
    pub fn symbol(&self) -> char {
        self.symbols.get(self.head).copied().unwrap_or(BLANK_SYMBOL)
    }
}

/// The outcome of a controller step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and can keep going.
    Continue(StepResult),
    /// The machine is halted and the run has been evaluated.
    Halt(Halt),
}

impl Step {
    /// Returns the snapshot produced by this step, if a transition actually happened.
    pub fn snapshot(&self) -> Option<&StepResult> {
        match self {
            Step::Continue(snapshot) => Some(snapshot),
            Step::Halt(halt) => halt.snapshot.as_ref(),
        }
    }

    /// Checks if this step reports a halted run.
    pub fn is_halt(&self) -> bool {
        matches!(self, Step::Halt(_))
    }
}

/// Details of a halted run.
#[derive(Debug, Clone, PartialEq)]
pub struct Halt {
    /// The halting transition's snapshot, or `None` when the machine was already halted.
    pub snapshot: Option<StepResult>,
    /// Whether the original input belongs to the selected pattern's language.
    pub accepted: bool,
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

/// The class of symbols a transition row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolClass {
    /// Any symbol, blank included.
    Any,
    /// Only the blank symbol.
    Blank,
    /// Anything except the blank symbol.
    NonBlank,
}

impl SymbolClass {
    /// Checks whether `symbol` belongs to this class.
    pub fn matches(self, symbol: char) -> bool {
        match self {
            SymbolClass::Any => true,
            SymbolClass::Blank => symbol == BLANK_SYMBOL,
            SymbolClass::NonBlank => symbol != BLANK_SYMBOL,
        }
    }
}

/// A transition record in the classic five-field shape.
///
/// The scanning automaton is hard-coded and never consults these records. They describe
/// its behaviour for display and are the shape an externally defined automaton would take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the row applies to.
    pub from: ControlState,
    /// The symbols the row applies to.
    pub read: SymbolClass,
    /// The state entered after the row fires.
    pub to: ControlState,
    /// The symbol written, `None` when the tape is left unchanged.
    pub write: Option<char>,
    /// The head movement.
    pub direction: Direction,
    /// Whether the row halts the machine.
    pub halts: bool,
}

/// Represents the errors the simulator reports to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    /// `step` or `start_auto` was called before `prepare`.
    #[error("Simulation is not prepared; call prepare first")]
    NotPrepared,
    /// A catalog entry's recognizer could not be used.
    #[error("Pattern {index} is unusable: {message}")]
    Pattern { index: usize, message: String },
    /// The report could not be written.
    #[error("Could not export the report: {0}")]
    Export(String),
}
