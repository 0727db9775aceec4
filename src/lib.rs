//! This crate provides the core logic for a tape-scanning automaton simulator.
//! It includes modules for building and stepping the tape configuration, the catalog of
//! regular patterns used to judge inputs, the controller that sequences manual and timed
//! runs, and the report produced at the end of a run.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod machine;
pub mod report;
pub mod scheduler;
pub mod types;

/// Re-exports the pattern catalog and the acceptance oracle's outcome type.
pub use catalog::{MatchOutcome, Pattern, PatternCatalog, DEFAULT_PATTERNS};
/// Re-exports the run settings.
pub use config::SimulatorConfig;
/// Re-exports the `RunController` struct and its status enum.
pub use controller::{ControllerStatus, RunController};
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `Report` struct from the report module.
pub use report::Report;
/// Re-exports the scheduling seam and its implementations.
pub use scheduler::{CancellationToken, IntervalScheduler, Scheduler, VirtualScheduler};
/// Re-exports the shared types.
pub use types::{
    ControlState, Direction, Halt, SimulatorError, Step, StepResult, SymbolClass, Transition,
    BLANK_SYMBOL,
};
