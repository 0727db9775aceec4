//! This module defines the `RunController`, which sequences a simulation: preparing the tape,
//! manual and timed automatic stepping, evaluating the input once the machine halts, and
//! resetting.

use crate::catalog::{Pattern, PatternCatalog};
use crate::config::SimulatorConfig;
use crate::machine::TuringMachine;
use crate::report::Report;
use crate::scheduler::{CancellationToken, IntervalScheduler, Scheduler};
use crate::types::{Halt, SimulatorError, Step};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The lifecycle of a controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    /// No tape has been prepared.
    #[default]
    Unarmed,
    /// A tape is prepared and can be stepped.
    Armed,
    /// Steps are being executed on a timer.
    AutoRunning,
}

/// A prepared run: the tape and the pattern chosen to judge it.
#[derive(Debug, Clone)]
struct Run {
    machine: TuringMachine,
    pattern_index: usize,
}

/// Drives one simulation at a time.
///
/// The controller has a single owner. Automatic stepping is cooperative: ticks are queued on
/// the scheduler and only acted upon when the owner calls [`RunController::poll`].
#[derive(Debug)]
pub struct RunController<S: Scheduler = IntervalScheduler> {
    catalog: Arc<PatternCatalog>,
    config: SimulatorConfig,
    scheduler: S,
    status: ControllerStatus,
    run: Option<Run>,
    auto: Option<(CancellationToken, Duration)>,
}

impl<S: Scheduler> RunController<S> {
    /// Creates an unarmed controller with the default settings.
    pub fn new(catalog: Arc<PatternCatalog>, scheduler: S) -> Self {
        Self::with_config(catalog, SimulatorConfig::default(), scheduler)
    }

    /// Creates an unarmed controller with explicit settings.
    pub fn with_config(catalog: Arc<PatternCatalog>, config: SimulatorConfig, scheduler: S) -> Self {
        Self {
            catalog,
            config,
            scheduler,
            status: ControllerStatus::Unarmed,
            run: None,
            auto: None,
        }
    }

    /// Builds a fresh tape for `input` and records the pattern used to judge it.
    ///
    /// Any previous run, including an active auto-run, is discarded.
    pub fn prepare(&mut self, input: &str, pattern_index: usize) {
        self.cancel_auto();
        self.run = Some(Run {
            machine: TuringMachine::new(input, self.config.padding),
            pattern_index,
        });
        self.status = ControllerStatus::Armed;

        info!(input, pattern_index, padding = self.config.padding, "run prepared");
    }

    /// Executes one transition.
    ///
    /// When the machine halts, or was already halted, the run is evaluated and a
    /// [`Step::Halt`] carrying the verdict is returned. Stepping a halted run is not an error.
    ///
    /// # Returns
    ///
    /// * `Err(SimulatorError::NotPrepared)` if no run has been prepared. Nothing is changed.
    pub fn step(&mut self) -> Result<Step, SimulatorError> {
        let run = self.run.as_mut().ok_or(SimulatorError::NotPrepared)?;

        match run.machine.step() {
            Some(snapshot) if !snapshot.halted => Ok(Step::Continue(snapshot)),
            snapshot => {
                let accepted = Self::finalize(run, &self.catalog);
                self.end_auto();
                Ok(Step::Halt(Halt { snapshot, accepted }))
            }
        }
    }

    /// Starts stepping automatically at the configured interval.
    pub fn start_auto(&mut self) -> Result<(), SimulatorError> {
        self.start_auto_with(self.config.auto_interval)
    }

    /// Starts stepping automatically, one step every `interval`.
    ///
    /// Starting while an auto-run is active, or once the machine has halted, does nothing.
    pub fn start_auto_with(&mut self, interval: Duration) -> Result<(), SimulatorError> {
        match self.status {
            ControllerStatus::Unarmed => Err(SimulatorError::NotPrepared),
            ControllerStatus::AutoRunning => Ok(()),
            ControllerStatus::Armed => {
                if self.machine().is_some_and(TuringMachine::is_halted) {
                    debug!("run already halted; auto-run not started");
                    return Ok(());
                }

                let token = CancellationToken::new();
                self.scheduler.schedule_after(interval, token.clone());
                self.auto = Some((token, interval));
                self.status = ControllerStatus::AutoRunning;

                info!(interval_ms = interval.as_millis() as u64, "auto-run started");
                Ok(())
            }
        }
    }

    /// Stops an active auto-run. No step is executed after this returns.
    pub fn stop_auto(&mut self) {
        if self.status == ControllerStatus::AutoRunning {
            self.cancel_auto();
            self.status = ControllerStatus::Armed;
            info!("auto-run stopped");
        }
    }

    /// Starts the auto-run when armed, stops it when running.
    ///
    /// Returns whether an auto-run is active afterwards.
    pub fn toggle_auto(&mut self) -> Result<bool, SimulatorError> {
        if self.is_auto_running() {
            self.stop_auto();
        } else {
            self.start_auto()?;
        }
        Ok(self.is_auto_running())
    }

    /// Acts on the next due tick of the auto-run, if any.
    ///
    /// Each live tick performs one step and, unless the machine halted, schedules the next
    /// one. Cancelled ticks are dropped without stepping.
    pub fn poll(&mut self) -> Option<Result<Step, SimulatorError>> {
        loop {
            let token = self.scheduler.next_due()?;
            let Some((current, interval)) = &self.auto else {
                continue;
            };
            if token.is_cancelled() || current.is_cancelled() {
                continue;
            }
            let interval = *interval;

            let result = self.step();
            if let Ok(Step::Continue(_)) = result {
                self.scheduler.schedule_after(interval, token);
            }
            return Some(result);
        }
    }

    /// Discards the current run, stops any auto-run and returns to the unarmed state.
    pub fn reset(&mut self) {
        self.cancel_auto();
        self.run = None;
        self.status = ControllerStatus::Unarmed;
        info!("controller reset");
    }

    /// Builds a summary of the current run, or `None` if nothing is prepared.
    pub fn report(&self) -> Option<Report> {
        let run = self.run.as_ref()?;

        Some(Report {
            input: run.machine.input().to_string(),
            pattern_name: self
                .catalog
                .get(run.pattern_index)
                .map(|pattern| pattern.name().to_string())
                .unwrap_or_default(),
            steps: run.machine.step_count(),
            final_state: run.machine.state(),
            accepted: run.machine.verdict(),
        })
    }

    /// Writes the report of the current run to `dir`, under the configured file name.
    pub fn export_report(&self, dir: &Path) -> Result<PathBuf, SimulatorError> {
        let report = self.report().ok_or(SimulatorError::NotPrepared)?;
        report.export(dir, &self.config.report_file_name)
    }

    /// Returns the lifecycle status of the controller.
    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    /// Checks if automatic stepping is active.
    pub fn is_auto_running(&self) -> bool {
        self.status == ControllerStatus::AutoRunning
    }

    /// Returns the current tape configuration, if a run is prepared.
    pub fn machine(&self) -> Option<&TuringMachine> {
        self.run.as_ref().map(|run| &run.machine)
    }

    /// Returns the index of the pattern recorded by [`RunController::prepare`].
    pub fn pattern_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.pattern_index)
    }

    /// Returns the pattern recorded by [`RunController::prepare`].
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern_index()
            .and_then(|index| self.catalog.get(index))
    }

    /// Returns the verdict of the current run once it has been evaluated.
    pub fn verdict(&self) -> Option<bool> {
        self.machine().and_then(TuringMachine::verdict)
    }

    /// Returns the catalog runs are evaluated against.
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Returns the settings applied to every prepared run.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Returns the scheduler driving automatic steps.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Returns the scheduler mutably, e.g. to advance a virtual clock.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Judges the original input against the recorded pattern. Runs once per run; later calls
    /// return the verdict already recorded.
    fn finalize(run: &mut Run, catalog: &PatternCatalog) -> bool {
        if let Some(accepted) = run.machine.verdict() {
            return accepted;
        }

        let accepted = catalog.evaluate(run.machine.input(), run.pattern_index);
        run.machine.finish(accepted);

        info!(
            input = run.machine.input(),
            pattern_index = run.pattern_index,
            steps = run.machine.step_count(),
            accepted,
            "run finalized"
        );
        accepted
    }

    /// Ends an auto-run because the machine halted.
    fn end_auto(&mut self) {
        if self.status == ControllerStatus::AutoRunning {
            self.cancel_auto();
            self.status = ControllerStatus::Armed;
            debug!("auto-run finished");
        }
    }

    fn cancel_auto(&mut self) {
        if let Some((token, _)) = self.auto.take() {
            token.cancel();
        }
        self.scheduler.clear();
    }
}
