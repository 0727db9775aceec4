use action::Action;
use crossterm::event::{KeyCode, KeyEvent};
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use std::{path::Path, sync::Arc, time::Duration};
use tursim::{
    ControllerStatus, PatternCatalog, RunController, SimulatorError, Step, StepResult,
    TuringMachine, BLANK_SYMBOL,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);
/// Number of tape cells shown around the head.
const VISIBLE_CELLS: usize = 25;
/// Longest the event loop waits for input before checking the scheduler again.
const IDLE_TIMEOUT: Duration = Duration::from_millis(100);

pub struct App {
    controller: RunController,
    input: String,
    selected_pattern: usize,
    editing: bool,
    last_step: Option<StepResult>,
    message: String,
    show_help: bool,
    pub(crate) keymap: Config<Action>,
}

impl App {
    pub fn new() -> Self {
        let catalog = PatternCatalog::default();
        if let Err(errors) = catalog.validate() {
            for error in errors {
                tracing::warn!("{error}");
            }
        }

        Self {
            controller: RunController::new(Arc::new(catalog), Default::default()),
            input: String::new(),
            selected_pattern: 0,
            editing: false,
            last_step: None,
            message: "Press 'i' to type an input string, Enter to prepare. Press 'h' for help."
                .to_string(),
            show_help: false,
            keymap: Action::keymap_config(),
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let inner_area = f.area().inner(Margin::new(1, 0));

        // Main vertical chunks: Input, Middle (Tape + Patterns), Status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Input and selected pattern
                Constraint::Min(0),    // Middle section (flexible height)
                Constraint::Length(3), // Status/controls
            ])
            .split(inner_area);

        self.render_input(f, main_chunks[0]);

        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Machine
                Constraint::Length(1),
                Constraint::Percentage(40), // Patterns / Help
            ])
            .split(main_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Machine State
                Constraint::Min(0),    // Tape
            ])
            .split(middle_chunks[0]);

        self.render_machine_state(f, left_chunks[0]);
        self.render_tape(f, left_chunks[1]);

        if self.show_help {
            self.render_help(f, middle_chunks[2]);
        } else {
            self.render_patterns(f, middle_chunks[2]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_input(&self, f: &mut Frame, area: Rect) {
        let cursor = if self.editing { "▏" } else { "" };
        let input_style = if self.editing {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        let pattern_name = self
            .controller
            .catalog()
            .get(self.selected_pattern)
            .map(|pattern| pattern.name())
            .unwrap_or("-");

        let text = vec![
            Line::from(vec![
                Span::styled("Input: ", Style::default().fg(Color::Yellow)),
                Span::styled(format!("{}{}", self.input, cursor), input_style),
            ]),
            Line::from(vec![
                Span::styled("Pattern: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!(
                    "{} ({}/{})",
                    pattern_name,
                    self.selected_pattern + 1,
                    self.controller.catalog().len()
                )),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("Tursim - Tape Scanning Simulator (TUI)").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let Some(machine) = self.controller.machine() else {
            f.render_widget(
                section("Machine State", vec![Line::from("Not prepared")]),
                area,
            );
            return;
        };

        let (status_text, status_color) = match self.controller.status() {
            _ if machine.is_halted() => ("HALTED", Color::Red),
            ControllerStatus::AutoRunning => ("AUTO", Color::Green),
            _ if machine.step_count() == 0 => ("READY", Color::Blue),
            _ => ("STEPPING", Color::Green),
        };

        let (verdict_text, verdict_color) = match machine.verdict() {
            Some(true) => ("ACCEPTED", Color::Green),
            Some(false) => ("REJECTED", Color::Red),
            None => ("-", Color::Gray),
        };

        let description = self
            .last_step
            .as_ref()
            .map(|step| step.description.as_str())
            .unwrap_or("Prepared. Step or start auto-play.");

        let text = vec![
            Line::from(vec![
                Span::styled("Current State: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    machine.state().label(),
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(machine.step_count().to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(status_text, Style::default().fg(status_color)),
            ]),
            Line::from(vec![
                Span::styled("Result: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    verdict_text,
                    Style::default()
                        .fg(verdict_color)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(description, Style::default().fg(Color::Cyan))),
        ];

        f.render_widget(section("Machine State", text).wrap(Wrap { trim: false }), area);
    }

    fn render_tape(&self, f: &mut Frame, area: Rect) {
        let Some(machine) = self.controller.machine() else {
            f.render_widget(section("Tape", Vec::new()), area);
            return;
        };

        let (left, cells) = visible_window(machine);
        let head = machine.head();

        let tape_spans: Vec<Span> = cells
            .iter()
            .enumerate()
            .map(|(offset, &symbol)| {
                if left + offset == head {
                    Span::styled(
                        format!(" {symbol} "),
                        Style::default()
                            .bg(Color::Yellow)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(format!(" {symbol} "), Style::default())
                }
            })
            .collect();

        let text_lines = vec![
            Line::from(tape_spans),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "Head at position: {} (symbol: '{}')",
                    head,
                    machine.symbol()
                ),
                Style::default().fg(Color::Cyan),
            )),
        ];

        f.render_widget(section("Tape", text_lines).wrap(Wrap { trim: false }), area);
    }

    fn render_patterns(&self, f: &mut Frame, area: Rect) {
        let lines = self
            .controller
            .catalog()
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let text = format!("{}. {}", i + 1, pattern.name());
                if i == self.selected_pattern {
                    Line::from(Span::styled(
                        text,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(text)
                }
            })
            .collect();

        f.render_widget(section("Patterns", lines), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let mut help_text = vec![
            Line::from("Controls:"),
            Line::from("  i - Edit the input (Enter prepares, Esc stops editing)"),
            Line::from("  Enter - Prepare the simulation"),
            Line::from("  Space - Step forward"),
            Line::from("  p - Toggle auto-play"),
            Line::from("  r - Reset"),
            Line::from("  e - Export report"),
            Line::from("  ↑ ↓ - Select pattern"),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from("Automaton:"),
        ];

        help_text.extend(TuringMachine::transition_table().iter().map(|t| {
            Line::from(format!(
                "  {} --{:?}--> {} ({:?}{})",
                t.from,
                t.read,
                t.to,
                t.direction,
                if t.halts { ", halt" } else { "" }
            ))
        }));
        help_text.push(Line::from(""));
        help_text.push(Line::from(
            "The verdict comes from the selected pattern, matched against the whole input.",
        ));

        f.render_widget(section("Help", help_text).wrap(Wrap { trim: false }), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let outer = block("Status");
        let inner = outer.inner(area);

        let auto_play_status = if self.controller.is_auto_running() {
            "ON"
        } else {
            "OFF"
        };
        let status = Text::from(Line::from(vec![
            Span::raw("Auto-play: "),
            Span::styled(auto_play_status, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]));

        f.render_widget(outer, area);
        f.render_widget(status, inner);
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_editing(&mut self) {
        self.controller.stop_auto();
        self.editing = true;
        self.message = "Editing input. Enter prepares, Esc stops editing.".to_string();
    }

    /// Handles a key while the input field has focus.
    pub fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.prepare();
            }
            KeyCode::Esc => {
                self.editing = false;
                self.message = "Press Enter to prepare the simulation.".to_string();
            }
            KeyCode::Up => self.previous_pattern(),
            KeyCode::Down => self.next_pattern(),
            _ => {}
        }
    }

    pub fn prepare(&mut self) {
        self.controller
            .prepare(self.input.trim(), self.selected_pattern);
        self.last_step = None;
        self.message = "Simulation prepared. Step or start auto-play.".to_string();
    }

    pub fn step_machine(&mut self) {
        let result = self.controller.step();
        self.apply(result);
    }

    /// Acts on a due auto-play tick, if any.
    pub fn tick(&mut self) {
        if let Some(result) = self.controller.poll() {
            self.apply(result);
        }
    }

    /// Returns how long the event loop may wait before the next auto-play tick is due.
    pub fn timeout(&self) -> Duration {
        self.controller
            .scheduler()
            .time_until_next()
            .map_or(IDLE_TIMEOUT, |due| due.min(IDLE_TIMEOUT))
    }

    pub fn toggle_auto_play(&mut self) {
        self.message = match self.controller.toggle_auto() {
            Ok(true) => "Auto-play enabled".to_string(),
            Ok(false) if self.controller.verdict().is_some() => {
                "Machine is halted. Press 'r' to reset.".to_string()
            }
            Ok(false) => "Auto-play disabled".to_string(),
            Err(e) => e.to_string(),
        };
    }

    pub fn reset_machine(&mut self) {
        self.controller.reset();
        self.input.clear();
        self.last_step = None;
        self.editing = false;
        self.message = "Simulator reset. Press 'i' to type a new input.".to_string();
    }

    pub fn export_report(&mut self) {
        self.message = match self.controller.export_report(Path::new(".")) {
            Ok(path) => format!("Report saved as {}", path.display()),
            Err(e) => e.to_string(),
        };
    }

    pub fn next_pattern(&mut self) {
        let count = self.controller.catalog().len();
        self.selected_pattern = (self.selected_pattern + 1) % count;
        self.pattern_selected();
    }

    pub fn previous_pattern(&mut self) {
        let count = self.controller.catalog().len();
        self.selected_pattern = if self.selected_pattern == 0 {
            count - 1
        } else {
            self.selected_pattern - 1
        };
        self.pattern_selected();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    fn pattern_selected(&mut self) {
        if self.controller.pattern_index().is_some() {
            self.message = "Pattern changed. Press Enter to prepare a new run.".to_string();
        }
    }

    fn apply(&mut self, result: Result<Step, SimulatorError>) {
        match result {
            Ok(Step::Continue(snapshot)) => {
                self.message = format!("Step {} completed", self.step_count());
                self.last_step = Some(snapshot);
            }
            Ok(Step::Halt(halt)) => {
                self.message = format!(
                    "Simulation finished in {} steps. The input was {}.",
                    self.step_count(),
                    if halt.accepted { "ACCEPTED" } else { "REJECTED" }
                );
                if let Some(snapshot) = halt.snapshot {
                    self.last_step = Some(snapshot);
                }
            }
            Err(e) => self.message = e.to_string(),
        }
    }

    fn step_count(&self) -> usize {
        self.controller
            .machine()
            .map_or(0, TuringMachine::step_count)
    }
}

/// Returns the index of the first visible cell and the visible cells, centred on the head.
fn visible_window(machine: &TuringMachine) -> (usize, Vec<char>) {
    let symbols = machine.symbols();
    let mut left = machine.head().saturating_sub(VISIBLE_CELLS / 2);
    if left + VISIBLE_CELLS > symbols.len() {
        left = symbols.len().saturating_sub(VISIBLE_CELLS);
    }

    let cells = (left..left + VISIBLE_CELLS)
        .map(|i| symbols.get(i).copied().unwrap_or(BLANK_SYMBOL))
        .collect();
    (left, cells)
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}
