mod app;

use action::Action;
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Represents the state of the application loop.
#[derive(PartialEq)]
enum AppState {
    Running,
    ShouldQuit,
}

/// A wrapper around the terminal to ensure it's restored on drop.
struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    /// Creates a new TUI.
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Restore the terminal to its original state.
        // The results are ignored as we can't do much about errors during drop.
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    // Initialize the TUI. The `Tui` struct will handle cleanup on drop.
    let mut tui = Tui::new()?;

    run_app(&mut tui.terminal, App::new())?;

    Ok(())
}

/// Sends logs to a file in the temp directory so they never draw over the terminal.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = log_file_path();

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .init();
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        // Without a log file, prefer no logs over corrupting the terminal.
        Err(_) => tracing_subscriber::registry().with(filter).init(),
    }
}

fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("tursim-tui.log")
}

/// Runs the main application loop.
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(app.timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key_event(&mut app, key) == AppState::ShouldQuit
                {
                    return Ok(());
                }
            }
        }

        app.tick();
    }
}

/// Handles key events and updates the application state.
fn handle_key_event(app: &mut App, key: KeyEvent) -> AppState {
    if app.is_editing() {
        app.handle_edit_key(key);
        return AppState::Running;
    }

    if let Some(action) = app.keymap.get(&key) {
        match action {
            Action::Quit => return AppState::ShouldQuit,
            Action::EditInput => app.start_editing(),
            Action::Prepare => app.prepare(),
            Action::Step => app.step_machine(),
            Action::ToggleAutoPlay => app.toggle_auto_play(),
            Action::Reset => app.reset_machine(),
            Action::Export => app.export_report(),
            Action::ToggleHelp => app.toggle_help(),
            Action::PreviousPattern => app.previous_pattern(),
            Action::NextPattern => app.next_pattern(),
        }
    }
    AppState::Running
}
