//! stepscope TUI: checkpoint browser with a step slider, a zoom control, and
//! a metadata drawer.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use stepscope_core::SafetensorsSource;
use stepscope_tui::config::{config_root, TuiConfig};
use stepscope_tui::worker::{self, WorkerCommand};
use stepscope_tui::{input, logging, persistence, ui, AppState};

#[derive(Parser)]
#[command(name = "stepscope-tui", about = "Browse training checkpoints and their metadata")]
struct Args {
    /// Checkpoint directory (overrides the config file)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(TuiConfig::default_path);
    let config = TuiConfig::load(&config_path)?;
    let checkpoint_dir = args.dir.unwrap_or_else(|| config.checkpoint_dir.clone());

    // Logging is optional; the TUI still runs without it.
    let logging_error = logging::init(&config.log_filter).err();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = config_root().join("state.json");
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let source = Arc::new(SafetensorsSource::new(checkpoint_dir.clone()));
    let worker_handle = worker::spawn_worker(source, cmd_rx, resp_tx)?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, checkpoint_dir, config.zoom_size);
    persistence::apply(&mut app, persisted);
    app.rescan();
    if let Some(e) = logging_error {
        app.set_warning(format!("Logging disabled: {e}"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, Duration::from_millis(config.tick_ms));

    // Save state before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        tracing::warn!(error = %e, "failed to save UI state");
    }

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    tick: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        app.drain_worker();

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
