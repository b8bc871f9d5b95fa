//! Chronicle - a scroll-synchronised timeline viewer for the terminal.
//!
//! Events are shown as a stack of cards next to a vertical time axis. The
//! card nearest the centre of the pane is the active one: it is highlighted,
//! and a marker on the axis shows where it falls in time. A toggleable
//! overview lists every event for direct navigation.

mod app;
mod axis;
mod config;
mod error;
mod layout;
mod loader;
mod markup;
mod models;
mod theme;
mod timeline;
mod tracker;
mod ui;
mod viewport;

use std::fs::File;
use std::io::{self, stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Args, Settings};
use loader::{LoaderCommand, LoaderMessage};

/// Frame rate for animations (approximately 30 FPS)
const FRAME_DURATION: Duration = Duration::from_millis(33);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();
    install_panic_hook(|| {
        restore_terminal().ok();
    });

    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let settings = Settings::from_args(&args).context("Invalid configuration")?;
    tracing::info!(
        source = %settings.source,
        start = %settings.bounds.start(),
        end = %settings.bounds.end(),
        custom_bounds = settings.custom_bounds(),
        "starting"
    );

    run_tui(settings).await
}

/// Send diagnostics to `log_file`, if given. The terminal belongs to the UI,
/// so without a file nothing is written.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

/// Chain a hook that restores the terminal in front of the current panic
/// reporter, so the report lands on a usable screen.
fn install_panic_hook<F>(restore: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let report = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        report(info);
    }));
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

async fn run_tui(settings: Settings) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (msg_tx, mut msg_rx) = mpsc::channel::<LoaderMessage>(8);
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<LoaderCommand>(8);

    let source = settings.source.clone();
    let loader_task = tokio::spawn(async move {
        loader::run_loader_worker(source, msg_tx, &mut cmd_rx).await
    });
    cmd_tx.send(LoaderCommand::Load).await.ok();

    let mut app = App::new(settings);
    let result = run_event_loop(&mut terminal, &mut app, &mut msg_rx, &cmd_tx).await;

    // Restore the terminal even when the loop failed.
    restore_terminal().context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    cmd_tx.send(LoaderCommand::Shutdown).await.ok();
    loader_task.abort();

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    msg_rx: &mut mpsc::Receiver<LoaderMessage>,
    cmd_tx: &mpsc::Sender<LoaderCommand>,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.resize(Rect::new(0, 0, size.width, size.height));

        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        while let Ok(msg) = msg_rx.try_recv() {
            app.handle_loader_message(msg);
        }

        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = app.handle_key(key) {
                        cmd_tx.send(cmd).await.ok();
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
