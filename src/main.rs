//! cheez-jokes — a votable, lockable list of dad jokes for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  FetchMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!                           ▲     │ Persisted<Vec<Joke>>
//!        handle_key_event() │     ▼
//!                     ┌──────────┐ ┌────────────┐
//!                     │ input.rs │ │ storage.rs │
//!                     └──────────┘ └────────────┘
//! ```
//!
//! * **`source/`** — the `JokeSource` trait, joke records, and the
//!   icanhazdadjoke.com implementation.
//! * **`fetch`** — one fetch cycle on a background thread.
//! * **`app`** — owns the jokes, the loading flag and the list selection.
//! * **`joke_item`** — one joke row and the intents it can raise.
//! * **`storage`** — durable key-value store and the persisted accessor.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` operations.
//! * **`main`** — wires everything together: config, logging, the terminal,
//!   and the event loop.

mod app;
mod config;
mod error;
mod fetch;
mod input;
mod joke_item;
mod source;
mod storage;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use source::IcanhazSource;
use storage::{FileStore, Persisted};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// The log only covers the current session; it is truncated on every start.
fn open_log_file(dir: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dir.join("cheez-jokes.log"))
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let log_file = open_log_file(&config.data_dir).context("opening log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cheez_jokes=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    install_panic_hook();

    let config = Config::load()?;
    init_logging(&config)?;
    tracing::info!(endpoint = %config.endpoint, count = config.num_jokes_to_get, "Starting");

    // -- state ---------------------------------------------------------------
    let store = FileStore::open(&config.data_dir).context("opening joke store")?;
    let jokes = Persisted::load(Box::new(store), config.storage_key.as_str(), Vec::new());
    let source = Arc::new(IcanhazSource::new(config.endpoint.as_str())?);
    let mut app = App::new(jokes, source, config.num_jokes_to_get);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    app.initialize();

    // -- main event loop -----------------------------------------------------
    // Each tick: apply a finished fetch, render, then wait up to tick_rate
    // for a key.
    let tick_rate = Duration::from_millis(100);
    let mut tick: usize = 0;

    loop {
        app.poll_fetch();

        guard.terminal.draw(|f| ui::draw(&mut app, f, tick))?;
        tick = tick.wrapping_add(1);

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("Exiting");
    Ok(())
}
