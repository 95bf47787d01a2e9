//! custview - Terminal Customer Browser
//!
//! Browses a remote customer collection from the terminal. Search input is
//! debounced, filter and page changes fetch immediately, and every response
//! is checked against the most recently issued request before it is shown.

use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use custview::application::{App, AppMode, Debouncer, FetchOutcome};
use custview::infrastructure::{init_logging, Cli, FetchDispatcher, HttpCustomerClient, ThreadDispatcher};
use custview::presentation::{render_ui, InputHandler};

/// Upper bound on how long the loop blocks waiting for input.
const TICK: Duration = Duration::from_millis(100);

/// Entry point for the custview terminal browser.
///
/// Validates configuration before touching the terminal, sets up the
/// terminal interface, and runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if configuration is invalid, if terminal setup fails,
/// or if there are issues with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    init_logging(config.log_file.as_deref())?;

    let debouncer = Debouncer::from_millis(config.debounce_ms)?;
    let client = HttpCustomerClient::new(&config.base_url, config.timeout)?;
    info!(
        endpoint = %client.endpoint(),
        debounce_ms = config.debounce_ms,
        timeout_secs = config.timeout.as_secs(),
        "starting custview"
    );
    let (dispatcher, outcomes) = ThreadDispatcher::new(client);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(debouncer);
    let res = run_app(&mut terminal, &mut app, &dispatcher, &outcomes);
    app.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(%err, "event loop failed");
        println!("{err:?}");
    }

    info!("custview stopped");
    Ok(())
}

/// Main application event loop.
///
/// Each pass draws the UI, waits for input no longer than the next debounce
/// deadline, fires the debounced search if it is due, and drains completed
/// fetches. All controller state is touched from this thread only.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend, D: FetchDispatcher>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &D,
    outcomes: &Receiver<FetchOutcome>,
) -> io::Result<()> {
    dispatcher.dispatch(app.start());

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let wait = app
            .next_deadline(Instant::now())
            .map_or(TICK, |due| due.min(TICK));

        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let quit = match key.code {
                        KeyCode::Char('q') => app.mode == AppMode::Browse,
                        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                        _ => false,
                    };
                    if quit {
                        return Ok(());
                    }
                    if let Some(request) =
                        InputHandler::handle_key_event(app, key.code, key.modifiers, Instant::now())
                    {
                        dispatcher.dispatch(request);
                    }
                }
            }
        }

        if let Some(request) = app.tick(Instant::now()) {
            dispatcher.dispatch(request);
        }

        while let Ok(outcome) = outcomes.try_recv() {
            app.apply_outcome(outcome);
        }
    }
}
