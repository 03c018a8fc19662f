//! spotifetch - Listening analytics dashboard
//!
//! Terminal UI showing a user's listening numbers and a radial hour clock
//! that can be explored with the mouse.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use spotifetch_core::analytics::TimeRange;
use spotifetch_core::chart::PolarChartRenderer;
use spotifetch_core::history::{
    Aggregation, EventSource, HistoryAggregator, HttpEventSource, JsonFileSource,
};
use spotifetch_core::Config;
use tokio::runtime::Runtime;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "spotifetch")]
#[command(about = "Listening analytics dashboard")]
#[command(version)]
struct Args {
    /// User whose history is fetched (default: source.user_id from config)
    #[arg(long)]
    user: Option<String>,

    /// Read history from a JSON export instead of the history service
    #[arg(long)]
    input: Option<PathBuf>,

    /// Initial time range: week, month, quarter or year
    #[arg(long)]
    range: Option<TimeRange>,
}

/// Fetches the whole (capped) history for one user.
struct HistoryLoader {
    aggregator: HistoryAggregator<Box<dyn EventSource>>,
    user: String,
}

impl HistoryLoader {
    fn new(args: &Args, config: &Config) -> Result<Self> {
        let (source, user): (Box<dyn EventSource>, String) = match &args.input {
            Some(path) => {
                let source = JsonFileSource::open(path).with_context(|| {
                    format!("failed to read history export {}", path.display())
                })?;
                let user = args.user.clone().unwrap_or_else(|| "local".to_string());
                (Box::new(source), user)
            }
            None => {
                let user = args
                    .user
                    .clone()
                    .or_else(|| config.source.user_id.clone())
                    .context("no user given; pass --user or set source.user_id in the config")?;
                let source = HttpEventSource::new(&config.source)
                    .context("invalid [source] configuration")?;
                (Box::new(source), user)
            }
        };

        let aggregator = HistoryAggregator::from_config(source, &config.source)
            .context("invalid paging options")?;
        Ok(Self { aggregator, user })
    }

    async fn load(&self) -> Result<Aggregation> {
        self.aggregator
            .collect(&self.user)
            .await
            .with_context(|| format!("failed to fetch history for {}", self.user))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        spotifetch_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("spotifetch TUI starting up");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    // Fetch before touching the terminal so errors print normally
    let loader = HistoryLoader::new(&args, &config)?;
    let history = runtime.block_on(loader.load())?;

    let renderer = PolarChartRenderer::from_config(&config.chart).context("invalid chart colors")?;
    let range = args.range.unwrap_or(config.analytics.default_range);
    let mut app = App::new(renderer, range, config.analytics.top_count);
    app.set_history(history.events, history.stop);

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &runtime, &loader);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("spotifetch TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &Runtime,
    loader: &HistoryLoader,
) -> Result<()> {
    loop {
        if app.take_refresh_request() {
            // Draw the "Refreshing..." status before blocking on the fetch
            terminal.draw(|frame| ui::render(frame, app))?;
            match runtime.block_on(loader.load()) {
                Ok(history) => app.set_history(history.events, history.stop),
                Err(e) => {
                    tracing::warn!(error = %e, "History refresh failed");
                    app.status = Some(format!(
                        "Refresh failed, see {}",
                        spotifetch_core::logging::log_file_path().display()
                    ));
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll faster while the bars are still fading in
        let timeout = if app.is_animating() {
            Duration::from_millis(30)
        } else {
            Duration::from_millis(100)
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
