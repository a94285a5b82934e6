use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use vstui::app::App;
use vstui::config::Config;
use vstui::query::Store;
use vstui::resource::{fetch_rows, View};
use vstui::session::connect;
use vstui::ui::splash::{render as render_splash, render_env_required, SplashState};
use vstui::{event, ui};

/// Terminal UI for files and vector stores
#[derive(Parser, Debug)]
#[command(name = "vstui", version, about, long_about = None)]
struct Args {
    /// API base URL (overrides VSTUI_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// API key sent as a bearer token (overrides VSTUI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// View to open at startup
    #[arg(long, value_enum)]
    view: Option<StartView>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long)]
    readonly: bool,

    /// Seconds a cached list stays fresh
    #[arg(long)]
    stale_secs: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StartView {
    Files,
    VectorStores,
}

impl From<StartView> for View {
    fn from(view: StartView) -> Self {
        match view {
            StartView::Files => View::Files,
            StartView::VectorStores => View::VectorStores,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vstui started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("vstui").join("vstui.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".vstui").join("vstui.log");
    }
    PathBuf::from("vstui.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = initialize_with_splash(&mut terminal, &args).await;

    match result {
        Ok(Some(mut app)) => {
            let run_result = run_app(&mut terminal, &mut app).await;
            cleanup_terminal(&mut terminal)?;

            if let Err(err) = run_result {
                eprintln!("Error: {err:?}");
            }
        }
        Ok(None) => {
            cleanup_terminal(&mut terminal)?;
        }
        Err(err) => {
            cleanup_terminal(&mut terminal)?;
            eprintln!("Initialization error: {err:?}");
        }
    }

    Ok(())
}

fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn initialize_with_splash<B: Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
) -> Result<Option<App>>
where
    B::Error: Send + Sync + 'static,
{
    let mut splash = SplashState::new();
    terminal.draw(|f| render_splash(f, &splash))?;

    if check_abort()? {
        return Ok(None);
    }

    // Step 1: Load configuration
    let mut config = Config::load();
    if let Some(secs) = args.stale_secs {
        config.stale_secs = secs;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }

    let Some(endpoint) = config.effective_endpoint(args.endpoint.as_deref()) else {
        tracing::warn!("No endpoint configured");
        terminal.draw(render_env_required)?;
        wait_for_key()?;
        return Ok(None);
    };
    let api_key = config.effective_api_key(args.api_key.as_deref());

    splash.set_message("Loading config");
    terminal.draw(|f| render_splash(f, &splash))?;
    splash.complete_step();

    if check_abort()? {
        return Ok(None);
    }

    // Step 2: Build the API client
    splash.set_message(&format!("Connecting to {}", endpoint));
    terminal.draw(|f| render_splash(f, &splash))?;

    let timeout = Duration::from_secs(config.timeout_secs);
    let (api, session) = connect(&endpoint, api_key, timeout)
        .with_context(|| format!("Invalid endpoint {}", endpoint))?;
    tracing::info!("Using endpoint: {}", endpoint);
    splash.complete_step();

    // Step 3: Data-access layer
    let mut store = Store::new(api, Duration::from_secs(config.stale_secs));
    store.notifications.toast_duration = Duration::from_secs(config.toast_duration_secs);
    store.notifications.max_history = config.max_history;
    splash.complete_step();

    if check_abort()? {
        return Ok(None);
    }

    // Step 4: Fetch the initial view
    let view = args
        .view
        .map(View::from)
        .or_else(|| config.last_view.as_deref().and_then(View::parse))
        .unwrap_or_default();

    splash.set_message(&format!("Fetching {}", view));
    terminal.draw(|f| render_splash(f, &splash))?;

    let mut app = App::new(store, session, config, view, args.readonly);
    let params = app.list_params();
    match fetch_rows(view, &app.store, &params).await {
        Ok(page) => app.set_rows(page),
        Err(e) if e.is_unauthorized() => {}
        Err(e) => app.error_message = Some(vstui::api::format_api_error(&e)),
    }
    app.check_session();

    splash.complete_step();
    splash.set_message("Ready!");
    terminal.draw(|f| render_splash(f, &splash))?;

    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(Some(app))
}

fn check_abort() -> Result<bool> {
    if poll(Duration::from_millis(50))? {
        if let Event::Key(key) = read()? {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn wait_for_key() -> Result<()> {
    loop {
        if let Event::Key(_) = read()? {
            return Ok(());
        }
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Writes queued by the last key press run after their pending frame
        if app.has_queued() {
            app.run_queued().await?;
            continue;
        }

        if event::handle_events(app).await? {
            return Ok(());
        }

        app.tick(Instant::now()).await?;
    }
}
