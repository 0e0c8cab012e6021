use runrow::actions::{ActionOutcome, Collaborators, Location, ReplayControl, RunControl};
use runrow::app::{AppConfig, AppState};
use runrow::cli::Cli;
use runrow::events::{AppEvent, ChannelRouter, EventHandler};
use runrow::input::{self, Action, InputContext};
use runrow::jenkins::{self, JenkinsClient, JenkinsReplay, JenkinsRunControl, Offline};
use runrow::loader;
use runrow::tui;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

fn setup_verbose_logging() -> Result<()> {
    let state_dir = state_dir();
    std::fs::create_dir_all(&state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = state_dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();
    tracing::info!(
        "runrow v{} starting with verbose logging",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

fn state_dir() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        PathBuf::from(state).join("runrow")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("runrow")
    } else {
        PathBuf::from("/tmp/runrow")
    }
}

fn print_rows(state: &AppState) {
    for row in &state.rows {
        println!(
            "{:<10} #{:<8} {:<9} {:>8}  {:<16} {}",
            row.status.canonical,
            row.label,
            row.commit.as_deref().unwrap_or("-"),
            tui::table::format_duration(row.times.duration_in_millis),
            tui::table::format_end(row.times.end_time),
            row.detail_url
        );
    }
    for (run_id, err) in &state.row_errors {
        eprintln!("run {run_id}: {err}");
    }
}

fn load_in_background(state: &AppState, tx: &UnboundedSender<AppEvent>) {
    let pipeline_path = state.config.pipeline_path.clone();
    let runs_path = state.config.runs_path.clone();
    let classes_path = state.config.classes_path.clone();
    let tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        let event = match loader::load_snapshot(&pipeline_path, &runs_path, classes_path.as_deref()) {
            Ok(snapshot) => AppEvent::Loaded(Box::new(snapshot)),
            Err(e) => AppEvent::Error(format!("{e:#}")),
        };
        if tx.send(event).is_err() {
            tracing::warn!("reload: channel closed");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.verbose {
        setup_verbose_logging()?;
    }

    let config = AppConfig {
        pipeline_path: args.pipeline.clone(),
        runs_path: args.runs.clone(),
        classes_path: args.classes.clone(),
        server: args.server.clone(),
        skew_millis: args.skew_ms,
    };

    let snapshot = loader::load_snapshot(&config.pipeline_path, &config.runs_path, config.classes_path.as_deref())?;
    let mut state = AppState::new(config);
    state.apply_snapshot(snapshot);

    if args.once {
        print_rows(&state);
        return Ok(());
    }

    let client = args
        .server
        .as_deref()
        .map(|server| JenkinsClient::new(server, args.user.clone()));

    // Setup terminal with panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(Duration::from_millis(args.tick_ms.max(50)));
    let tx = events.sender();

    let run_control: Arc<dyn RunControl> = match &client {
        Some(c) => Arc::new(JenkinsRunControl::new(c.clone())),
        None => Arc::new(Offline),
    };
    let replay: Arc<dyn ReplayControl> = match &client {
        Some(c) => Arc::new(JenkinsReplay::new(c.clone())),
        None => Arc::new(Offline),
    };
    let collaborators = Collaborators {
        run_control,
        replay,
        router: Arc::new(ChannelRouter::new(tx.clone())),
    };

    let result = run_app(&mut terminal, &mut state, events, &tx, &collaborators, client.as_ref()).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    tx: &UnboundedSender<AppEvent>,
    collaborators: &Collaborators,
    client: Option<&JenkinsClient>,
) -> Result<()> {
    loop {
        terminal.draw(|f| tui::render::render(f, state))?;
        state.prune_messages();

        if let Some(event) = events.next().await {
            match event {
                AppEvent::Tick => {
                    state.advance_spinner();
                    state.refresh_rows();
                }
                AppEvent::Navigate(location) => state.navigate(location),
                AppEvent::Loaded(snapshot) => state.apply_snapshot(*snapshot),
                AppEvent::Status(msg) => state.set_status(msg),
                AppEvent::Error(msg) => {
                    state.is_loading = false;
                    state.set_error(msg);
                }
                AppEvent::Key(key) => {
                    let ctx = InputContext {
                        has_error: state.error.is_some(),
                        is_loading: state.is_loading,
                    };
                    match input::map_key(key, &ctx) {
                        Action::Quit => state.should_quit = true,
                        Action::DismissError => state.clear_error(),
                        Action::MoveUp => state.move_cursor_up(),
                        Action::MoveDown => state.move_cursor_down(),
                        Action::OpenTab(tab) => {
                            if let Some(row) = state.current_row() {
                                let location = Location {
                                    pathname: row.tab_url(tab),
                                    ..state.location.clone()
                                };
                                collaborators.router.push(location);
                            }
                        }
                        Action::OpenBrowser => match (client, state.current_row().map(|r| r.detail_url.clone())) {
                            (Some(client), Some(detail_url)) => {
                                let url = client.web_url(&detail_url);
                                let tx2 = tx.clone();
                                tokio::spawn(async move {
                                    if let Err(e) = jenkins::open_in_browser(&url).await {
                                        if tx2.send(AppEvent::Error(format!("{e}"))).is_err() {
                                            tracing::warn!("open browser: channel closed");
                                        }
                                    }
                                });
                            }
                            (None, _) => {
                                state.set_error("No Jenkins server configured. Pass --server.".to_string());
                            }
                            (Some(_), None) => {}
                        },
                        Action::Stop => {
                            if let Some(actions) = state.current_actions(collaborators.clone()) {
                                let tx2 = tx.clone();
                                actions.spawn_stop(move |actions, outcome| {
                                    let event = match outcome {
                                        Ok(ActionOutcome::Disabled) => AppEvent::Status(format!(
                                            "Run {} is not active",
                                            actions.run_id()
                                        )),
                                        Ok(_) => AppEvent::Status(format!(
                                            "Stop requested for run {}",
                                            actions.run_id()
                                        )),
                                        Err(e) => AppEvent::Error(format!("{e}")),
                                    };
                                    if tx2.send(event).is_err() {
                                        tracing::warn!("stop: channel closed");
                                    }
                                });
                            }
                        }
                        Action::Replay => {
                            if let Some(actions) = state.current_actions(collaborators.clone()) {
                                let tx2 = tx.clone();
                                actions.spawn_replay(move |actions, outcome| {
                                    let event = match outcome {
                                        // Navigation already went through the router.
                                        Ok(ActionOutcome::Navigated(_) | ActionOutcome::Discarded) => return,
                                        Ok(_) => AppEvent::Status(format!(
                                            "Replay of run {} queued",
                                            actions.run_id()
                                        )),
                                        Err(e) => AppEvent::Error(format!("{e}")),
                                    };
                                    if tx2.send(event).is_err() {
                                        tracing::warn!("replay: channel closed");
                                    }
                                });
                            }
                        }
                        Action::Reload => {
                            state.is_loading = true;
                            load_in_background(state, tx);
                        }
                        Action::None => {}
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    events.stop();
    Ok(())
}
