// crates/chat-client/src/main.rs

mod app;
mod components;
mod network;
mod types;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{App, InputMode};
use crate::network::ChatConnection;
use crate::types::{ClientConfig, NetEvent};

#[derive(Parser)]
#[clap(name = "chat-client")]
#[clap(about = "Talk to a random stranger from your terminal")]
struct Cli {
    /// Server URL, overrides the config file
    #[clap(short, long)]
    server: Option<String>,

    /// Path to a TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Write debug logs to stderr
    #[clap(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(io::stderr)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(&config)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let (tx_to_app, mut rx_from_network) = mpsc::unbounded_channel::<NetEvent>();
    let mut network_handle: Option<tokio::task::JoinHandle<()>> = None;

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.input_mode {
                    InputMode::Normal => match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => {
                            app.end_session();
                            app.should_quit = true;
                        }
                        KeyCode::Char('s') | KeyCode::Char('S') => {
                            if app.can_start() {
                                let (tx_to_network, rx_from_app) = mpsc::unbounded_channel();
                                app.begin_session(tx_to_network);
                                let connection =
                                    ChatConnection::new(&app.server_url, tx_to_app.clone());
                                network_handle = Some(tokio::spawn(async move {
                                    connection.run(rx_from_app).await;
                                }));
                            }
                        }
                        KeyCode::Char('x') | KeyCode::Char('X') => {
                            app.end_session();
                        }
                        KeyCode::Char('i') | KeyCode::Char('I') | KeyCode::Enter => {
                            app.start_editing();
                        }
                        KeyCode::F(1) => {
                            app.toggle_help();
                        }
                        _ => {}
                    },

                    InputMode::Editing => match key.code {
                        KeyCode::Enter => {
                            app.submit_input();
                        }
                        KeyCode::Esc => {
                            app.cancel_input();
                        }
                        KeyCode::Backspace => {
                            app.delete_char();
                        }
                        KeyCode::Char(c) => {
                            app.enter_char(c);
                        }
                        _ => {}
                    },
                }
            }
        }

        while let Ok(event) = rx_from_network.try_recv() {
            app.handle_net_event(event);
        }

        if app.should_quit {
            break;
        }
    }

    // Give the session a moment to send its close frame.
    if let Some(handle) = network_handle {
        let _ = tokio::time::timeout(Duration::from_millis(200), handle).await;
    }
    Ok(())
}
