use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use howdy_core::config::URL_ENV_VAR;
use howdy_core::{ChatSession, Config, OrchestratorClient, UserRole};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "howdy", version)]
#[command(about = "Ask Well-Sec Howdy about company policies")]
struct Cli {
    /// Orchestrator endpoint (overrides the config file)
    #[arg(long, global = true, env = URL_ENV_VAR)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        query: String,
        /// User role sent with the query
        #[arg(short, long, default_value = "normal", value_parser = parse_role)]
        role: UserRole,
    },
    /// Show the resolved endpoint, or save a new one to the config file
    Config {
        /// Endpoint to store in the config file
        #[arg(long)]
        set_url: Option<String>,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::from_str(s).ok_or_else(|| format!("unknown role '{}' (expected normal or super)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = config_or_default(Config::load());
    let url = config.resolve_url(cli.url.as_deref());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            logging::init_file(&Config::config_dir()?.join("howdy.log"))?;
            report_config_error(config_error.as_ref());
            let client = OrchestratorClient::new(&url);
            info!(url = %client.url(), "starting chat screen");
            run_tui(client).await
        }
        Commands::Ask { query, role } => {
            logging::init_stderr()?;
            report_config_error(config_error.as_ref());
            ask_once(OrchestratorClient::new(&url), &query, role).await
        }
        Commands::Config { set_url } => {
            logging::init_stderr()?;
            report_config_error(config_error.as_ref());
            configure(config, &url, set_url)
        }
    }
}

/// Fall back to an empty config when the file cannot be read, keeping the
/// error so it can be logged once a subscriber is installed.
fn config_or_default(loaded: Result<Config>) -> (Config, Option<anyhow::Error>) {
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(e)),
    }
}

fn report_config_error(error: Option<&anyhow::Error>) {
    if let Some(e) = error {
        warn!(error = %format!("{:#}", e), "config file unreadable, using defaults");
    }
}

async fn run_tui(client: OrchestratorClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);
    let mut app = App::new(client);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!(turns = app.session.len(), "chat screen closed");
    result
}

/// Draw after every event so each state change is on screen before the next one.
async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_query_task().await;
    }
    Ok(())
}

async fn ask_once(client: OrchestratorClient, query: &str, role: UserRole) -> Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow!("Question must not be empty"));
    }

    let mut session = ChatSession::new();
    session.set_role(role);

    println!("{} {}", "You:".bold().cyan(), query);
    println!("{}", format!("🤖 Asking as {} user...", role.as_str()).dimmed());

    let reply = session.exchange(&client, query).await;
    println!("\n{}", "Howdy:".bold().yellow());
    println!("{}", reply.content);

    Ok(())
}

fn configure(mut config: Config, resolved_url: &str, set_url: Option<String>) -> Result<()> {
    match set_url {
        Some(new_url) => {
            let new_url = new_url.trim().to_string();
            if new_url.is_empty() {
                return Err(anyhow!("Endpoint must not be empty"));
            }
            config.orchestrator_url = Some(new_url.clone());
            let path = config.save()?;
            info!(url = %new_url, "saved orchestrator endpoint");
            println!("{} {}", "Saved endpoint:".bold().green(), new_url);
            println!("{} {}", "Config file:".dimmed(), path.display());
        }
        None => {
            println!("{} {}", "Endpoint:".bold().blue(), resolved_url);
            println!(
                "{} {}",
                "Config file:".dimmed(),
                Config::get_config_path()?.display()
            );
            if std::env::var(URL_ENV_VAR).map(|v| !v.trim().is_empty()).unwrap_or(false) {
                println!("{}", format!("({} is set and takes precedence)", URL_ENV_VAR).yellow());
            }
        }
    }
    Ok(())
}
