//! Perso Chat - Terminal Client for the Perso Answer Service
//!
//! Line-oriented chat over the answer service. Each line typed is sent as a
//! question; answers are rendered from the conductor's document tree.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session against the default service
//! perso-chat
//!
//! # Custom service and timeout
//! perso-chat --base-url https://qa.example.com --timeout-secs 10
//!
//! # One question, then exit
//! perso-chat "What is Perso.ai?"
//!
//! # Verbose logging (to stderr)
//! RUST_LOG=debug perso-chat
//! ```
//!
//! # Commands
//!
//! - `/reset`: Clear the conversation
//! - `/dismiss`: Hide the error banner
//! - `/help`: Show commands
//! - `/quit`: Exit
//!
//! Ctrl-C while waiting cancels the request; at the prompt it exits.

mod display;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use perso_conductor_core::{
    default_config_path, load_config_from_path, AnswerBackend, ConductorMessage, ConfigOverrides,
    HttpAnswerBackend,
};

use display::Display;

type Conductor = perso_conductor_core::Conductor<HttpAnswerBackend>;

/// Perso Chat - ask the Perso answer service from the terminal
#[derive(Parser, Debug)]
#[command(name = "perso-chat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Answer service base URL
    #[arg(short = 'u', long, value_name = "URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Skip the startup health check
    #[arg(long)]
    no_health_check: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "PERSO_CHAT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "PERSO_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Disable colored output (also honoured via `NO_COLOR`)
    #[arg(long)]
    no_color: bool,

    /// Ask a single question and exit
    question: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.base_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            overrides = overrides.with_timeout_secs(secs);
        }
        if self.no_health_check {
            overrides = overrides.with_health_check_on_start(false);
        }
        overrides
    }
}

/// A line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    Reset,
    Dismiss,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "/reset" | "/new" => Self::Reset,
            "/dismiss" => Self::Dismiss,
            "/help" | "/?" => Self::Help,
            "/quit" | "/exit" | "/q" => Self::Quit,
            _ if line.starts_with('/') => Self::Unknown(line),
            _ => Self::Ask(line),
        }
    }
}

/// Map a bare number to a suggested question, while suggestions are shown
fn resolve_suggestion<'a>(input: &'a str, suggestions: &[&'a str]) -> &'a str {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| suggestions.get(i).copied())
        .unwrap_or(input)
}

const HELP: &str = "Commands: /reset  /dismiss  /help  /quit\nCtrl-C cancels a pending answer.";

/// Initialize logging with the specified level
///
/// Logs go to stderr so they never interleave with answers on stdout.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "perso_chat={level},perso_conductor_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Print everything the conductor has queued for the surface
fn drain(rx: &mut mpsc::Receiver<ConductorMessage>, display: &Display) {
    while let Ok(msg) = rx.try_recv() {
        if let Some(text) = display.message(&msg) {
            println!("{text}");
        }
    }
}

/// Wait for the pending answer; the first Ctrl-C cancels it
async fn await_answer(conductor: &mut Conductor) {
    let interrupted = tokio::select! {
        _ = conductor.wait_response() => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        conductor.cancel();
        conductor.wait_response().await;
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Perso Chat starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: file < env < CLI
    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        base_url = %config.base_url,
        timeout_secs = config.request_timeout.as_secs(),
        source = %config.source(),
        "Configuration resolved"
    );

    let backend = HttpAnswerBackend::new(config.base_url.clone())
        .context("Failed to create HTTP client")?;
    let backend_url = backend.base_url().to_string();
    let backend_name = backend.name().to_string();

    let (tx, mut rx) = mpsc::channel(100);
    let mut conductor = Conductor::new(backend, config.conductor_config(), tx);
    let color = !args.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();
    let display = Display::new(color);

    if !conductor.start().await {
        eprintln!("warning: answer service at {backend_url} is not reachable");
    }
    drain(&mut rx, &display);

    // One-shot mode
    if let Some(question) = args.question.as_deref() {
        if conductor.send_message(question).await {
            drain(&mut rx, &display);
            await_answer(&mut conductor).await;
            drain(&mut rx, &display);
        }
        if let Some(banner) = conductor.banner() {
            anyhow::bail!("{}", banner.message);
        }
        return Ok(());
    }

    println!("{}", display.suggestions(conductor.suggested_questions()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Unknown(cmd) => println!("Unknown command: {cmd} (try /help)"),
            Command::Dismiss => conductor.dismiss_error().await,
            Command::Reset => {
                conductor.reset().await;
                drain(&mut rx, &display);
                println!("{}", display.suggestions(conductor.suggested_questions()));
            }
            Command::Ask(text) => {
                let text = if conductor.conversation().is_empty() {
                    resolve_suggestion(text, conductor.suggested_questions())
                } else {
                    text
                };
                if conductor.send_message(text).await {
                    drain(&mut rx, &display);
                    await_answer(&mut conductor).await;
                }
            }
        }
        drain(&mut rx, &display);
    }

    info!(
        turns = conductor.conversation().len(),
        backend = %backend_name,
        "Perso Chat exiting"
    );
    Ok(())
}
