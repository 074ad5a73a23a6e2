//! Trip Planner CLI binary entry point.

use std::io::{self, BufRead};

use tracing_subscriber::EnvFilter;
use trip_planner::chat::{render, ChatApp, GREETING_PLACEHOLDER, PAGE_TITLE};
use trip_planner::cli::{format_error_help, Cli};
use trip_planner::error::Result;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse_args();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", format_error_help(&e, &cli.api_key_env));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    tracing::debug!(?config, "loaded configuration");

    let mut app = ChatApp::from_config(&config)?;
    let mut stdout = io::stdout();
    render::render_header(&mut stdout, PAGE_TITLE)?;

    if let Some(prompt) = &cli.prompt {
        app.submit(prompt);
        render::render_transcript(&mut stdout, app.history())?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        let hint = if app.history().is_empty() {
            GREETING_PLACEHOLDER
        } else {
            ""
        };
        render::render_prompt(&mut stdout, hint)?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if matches!(input, "/quit" | "/exit") {
            break;
        }
        if let Some(reply) = app.submit(input) {
            render::render_message(&mut stdout, reply)?;
        }
    }

    Ok(())
}
