//! PayWatch CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use paywatch_core::config::LoggingConfig;

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--format json` output stays parseable.
///
/// `serve` logs at the configured level; one-shot commands only surface
/// warnings unless `RUST_LOG` says otherwise. An unreadable config file is
/// reported by the command itself, so logging falls back to defaults here.
fn init_logging(cli: &Cli) {
    let logging = commands::load_config(&cli.config)
        .map(|c| c.logging)
        .unwrap_or_default();
    let level = match cli.command {
        Commands::Serve => logging.level.clone(),
        _ => "warn".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if is_json(&logging) {
        builder.json().with_target(true).init();
    } else {
        builder.compact().with_target(false).init();
    }
}

fn is_json(logging: &LoggingConfig) -> bool {
    logging.format.eq_ignore_ascii_case("json")
}
