//! Tracker server entry point.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use tracker_config::{ConfigLoader, DEFAULT_ENV_PREFIX, ENV_KEYS};
use tracker_server::{Server, ShutdownSignal};
use tracker_telemetry::init_logging;

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Start the server, optionally from a configuration file.
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

/// Parses arguments after the program name.
///
/// `--help` and `--version` win as soon as they are seen. A repeated
/// `--config` keeps the last path.
fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) if !path.starts_with('-') => config = Some(PathBuf::from(path)),
                _ => return Err(format!("{arg} requires a path")),
            },
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Command::Run { config })
}

fn help_text() -> String {
    let mut text = String::from(
        "Tracker Server - validated event ingestion endpoint

USAGE:
    tracker-server [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
",
    );

    let names: Vec<String> = ENV_KEYS
        .iter()
        .map(|(key, _)| format!("{DEFAULT_ENV_PREFIX}__{key}"))
        .collect();
    let width = names.iter().map(String::len).max().unwrap_or(0).max("RUST_LOG".len());

    for (name, (_, description)) in names.iter().zip(ENV_KEYS) {
        let _ = writeln!(text, "    {name:<width$}  {description}");
    }
    let _ = writeln!(text, "    {:<width$}  Overrides the log filter", "RUST_LOG");

    let _ = write!(
        text,
        "
    A .env file in the working directory is read before the environment.

EXAMPLES:
    tracker-server --config /etc/tracker/tracker.toml

    {DEFAULT_ENV_PREFIX}__SCHEMA__PATH=event.schema.json {DEFAULT_ENV_PREFIX}__AUTH__TOKENS=site-a tracker-server
"
    );
    text
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run { config }) => config,
        Ok(Command::Help) => {
            print!("{}", help_text());
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("tracker-server {}", tracker_server::VERSION);
            return Ok(());
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("Use --help for usage information");
            std::process::exit(2);
        }
    };

    let mut loader = ConfigLoader::new();
    if let Some(path) = &config_path {
        loader = loader
            .with_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    }

    let config = loader
        .with_dotenv()?
        .with_env_prefix(DEFAULT_ENV_PREFIX)
        .load()
        .context("invalid configuration")?;

    init_logging(&config.logging.to_log_config()).context("failed to initialize logging")?;

    let addr = config.server.socket_addr()?;
    let server = Server::from_config(&config)?;

    info!(
        version = tracker_server::VERSION,
        addr = %addr,
        "starting tracker server"
    );

    server.run(addr, ShutdownSignal::with_os_signals()).await?;

    info!("tracker server stopped");
    Ok(())
}
