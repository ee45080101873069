//! `access-broker`: read a configuration header and a timed request stream,
//! arbitrate access to the configured resources, and report every event.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use access_broker::builders::BrokerBuilder;
use access_broker::config::{read_header, BrokerConfig};
use access_broker::core::{AppResult, BrokerError, ConsoleSink, OutputFormat};
use access_broker::runtime::{Dispatcher, RunReport};
use access_broker::util::init_tracing;
use anyhow::Context;
use clap::builder::FalseyValueParser;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => Self::Text,
            Format::Json => Self::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "access-broker",
    about = "Arbitrate timed READ/WRITE/DELETE access to a fixed set of resources",
    version
)]
struct Cli {
    /// Read the header and requests from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Load configuration from a JSON file; the input then holds requests only
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dispatch latency before each admission attempt, in milliseconds
    #[arg(long, env = "BROKER_GRACE_MS", default_value_t = 1000)]
    grace_ms: u64,

    /// Output line format
    #[arg(long, value_enum, env = "BROKER_FORMAT", default_value = "text")]
    format: Format,

    /// Disable ANSI colours in text output (any non-false `NO_COLOR` value counts)
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    no_color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("access-broker: {e:#}");
            match e.downcast_ref::<BrokerError>() {
                Some(BrokerError::Config(_)) => ExitCode::from(EXIT_CONFIG),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> AppResult<RunReport> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();

    let config = match &cli.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| BrokerError::Config(format!("reading {}: {e}", path.display())))?;
            BrokerConfig::from_json_str(&text)?
        }
        None => read_header(&mut lines).await?,
    };

    let sink = ConsoleSink::new(std::io::stdout(), cli.format.into(), !cli.no_color);
    let broker = BrokerBuilder::new(config)
        .with_sink(Box::new(sink))
        .with_grace_period(Duration::from_millis(cli.grace_ms))
        .build()?;

    let report = Dispatcher::new(broker).run(&mut lines).await?;
    Ok(report)
}
