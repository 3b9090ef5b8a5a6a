//! Depth pricer entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufRead, BufReader, BufWriter};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use depth_pricer::config::Config;
use depth_pricer::feed::run;
use depth_pricer::metrics;
use depth_pricer::utils::shutdown_signal;

/// Prices a fixed target size against a live limit order book.
#[derive(Parser, Debug)]
#[command(name = "depth-pricer")]
#[command(about = "Buy expense and sell income for a target size, updated per book event")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Quantity to price (overrides PRICER_TARGET_SIZE).
    target_size: Option<u32>,

    /// Read events from a file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price the event stream (default).
    Run {
        /// Quantity to price (overrides PRICER_TARGET_SIZE).
        target_size: Option<u32>,

        /// Read events from a file instead of stdin.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load()?;

    // Logs go to stderr; stdout carries quotes only.
    let filter = if args.verbose {
        EnvFilter::new("depth_pricer=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let layer = fmt::layer().with_writer(std::io::stderr);
    if config.log_json {
        tracing_subscriber::registry()
            .with(layer.json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry().with(layer).with(filter).init();
    }

    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config, args.target_size),
        Some(Command::Run { target_size, input }) => {
            cmd_run(config, target_size.or(args.target_size), input.or(args.input)).await
        }
        None => cmd_run(config, args.target_size, args.input).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Config, target_size: Option<u32>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DEPTH PRICER - CONFIGURATION CHECK");
    println!("======================================================================");

    let config = config.with_target_size(target_size);

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!();
    println!("Target size: {}", config.target_size.unwrap_or_default());
    match &config.input {
        Some(path) => println!("Input:       {}", path.display()),
        None => println!("Input:       <stdin>"),
    }
    println!("JSON logs:   {}", config.log_json);
    println!("======================================================================");

    Ok(())
}

/// Price the event stream until end of input or Ctrl+C.
async fn cmd_run(
    config: Config,
    target_size: Option<u32>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config.with_target_size(target_size).with_input(input).validated() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "refusing to start");
            return Err(e.into());
        }
    };
    let target_size = config.target_size.unwrap_or_default();

    let reader: Box<dyn AsyncBufRead + Unpin> = match &config.input {
        Some(path) => {
            info!(path = %path.display(), "reading events from file");
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut writer = BufWriter::new(io::stdout());

    let stats = run(reader, &mut writer, target_size, shutdown_signal()).await?;

    info!(
        lines = stats.lines,
        rejected = stats.rejected,
        quotes = stats.quotes,
        "run complete"
    );
    Ok(())
}
