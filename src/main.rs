//! tob-book - replay a CSV command stream through the order book.
//!
//! Output lines go to stdout; logs (`RUST_LOG`, default `warn`) and the
//! optional state root go to stderr.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tob_book::{CommandReader, Config, Engine, ErrorPolicy, Session};

/// Replay order book commands and print accept/reject and top-of-book lines
#[derive(Parser)]
#[clap(name = "tob-book")]
struct Cli {
    /// Command file (N/C/F records, `#` comments)
    #[clap(default_value = Config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Orders to pre-allocate in the book
    #[clap(long, default_value_t = Config::DEFAULT_CAPACITY)]
    capacity: usize,

    /// What to do when a cancel names an unknown order or an order ID is reused
    #[clap(long, value_enum, default_value_t = ErrorPolicy::Halt)]
    on_error: ErrorPolicy,

    /// Output batches buffered between the engine thread and stdout
    #[clap(long, default_value_t = Config::DEFAULT_CHANNEL_CAPACITY)]
    channel_capacity: usize,

    /// Print the final book's state root to stderr
    #[clap(long)]
    digest: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            capacity: cli.capacity,
            error_policy: cli.on_error,
            channel_capacity: cli.channel_capacity.max(1),
            print_digest: cli.digest,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from(Cli::parse());
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let reader = CommandReader::from_path(&config.input)
        .with_context(|| format!("opening {}", config.input.display()))?;

    let engine = Arc::new(Engine::with_capacity(config.capacity));
    let session = Session::new(Arc::clone(&engine), config.error_policy);
    let (rx, handle) = session.spawn(reader, config.channel_capacity)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for output in rx {
        output.write_to(&mut out).context("writing output")?;
    }
    out.flush().context("writing output")?;

    let stats = handle
        .join()
        .map_err(|_| anyhow!("session thread panicked"))?
        .context("replay stopped")?;
    info!(?stats, input = %config.input.display(), "done");

    if config.print_digest {
        let root = engine.with_book(|book| book.state_root_hex())?;
        eprintln!("state root: {}", root);
    }
    Ok(())
}
