use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing::{Level, subscriber::set_global_default};
fn init_tracing(verbosity: u8) {
    // Map -q/-v to tracing levels; default WARN
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env()
        .add_directive(level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // logs to stderr
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    // Ignore error if already set in tests or env
    let _ = set_global_default(subscriber);
}

use sidematch::{OutputStage, Reconciler, ReconcilerConfig};

fn main() {
    let opts = Opts::parse();
    init_tracing(opts.verbose.saturating_sub(opts.quiet));
    smol::block_on(async move {
        if let Err(e) = run(opts).await {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    });
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let config = ReconcilerConfig::load(opts.config.as_deref())?;
    match opts.command {
        Command::Scan { dir, output } => {
            let mut reconciler = Reconciler::new(config)?;
            reconciler.scan_directory(dir).await?;
            reconciler.save_stage(&output, OutputStage::Inventory)?;
            print!("{}", reconciler.summary());
        }
        Command::Match { inventory, output } => {
            let mut reconciler = Reconciler::from_csv(&inventory, config)?;
            reconciler.match_descriptors().await?;
            reconciler.save_stage(&output, OutputStage::Matched)?;
            print!("{}", reconciler.summary());
        }
        Command::Recover { matched, output } => {
            let mut reconciler = Reconciler::from_csv(&matched, config)?;
            reconciler.recover_timestamps().await?;
            reconciler.save_stage(&output, OutputStage::Recovered)?;
            print!("{}", reconciler.summary());
        }
        Command::Run { inventory, output } => {
            let mut reconciler = Reconciler::from_csv(&inventory, config)?;
            reconciler.run_all().await?;
            reconciler.save_stage(&output, OutputStage::Recovered)?;
            print!("{}", reconciler.summary());
        }
        Command::Summary { inventory } => {
            let reconciler = Reconciler::from_csv(&inventory, config)?;
            print!("{}", reconciler.summary());
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Match exported photos with their JSON sidecars and recover capture times")]
pub struct Opts {
    /// Increase verbosity (-v, -vv). Default WARN.
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Decrease verbosity (-q). Each -q reduces level by one step.
    #[arg(short = 'q', action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,
    /// Configuration file (defaults to <config dir>/sidematch/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Walk an export folder and write its inventory as CSV
    Scan {
        /// Export folder to scan
        dir: PathBuf,
        /// Inventory CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Pair images lacking a capture time with their descriptors
    Match {
        /// Inventory CSV (exiftool -csv export or `scan` output)
        inventory: PathBuf,
        /// CSV of unresolved images with their matched descriptor
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Read capture times from the descriptors of a matched CSV
    Recover {
        /// Output of `match`
        matched: PathBuf,
        /// CSV ready for writing metadata back
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Match and recover in one pass
    Run {
        /// Inventory CSV
        inventory: PathBuf,
        /// CSV ready for writing metadata back
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print counts for an inventory
    Summary {
        /// Inventory CSV
        inventory: PathBuf,
    },
}
