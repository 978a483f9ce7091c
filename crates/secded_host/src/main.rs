mod generator;
mod inspect;
mod selftest;
mod stats;
mod throughput;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use generator::NoiseProfile;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "secded", about = "(64,57) SEC-DED Hamming block codec tools")]
struct Cli {
    /// Worker threads for parallel passes (defaults to one per core).
    #[arg(long, global = true)]
    threads: Option<usize>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write random payloads and a matching noise script.
    Gen {
        #[arg(long, default_value = "payloads.bin")]
        payloads: String,
        #[arg(long, default_value = "noise.txt")]
        noise: String,
        #[arg(long, default_value_t = 1 << 20)]
        count: usize,
        /// Fraction of blocks left without flips.
        #[arg(long, default_value_t = generator::DEFAULT_CLEAN_RATE)]
        clean_rate: f64,
        /// Fraction of flipped blocks that get a second flip.
        #[arg(long, default_value_t = generator::DEFAULT_DOUBLE_RATE)]
        double_rate: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replay a payload file and noise script through the codec.
    Run {
        #[arg(short, long)]
        payloads: String,
        #[arg(short, long)]
        noise: String,
        #[arg(long)]
        sequential: bool,
    },
    /// In-memory encode/decode throughput bench.
    Bench {
        #[arg(short, long, default_value_t = 1 << 24)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        sequential: bool,
    },
    /// Randomized correctness self-test.
    Check {
        #[arg(short, long, default_value_t = 10_000)]
        iterations: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encode one payload, flip bits, and show every stage.
    Show {
        #[arg(value_parser = inspect::parse_u64)]
        payload: u64,
        /// Bit positions to flip in the codeword.
        #[arg(short, long, value_delimiter = ',')]
        flip: Vec<u32>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }
    debug!(
        hardware_popcount = secded_core::popcount::HARDWARE_POPCOUNT,
        threads = rayon::current_num_threads(),
        "codec configuration"
    );

    let seed_or_clock = |seed: Option<u64>| {
        let seed = seed.unwrap_or_else(generator::seed_from_clock);
        info!(seed, "using seed");
        seed
    };

    match cli.command {
        Commands::Gen {
            payloads,
            noise,
            count,
            clean_rate,
            double_rate,
            seed,
        } => {
            let profile = NoiseProfile {
                clean_rate,
                double_rate,
            };
            generator::generate_block_data(&payloads, &noise, count, profile, seed_or_clock(seed))?;
        }
        Commands::Run {
            payloads,
            noise,
            sequential,
        } => {
            throughput::run_files(&payloads, &noise, !sequential)?;
        }
        Commands::Bench {
            count,
            seed,
            sequential,
        } => {
            throughput::run_bench(count, seed_or_clock(seed), !sequential)?;
        }
        Commands::Check { iterations, seed } => {
            selftest::run_self_test(iterations, seed_or_clock(seed))?;
        }
        Commands::Show { payload, flip } => {
            inspect::show_block(payload, &flip)?;
        }
    }
    Ok(())
}
