use clap::{Parser, Subcommand};
use lsbucket::{
    alloc::{AllocPolicy, DEFAULT_BACKOFF},
    config::{DEFAULT_MAX_DISTANCE, DEFAULT_TRIALS, RunConfig},
    error::LsbError,
    kmer::{BucketTable, bucket_file_name, generate_sample_d1, sample_file_name, write_sample},
    search::{Membership, NeighborhoodParams},
    statistics::{Stats, run_trial},
};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    fs::File,
    io::{self, BufWriter},
    num::NonZeroU32,
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};
use tqdm::tqdm;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collision frequencies of edit-distance neighborhoods
#[derive(Parser, Debug)]
#[command(name = "lsbucket")]
#[command(
    about = "Measures how often two k-mers at a given edit distance share a neighbor",
    long_about = None
)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    tool: Option<Tool>,

    /// Length of the k-mers (at most 31)
    #[arg(short, long, required_unless_present = "config")]
    k: Option<usize>,

    /// Radius of the neighborhoods explored around each k-mer
    #[arg(short, long, required_unless_present = "config")]
    radius: Option<usize>,

    /// Which neighbors count: "whole" or "sample"
    #[arg(short, long, default_value = "whole")]
    mode: Membership,

    /// Number of random pairs tested at each edit distance
    #[arg(short, long, default_value_t = DEFAULT_TRIALS)]
    trials: usize,

    /// Largest edit distance tested, capped at k
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
    max_distance: usize,

    /// Seed for the random generator; drawn from the OS when absent
    #[arg(long)]
    seed: Option<u64>,

    /// JSON run configuration, replaces all of the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the statistics as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Seconds to wait before retrying a refused allocation
    #[arg(long, default_value_t = DEFAULT_BACKOFF.as_secs())]
    alloc_backoff_secs: u64,

    /// Give up after this many refused allocations instead of retrying forever
    #[arg(long)]
    alloc_attempts: Option<NonZeroU32>,
}

/// Table writers that run instead of the collision experiment
#[derive(Subcommand, Debug)]
enum Tool {
    /// Writes the bucket labels of every k-mer, checking the closed form against them
    Buckets {
        /// Length of the k-mers (at most 30)
        #[arg(short, long)]
        k: usize,

        /// Output file, buckets-<k>.txt when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Writes the D1 sample, one k-mer per line after the sample size
    Sample {
        /// Length of the k-mers (at most 31)
        #[arg(short, long)]
        k: usize,

        /// Output file, <kk>01.sample when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn write_buckets(k: usize, output: Option<&PathBuf>) -> Result<(), LsbError> {
    let table = BucketTable::enumerate(k, AllocPolicy::default())?;
    let path = output.cloned().unwrap_or_else(|| bucket_file_name(k).into());
    table.write_to(BufWriter::new(File::create(&path)?))?;
    tracing::info!(k, path = %path.display(), "bucket table written");

    let wrong = table.verify()?;
    if wrong > 0 {
        tracing::error!(k, wrong, "closed-form labels disagree with the table");
    } else {
        tracing::info!(k, kmers = table.kmers(), "closed-form labels agree with the table");
    }
    Ok(())
}

fn write_sample_file(k: usize, output: Option<&PathBuf>) -> Result<(), LsbError> {
    let sample = generate_sample_d1(k, AllocPolicy::default())?;
    let path = output.cloned().unwrap_or_else(|| sample_file_name(k).into());
    write_sample(BufWriter::new(File::create(&path)?), k, &sample)?;
    tracing::info!(k, size = sample.len(), path = %path.display(), "sample written");
    Ok(())
}

fn build_config(args: &Args) -> Result<RunConfig, LsbError> {
    if let Some(path) = &args.config {
        tracing::info!(path = %path.display(), "loading run configuration");
        return RunConfig::from_json_file(path);
    }

    let k = args
        .k
        .ok_or_else(|| LsbError::configuration("--k is required without --config"))?;
    let radius = args
        .radius
        .ok_or_else(|| LsbError::configuration("--radius is required without --config"))?;

    let backoff = Duration::from_secs(args.alloc_backoff_secs);
    let alloc = match args.alloc_attempts {
        Some(attempts) => AllocPolicy::bounded(backoff, attempts),
        None => AllocPolicy::blocking(backoff),
    };

    let config = RunConfig {
        neighborhood: NeighborhoodParams::new(k, radius, args.mode)?.with_alloc(alloc),
        trials: args.trials,
        max_distance: args.max_distance.min(k),
        seed: args.seed,
    };
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), LsbError> {
    match &args.tool {
        Some(Tool::Buckets { k, output }) => return write_buckets(*k, output.as_ref()),
        Some(Tool::Sample { k, output }) => return write_sample_file(*k, output.as_ref()),
        None => {}
    }

    let config = build_config(args)?;
    let params = config.neighborhood;
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        k = params.k,
        radius = params.radius,
        mode = %params.membership,
        trials = config.trials,
        max_distance = config.max_distance,
        seed,
        "starting run"
    );

    let start_time = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut combined_stats = Stats::new();
    for distance in 1..=config.max_distance {
        let mut local_stats = Stats::new();
        for _ in tqdm(0..config.trials).desc(Some(format!("edit {distance}"))) {
            run_trial(&mut rng, &params, distance, &mut local_stats)?;
        }
        if let Some(entry) = local_stats.get_distance(distance) {
            tracing::info!(
                distance,
                collisions = entry.total.collisions,
                rate = entry.total.rate(),
                "distance done"
            );
        }
        combined_stats = combined_stats.merge(&local_stats);
    }

    let elapsed = start_time.elapsed();
    let explorations = combined_stats.get_bfs_calls();
    tracing::info!(
        elapsed_secs = elapsed.as_secs_f64(),
        explorations,
        avg_expanded = combined_stats.get_keys_expanded() as f64 / explorations.max(1) as f64,
        "run complete"
    );

    combined_stats.write_report(&mut io::stdout().lock())?;
    if let Some(path) = &args.report {
        combined_stats.write_json(BufWriter::new(File::create(path)?))?;
        tracing::info!(path = %path.display(), "statistics written");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
