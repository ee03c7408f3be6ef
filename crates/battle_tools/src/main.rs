//! Battle engine command-line runner.
//!
//! # Usage
//!
//! ```bash
//! # One engagement with a fixed seed
//! battle-sim battle --engine ./BattleEngine --units data/ogame_units.ron \
//!     --scenario data/deathstar_siege.ron --seed 42
//!
//! # 1000 engagements, 8 at a time, summary written to a file
//! battle-sim simulate --engine ./BattleEngine --units data/ogame_units.ron \
//!     --scenario data/deathstar_siege.ron --count 1000 --parallel 8 --output results/siege.json
//!
//! # Check data files without running anything
//! battle-sim validate --units data/ogame_units.ron --scenario data/deathstar_siege.ron
//! ```
//!
//! JSON goes to stdout (or `--output`); logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battle_client::BattleEngine;
use battle_tools::{
    error::Result,
    load::{load_config, load_scenario, load_units},
    report::{render_summary, write_json, SimulationReport},
    validate::validate_files,
};

#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Run the external battle engine on RON scenarios")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every command that runs the engine.
#[derive(Args)]
struct RunArgs {
    /// Path to the engine binary
    #[arg(short, long)]
    engine: PathBuf,

    /// Unit attribute table (RON)
    #[arg(short, long, default_value = "data/ogame_units.ron")]
    units: PathBuf,

    /// Scenario file (RON)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Engine seed (0 = random)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    seed: i64,

    /// Per-run time limit in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Client configuration file (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single engagement
    Battle {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Run many independent engagements and summarize them
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Number of engagements
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Maximum engine processes at once (0 = one per CPU)
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Include every outcome in the report, not just the summary
        #[arg(long)]
        keep_outcomes: bool,
    },

    /// Validate data files
    Validate {
        /// Unit attribute table (RON)
        #[arg(short, long, default_value = "data/ogame_units.ron")]
        units: PathBuf,

        /// Scenario to check against the table
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON. RUST_LOG overrides --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Battle { run } => cmd_battle(&run),
        Commands::Simulate {
            run,
            count,
            parallel,
            keep_outcomes,
        } => cmd_simulate(&run, count, parallel, keep_outcomes),
        Commands::Validate { units, scenario } => cmd_validate(&units, scenario.as_deref()),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Run a single engagement
fn cmd_battle(run: &RunArgs) -> Result<()> {
    let table = load_units(&run.units)?;
    let scenario = load_scenario(&run.scenario)?;
    let config = load_config(run.config.as_deref())?;
    let engine = BattleEngine::with_config(&run.engine, table, config)?;

    tracing::info!(seed = run.seed, "Running battle");
    let outcome = engine.battle(
        &scenario.attackers,
        &scenario.defenders,
        run.seed,
        run.timeout_ms.map(Duration::from_millis),
    )?;
    tracing::info!(
        seed = outcome.seed,
        rounds = outcome.num_rounds,
        "Battle finished"
    );

    write_json(&outcome, run.output.as_deref())
}

/// Run a batch of engagements
fn cmd_simulate(
    run: &RunArgs,
    count: usize,
    parallel: Option<usize>,
    keep_outcomes: bool,
) -> Result<()> {
    let table = load_units(&run.units)?;
    let scenario = load_scenario(&run.scenario)?;
    let mut config = load_config(run.config.as_deref())?;
    if let Some(parallel) = parallel {
        config = config.with_parallel_runs(parallel);
    }
    let engine = BattleEngine::with_config(&run.engine, table, config)?;

    tracing::info!(
        count,
        workers = engine.config().worker_threads(),
        seed = run.seed,
        "Running simulation"
    );
    let outcomes = engine.simulate(
        &scenario.attackers,
        &scenario.defenders,
        run.seed,
        count,
        run.timeout_ms.map(Duration::from_millis),
    )?;

    let report = SimulationReport::new(&scenario, run.seed, outcomes, keep_outcomes);
    write_json(&report, run.output.as_deref())?;
    if run.output.is_some() {
        print!("{}", render_summary(engine.attributes(), &report.summary));
    }
    Ok(())
}

/// Validate data files
fn cmd_validate(units: &std::path::Path, scenario: Option<&std::path::Path>) -> Result<()> {
    tracing::info!("Validating {}", units.display());
    let report = validate_files(units, scenario)?;
    tracing::info!("Validation passed");
    write_json(&report, None)
}
