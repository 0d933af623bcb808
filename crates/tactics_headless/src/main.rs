//! Headless card-path tactics runner.
//!
//! This binary runs battles without graphics, controlled via JSON on
//! stdin/stdout. Designed for scripted bots, CI testing and balance runs.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p tactics_headless
//!
//! # Run a batch of auto-played matches
//! cargo run -p tactics_headless -- batch --count 1000 --output results/batch.json
//!
//! # Check that a seed replays identically
//! cargo run -p tactics_headless -- --seed 7 verify --runs 5
//!
//! # Watch an auto-played match as ASCII
//! cargo run -p tactics_headless -- render --steps 200
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tactics_core::battle::Battle;
use tactics_core::config::BattleConfig;
use tactics_core::data::GameData;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactics_headless::{
    ascii_visualizer::{render_ascii, AsciiConfig},
    autoplay::{self, Strategy},
    batch::{run_batch, verify_determinism, BatchConfig},
    data_loader::{default_data_dir, load_config, load_game_data},
    runner::{HeadlessConfig, HeadlessRunner},
};

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless card-path tactics runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the JSON template tables
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// RON battle config (defaults to built-in values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed override for enemy rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one battle over the JSON protocol
    Play {
        /// Output state after every command
        #[arg(long)]
        auto_state: bool,
    },

    /// Auto-play a batch of seeded matches
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Results file
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,

        /// Strategy steps per match before giving up
        #[arg(long, default_value = "20000")]
        max_steps: u64,

        /// Scripted player strategy
        #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
        strategy: Strategy,
    },

    /// Replay one seed several times and compare outcomes
    Verify {
        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Strategy steps per run
        #[arg(long, default_value = "20000")]
        max_steps: u64,

        /// Scripted player strategy
        #[arg(long, value_enum, default_value_t = Strategy::Cautious)]
        strategy: Strategy,
    },

    /// Auto-play and print the board as ASCII at every turn
    Render {
        /// Strategy steps to take
        #[arg(long, default_value = "300")]
        steps: u64,

        /// Scripted player strategy
        #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
        strategy: Strategy,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let (config, data) = load_inputs(&cli);

    match cli.command {
        Some(Commands::Play { auto_state }) => cmd_play(config, data, auto_state),
        Some(Commands::Batch {
            count,
            parallel,
            output,
            max_steps,
            strategy,
        }) => {
            let batch = BatchConfig {
                game_count: count,
                parallel_games: parallel,
                seed_start: cli.seed.unwrap_or(0),
                max_steps,
                strategy,
            };
            cmd_batch(batch, &config, &data, &output);
        }
        Some(Commands::Verify {
            runs,
            max_steps,
            strategy,
        }) => {
            let batch = BatchConfig::new(runs)
                .with_max_steps(max_steps)
                .with_strategy(strategy);
            cmd_verify(&config, &data, &batch);
        }
        Some(Commands::Render {
            steps,
            strategy,
            no_color,
        }) => cmd_render(config, data, steps, strategy, no_color),
        None => {
            // Default: interactive mode
            cmd_play(config, data, false);
        }
    }
}

/// Load the battle config and template data named on the command line.
fn load_inputs(cli: &Cli) -> (BattleConfig, GameData) {
    let mut config = match &cli.config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }),
        None => BattleConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let dir = cli.data.clone().unwrap_or_else(default_data_dir);
    let data = load_game_data(&dir).unwrap_or_else(|e| {
        eprintln!("FATAL: {}", e);
        std::process::exit(1);
    });
    (config, data)
}

fn new_battle(config: BattleConfig, data: GameData) -> Battle {
    Battle::new(config, data).unwrap_or_else(|e| {
        eprintln!("FATAL: {}", e);
        std::process::exit(1);
    })
}

/// Play one battle over stdin/stdout
fn cmd_play(config: BattleConfig, data: GameData, auto_state: bool) {
    tracing::info!(seed = config.seed, "Starting interactive session");

    let mut runner = HeadlessRunner::with_config(
        new_battle(config, data),
        HeadlessConfig {
            auto_state_output: auto_state,
        },
    );
    if let Err(e) = runner.run(io::stdin().lock(), io::stdout().lock()) {
        eprintln!("FATAL: {}", e);
        std::process::exit(1);
    }
}

/// Run batch of matches
fn cmd_batch(batch: BatchConfig, config: &BattleConfig, data: &GameData, output: &Path) {
    let results = run_batch(batch, config, data);

    if let Err(e) = results.save(output) {
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
        for err in results.errors.iter().take(10) {
            eprintln!("  game {} (seed {}): {}", err.game_index, err.seed, err.message);
        }
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Defeats: {} ({} hit the step budget)",
        summary.defeats, summary.unfinished
    );
    if let (Some(min), Some(max)) = (summary.min_turns, summary.max_turns) {
        eprintln!(
            "Turns survived: mean {:.1}, min {}, max {}",
            summary.mean_turns, min, max
        );
    }
    eprintln!(
        "Enemies spawned per match: {:.1}",
        summary.mean_enemies_spawned
    );
    eprintln!("Bosses defeated: {}", summary.total_bosses_defeated);
    eprintln!("\nResults saved to: {}", output.display());
}

/// Verify determinism for the configured seed
fn cmd_verify(config: &BattleConfig, data: &GameData, batch: &BatchConfig) {
    tracing::info!(
        seed = config.seed,
        runs = batch.game_count,
        "Verifying determinism"
    );

    match verify_determinism(config, data, config.seed, batch.game_count, batch) {
        Ok(true) => eprintln!("✓ Determinism verified: {} identical runs", batch.game_count),
        Ok(false) => {
            eprintln!("✗ Determinism FAILED: runs diverged");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }
    }
}

/// Auto-play and print the board whenever a turn starts
fn cmd_render(config: BattleConfig, data: GameData, steps: u64, strategy: Strategy, no_color: bool) {
    let ascii = AsciiConfig {
        use_color: !no_color,
        ..Default::default()
    };
    let mut battle = new_battle(config, data);
    let mut turn = battle.turn_count();

    print!("{}", render_ascii(&battle.snapshot(), &ascii));
    for _ in 0..steps {
        if battle.is_over() {
            break;
        }
        autoplay::step(&mut battle, strategy);
        battle.take_events();
        if battle.turn_count() != turn || battle.is_over() {
            turn = battle.turn_count();
            println!();
            print!("{}", render_ascii(&battle.snapshot(), &ascii));
        }
    }
}
