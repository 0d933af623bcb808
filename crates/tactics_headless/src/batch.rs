//! Batch match runner for balance testing.
//!
//! Auto-plays many seeded matches in parallel using rayon and summarises
//! how long the roster survives.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tactics_core::battle::Battle;
use tactics_core::config::BattleConfig;
use tactics_core::data::GameData;
use tactics_core::error::Result as GameResult;
use tracing::{debug, info, warn};

use crate::autoplay::{play_match, MatchReport, Strategy};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_games: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Strategy steps per match before giving up
    pub max_steps: u64,
    /// Scripted player strategy
    pub strategy: Strategy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            max_steps: 20_000,
            strategy: Strategy::default(),
        }
    }
}

impl BatchConfig {
    /// Create config for a number of matches
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set step budget per match
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Aggregate over every finished match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches that produced a report.
    pub total_games: u32,
    /// Matches that ended in defeat.
    pub defeats: u32,
    /// Matches that hit the step budget.
    pub unfinished: u32,
    /// Mean turns survived over defeats.
    pub mean_turns: f64,
    /// Shortest defeat, in turns.
    pub min_turns: Option<u32>,
    /// Longest defeat, in turns.
    pub max_turns: Option<u32>,
    /// Mean enemies spawned per match.
    pub mean_enemies_spawned: f64,
    /// Forced-template kills across all matches.
    pub total_bosses_defeated: u32,
}

impl BatchSummary {
    /// Summarise match reports.
    #[must_use]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        if reports.is_empty() {
            return Self::default();
        }

        let defeat_turns: Vec<u32> = reports
            .iter()
            .filter(|r| r.outcome.is_some())
            .map(|r| r.stats.turn_count)
            .collect();
        let total = reports.len() as u32;
        let defeats = defeat_turns.len() as u32;
        let mean_turns = if defeat_turns.is_empty() {
            0.0
        } else {
            defeat_turns.iter().map(|&t| f64::from(t)).sum::<f64>() / f64::from(defeats)
        };
        let spawned: u32 = reports.iter().map(|r| r.stats.enemies_spawned).sum();

        Self {
            total_games: total,
            defeats,
            unfinished: total - defeats,
            mean_turns,
            min_turns: defeat_turns.iter().copied().min(),
            max_turns: defeat_turns.iter().copied().max(),
            mean_enemies_spawned: f64::from(spawned) / f64::from(total),
            total_bosses_defeated: reports.iter().map(|r| r.stats.bosses_defeated).sum(),
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match reports, in seed order
    pub games: Vec<MatchReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

fn run_single_game(
    base: &BattleConfig,
    data: &GameData,
    seed: u64,
    config: &BatchConfig,
) -> GameResult<MatchReport> {
    let battle = Battle::new(base.clone().with_seed(seed), data.clone())?;
    Ok(play_match(battle, config.strategy, config.max_steps))
}

/// Run a batch of matches
#[must_use]
pub fn run_batch(config: BatchConfig, base: &BattleConfig, data: &GameData) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        strategy = config.strategy.name(),
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let run_all = || -> Vec<Result<MatchReport, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                match run_single_game(base, data, seed, &config) {
                    Ok(report) => {
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        if done % 100 == 0 {
                            debug!("Progress: {}/{}", done, config.game_count);
                        }
                        Ok(report)
                    }
                    Err(e) => {
                        warn!("Game {} failed: {}", i, e);
                        Err(BatchError {
                            game_index: i,
                            seed,
                            message: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    };

    // Thread count applies to this batch only.
    let pool = (config.parallel_games > 0)
        .then(|| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallel_games as usize)
                .build()
        })
        .and_then(|built| built.map_err(|e| warn!("Falling back to global pool: {}", e)).ok());
    let results = match &pool {
        Some(pool) => pool.install(run_all),
        None => run_all(),
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<MatchReport> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_reports(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({} defeats, mean {:.1} turns)",
        games.len(),
        duration_seconds,
        summary.defeats,
        summary.mean_turns
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by playing the same seed several times.
///
/// # Errors
///
/// Returns an error if the battle cannot be built from `base` and `data`.
pub fn verify_determinism(
    base: &BattleConfig,
    data: &GameData,
    seed: u64,
    runs: u32,
    config: &BatchConfig,
) -> GameResult<bool> {
    let reports = (0..runs)
        .map(|_| run_single_game(base, data, seed, config))
        .collect::<GameResult<Vec<_>>>()?;

    let Some(first) = reports.first() else {
        return Ok(true);
    };
    let deterministic = reports.iter().all(|r| r == first);
    if !deterministic {
        let hashes: Vec<u64> = reports.iter().map(|r| r.final_hash).collect();
        warn!(seed, ?hashes, "Runs diverged");
    }
    Ok(deterministic)
}

#[cfg(test)]
mod tests {
    use tactics_test_utils::fixtures::{standard_data, test_config};

    use super::*;

    fn small(count: u32) -> BatchConfig {
        BatchConfig::new(count).with_max_steps(400)
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_seed(12345)
            .with_strategy(Strategy::Cautious);

        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.strategy, Strategy::Cautious);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(small(8), &test_config(), &standard_data());

        assert_eq!(results.games.len(), 8);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 8);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_local_pool_matches_global_pool() {
        let mut config = small(6).with_seed(40);
        let global = run_batch(config.clone(), &test_config(), &standard_data());
        config.parallel_games = 2;
        let local = run_batch(config, &test_config(), &standard_data());
        assert_eq!(global.games, local.games);
    }

    #[test]
    fn test_invalid_data_is_reported_per_game() {
        let mut data = standard_data();
        data.characters.clear();
        let results = run_batch(small(3), &test_config(), &data);
        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 3);
        assert_eq!(results.summary, BatchSummary::default());
    }

    #[test]
    fn test_summary_counts_defeats() {
        let report = |turns: u32, over: bool| MatchReport {
            seed: 0,
            strategy: Strategy::Greedy,
            outcome: over.then_some(tactics_core::events::MatchOutcome::Defeat(
                tactics_core::events::MatchStats {
                    enemies_spawned: 2,
                    turn_count: turns,
                    bosses_defeated: 0,
                },
            )),
            stats: tactics_core::events::MatchStats {
                enemies_spawned: 2,
                turn_count: turns,
                bosses_defeated: 1,
            },
            frames: 0,
            steps: 0,
            final_hash: 0,
        };
        let summary = BatchSummary::from_reports(&[report(4, true), report(8, true), report(30, false)]);

        assert_eq!(summary.total_games, 3);
        assert_eq!(summary.defeats, 2);
        assert_eq!(summary.unfinished, 1);
        assert_eq!(summary.mean_turns, 6.0);
        assert_eq!(summary.min_turns, Some(4));
        assert_eq!(summary.max_turns, Some(8));
        assert_eq!(summary.mean_enemies_spawned, 2.0);
        assert_eq!(summary.total_bosses_defeated, 3);
    }

    #[test]
    fn test_verify_determinism() {
        let config = small(1).with_strategy(Strategy::Cautious);
        assert!(verify_determinism(&test_config(), &standard_data(), 12345, 3, &config).unwrap());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(small(4), &test_config(), &standard_data());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config, results.config);
    }
}
