//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical config, data, seed and inputs.
//!
//! # Testing Strategy
//!
//! Replays, headless batches and bug reports all rely on a battle being
//! reproducible from its seed. Sources of non-determinism include:
//!
//! - **Floating-point math**: Glides and tile centers use fixed-point
//!   arithmetic via [`tactics_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Entity storage is a hash map. Systems
//!   always iterate in sorted entity ID order.
//!
//! - **System randomness**: Spawn rolls use a ChaCha RNG seeded from the
//!   battle config, never the OS.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system determinism (waves, spawn rolls)
//! 2. **Property tests**: Random data and seeds still replay identically
//! 3. **Integration tests**: Full scripted matches are reproducible
//! 4. **Parallel tests**: Running N battles on N threads all match

use std::thread;

use tactics_core::battle::Battle;

use crate::fixtures::scripted_step;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Run a battle twice under the scripted player and compare final hashes.
pub fn verify_battle_determinism<F>(setup_fn: F, steps: u64) -> bool
where
    F: Fn() -> Battle,
{
    verify_determinism(2, steps, &setup_fn, scripted_step, Battle::state_hash).is_deterministic
}

/// Compare two battle runs step-by-step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs never differ, `Some(step)` if they diverge at that step.
pub fn find_first_divergence<F>(setup_fn: F, steps: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        scripted_step(&mut a);
        scripted_step(&mut b);

        if a.state_hash() != b.state_hash() {
            return Some(step);
        }
    }

    None
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of steps each battle ran.
    pub steps: u64,
}

impl ParallelRunResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run N battles on scoped threads and collect their final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, steps: u64) -> ParallelRunResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..steps {
                        scripted_step(&mut battle);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    ParallelRunResult { hashes, steps }
}

/// Proptest strategies for battle data and seeds.
///
/// Every generated data set passes [`GameData::validate`]: cards have at
/// least one step, characters have positive health and enemy moves name
/// existing enemy cards.
///
/// [`GameData::validate`]: tactics_core::data::GameData::validate
pub mod strategies {
    use proptest::prelude::*;
    use tactics_core::prelude::*;

    /// Generate a card step of at most one tile in each direction.
    pub fn arb_step() -> impl Strategy<Value = MovementStep> {
        (-1i32..=1, -1i32..=1, any::<bool>()).prop_map(|(x, y, attack)| MovementStep { x, y, attack })
    }

    /// Generate an entry step: any column shift, up to three rows south.
    pub fn arb_entry_step() -> impl Strategy<Value = MovementStep> {
        (-1i32..=1, -3i32..=0).prop_map(|(x, y)| MovementStep::walk(x, y))
    }

    /// Generate a card of 1 to `max_len` steps.
    pub fn arb_card(name: String, max_len: usize) -> impl Strategy<Value = MovementCard> {
        (arb_entry_step(), proptest::collection::vec(arb_step(), 0..max_len)).prop_map(
            move |(entry, rest)| {
                let mut steps = vec![entry];
                steps.extend(rest);
                MovementCard::new(name.clone(), steps)
            },
        )
    }

    /// Generate an attack pattern of up to three offsets.
    pub fn arb_pattern() -> impl Strategy<Value = Vec<AttackOffset>> {
        proptest::collection::vec(
            (-2i32..=2, -2i32..=2).prop_map(|(x, y)| AttackOffset { x, y }),
            0..3,
        )
    }

    /// Generate character stats (1-4 health, 0-3 power).
    pub fn arb_character() -> impl Strategy<Value = CharacterData> {
        (1u32..=4, 0u32..=3, arb_pattern()).prop_map(|(max_health, power, attack_pattern)| {
            CharacterData {
                max_health,
                power,
                portrait: "generated".to_string(),
                attack_pattern,
            }
        })
    }

    /// Generate a full data set with up to `max_cards` cards per side.
    pub fn arb_game_data(max_cards: usize) -> impl Strategy<Value = GameData> {
        let max_cards = max_cards.max(1);
        (1..=max_cards, 1..=max_cards)
            .prop_flat_map(|(players, enemies)| {
                let player_cards = (0..players)
                    .map(|i| arb_card(format!("card-{i}"), 4))
                    .collect::<Vec<_>>();
                let enemy_cards = (0..enemies)
                    .map(|i| arb_card(format!("enemy-{i}"), 4))
                    .collect::<Vec<_>>();
                (
                    player_cards,
                    enemy_cards,
                    proptest::collection::vec(arb_character(), 1..4),
                    proptest::collection::vec((arb_character(), 0u32..5), 1..4),
                )
            })
            .prop_map(|(player_cards, enemy_cards, characters, enemies)| {
                let names: Vec<String> = enemy_cards.iter().map(|c| c.name.clone()).collect();
                let enemies = enemies
                    .into_iter()
                    .map(|(character, random_weight)| EnemyData {
                        character,
                        moves: names.clone(),
                        random_weight,
                    })
                    .collect();
                GameData {
                    player_cards,
                    enemy_cards,
                    characters,
                    enemies,
                }
            })
    }

    /// Generate a battle seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
