//! Headless battle runner for scripted play and CI verification.
//!
//! This crate drives a [`tactics_core::battle::Battle`] without graphics,
//! controlled via JSON commands on stdin with responses on stdout. This
//! enables:
//!
//! - **Scripted play**: A bot or test harness plays through the protocol
//! - **Batch runs**: Many seeded matches in parallel to compare strategies
//! - **Determinism checks**: The same seed must always end the same way
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands (advance, tick, toggle, pick, drop, ...)
//! - **stdout**: Responses and state snapshots (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Play interactively
//! echo '{"cmd":"pick","slot":0}' | cargo run -p tactics_headless
//!
//! # Run a batch of auto-played matches
//! cargo run -p tactics_headless -- batch --count 500 --strategy cautious
//!
//! # Verify determinism
//! cargo run -p tactics_headless -- verify --seed 42 --runs 5
//! ```

pub mod ascii_visualizer;
pub mod autoplay;
pub mod batch;
pub mod data_loader;
pub mod protocol;
pub mod runner;

pub use ascii_visualizer::{render_ascii, AsciiConfig};
pub use autoplay::{play_match, MatchReport, Strategy};
pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use data_loader::{default_data_dir, load_config, load_game_data, DataLoadError};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
