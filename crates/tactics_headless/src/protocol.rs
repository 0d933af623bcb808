//! JSON protocol for headless battle communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controlling script or bot
//! **Output (stdout):** Acknowledgments, events and state snapshots
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. The controller sends commands as JSON lines
//! 3. Every command is answered by an `ack` (or an `error`)
//! 4. When the last character dies, outputs `{"type":"game_over",...}` once
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","phase":"Summon","frame":0}
//! -> {"cmd":"pick","slot":0}
//! <- {"type":"ack","cmd":"pick","accepted":true,"events":[]}
//! -> {"cmd":"drop","roster":0}
//! <- {"type":"ack","cmd":"drop","accepted":true,"events":[...]}
//! -> {"cmd":"tick","count":10}
//! <- {"type":"ack","cmd":"tick","accepted":true,"events":[...]}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","frame":10,"hash":1234567890}
//! ```

use serde::{Deserialize, Serialize};
use tactics_core::events::{BattleEvent, MatchStats};
use tactics_core::snapshot::BattleSnapshot;
use tactics_core::turn::Phase;

// ============================================================================
// Input Commands (controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Press the advance button.
    Advance,

    /// Run N updates of `delta_ms` each (defaults: 1 update, 50 ms).
    Tick {
        /// Updates to run.
        #[serde(default = "default_tick_count")]
        count: u32,
        /// Milliseconds per update.
        #[serde(default = "default_delta_ms")]
        delta_ms: u32,
    },

    /// Flip play/pause on the player unit at a tile.
    Toggle {
        /// Tile row.
        row: i32,
        /// Tile column.
        col: i32,
    },

    /// Pick up a card from the pool.
    Pick {
        /// Pool slot.
        slot: usize,
    },

    /// Drop the held card on a roster character.
    Drop {
        /// Roster index.
        roster: usize,
    },

    /// Drop the held card without deploying.
    Release,

    /// Output the full snapshot without advancing time.
    Query,

    /// Output the state hash (for determinism checks).
    Hash,

    /// Stop the runner.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

fn default_delta_ms() -> u32 {
    50
}

// ============================================================================
// Output Responses (Runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Phase the battle starts in.
        phase: Phase,
        /// Frame counter.
        frame: u64,
    },

    /// Command processed.
    Ack {
        /// Command name.
        cmd: String,
        /// The battle took the input (always true for ticks).
        accepted: bool,
        /// Events emitted while processing the command.
        events: Vec<BattleEvent>,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command that failed, if it parsed.
        #[serde(skip_serializing_if = "Option::is_none")]
        cmd: Option<String>,
    },

    /// Full battle state.
    State {
        /// State hash at the time of the snapshot.
        hash: u64,
        /// Snapshot.
        snapshot: Box<BattleSnapshot>,
    },

    /// State hash only.
    StateHash {
        /// Frame counter.
        frame: u64,
        /// Deterministic state hash.
        hash: u64,
    },

    /// The match just ended in defeat.
    GameOver {
        /// Final counters.
        stats: MatchStats,
    },

    /// Runner is shutting down.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(phase: Phase, frame: u64) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            phase,
            frame,
        }
    }

    /// Create an acknowledgment.
    #[must_use]
    pub fn ack(cmd: &str, accepted: bool, events: Vec<BattleEvent>) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
            accepted,
            events,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    ///
    /// Returns the serde error for malformed or unknown commands.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Tick { .. } => "tick",
            Self::Toggle { .. } => "toggle",
            Self::Pick { .. } => "pick",
            Self::Drop { .. } => "drop",
            Self::Release => "release",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
