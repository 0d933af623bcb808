//! ASCII board visualizer for quick terminal review.
//!
//! Renders a [`BattleSnapshot`] as a small grid, highest row at the top.
//! Each tile is a glyph followed by a marker:
//!
//! - `K` / `k` - player (upper) or enemy (lower) unit, first portrait letter
//! - `*` - enemy arriving next spawn phase
//! - `.` - empty tile
//! - `=` marker - unit is paused
//! - `!` marker - tile threatened by a player attack pattern

use std::collections::HashMap;
use std::fmt::Write as _;

use tactics_core::components::{Intent, Owner};
use tactics_core::events::MatchOutcome;
use tactics_core::snapshot::{BattleSnapshot, UnitView};
use tactics_core::storage::EntityId;

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Show roster, cards and outcome below the board.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GRAY: &str = "\x1b[90m";
}

fn unit_glyph(unit: &UnitView) -> char {
    let base = unit.portrait.chars().next().unwrap_or('?');
    if unit.owner.is_player() {
        base.to_ascii_uppercase()
    } else {
        base.to_ascii_lowercase()
    }
}

fn paint(out: &mut String, text: char, color: &str, config: &AsciiConfig) {
    if config.use_color && !color.is_empty() {
        out.push_str(color);
        out.push(text);
        out.push_str(colors::RESET);
    } else {
        out.push(text);
    }
}

/// Render a snapshot as ASCII art.
#[must_use]
pub fn render_ascii(snapshot: &BattleSnapshot, config: &AsciiConfig) -> String {
    let mut output = String::new();
    let (bold, reset) = if config.use_color {
        (colors::BOLD, colors::RESET)
    } else {
        ("", "")
    };

    let units: HashMap<EntityId, &UnitView> = snapshot.units.iter().map(|u| (u.entity, u)).collect();
    let cols = snapshot.cols.max(0) as usize;

    let _ = writeln!(
        output,
        "{bold}╔══ Turn {} │ {} │ Frame {} ══╗{reset}",
        snapshot.stats.turn_count, snapshot.phase, snapshot.frame
    );

    for row in (0..snapshot.rows).rev() {
        let _ = write!(output, "║{row:>2} ");
        for tile in snapshot.tiles.iter().filter(|t| t.coord.row == row) {
            let unit = tile.occupant.and_then(|id| units.get(&id).copied());
            match (unit, tile.pending_spawn) {
                (Some(unit), _) => {
                    let color = if unit.owner.is_player() {
                        colors::BLUE
                    } else {
                        colors::RED
                    };
                    paint(&mut output, unit_glyph(unit), color, config);
                }
                (None, Some(_)) => paint(&mut output, '*', colors::YELLOW, config),
                (None, None) => paint(&mut output, '.', colors::GRAY, config),
            }

            let paused = unit.is_some_and(|u| u.intent == Intent::Pause);
            if paused {
                output.push('=');
            } else if tile.player_threatens {
                paint(&mut output, '!', colors::YELLOW, config);
            } else {
                output.push(' ');
            }
        }
        output.push_str("║\n");
    }

    output.push_str("║   ");
    for col in 0..cols {
        let _ = write!(output, "{:<2}", col % 10);
    }
    output.push_str("║\n");

    if config.show_legend {
        output.push_str("╠══ ROSTER\n");
        for entry in &snapshot.roster {
            let state = if entry.dead {
                "dead"
            } else if entry.deployed {
                "on board"
            } else {
                "in hand"
            };
            let _ = writeln!(
                output,
                "║ [{}] {} {}/{} pow {} - {state}",
                entry.id.0, entry.portrait, entry.health, entry.max_health, entry.power
            );
        }

        output.push_str("╠══ CARDS\n");
        let visible: Vec<String> = snapshot
            .cards
            .iter()
            .filter(|c| c.visible)
            .map(|c| {
                let held = if snapshot.picked == Some(c.slot) { "^" } else { "" };
                format!("[{}]{}{held}", c.slot, c.name)
            })
            .collect();
        let _ = writeln!(output, "║ {}", visible.join(" "));

        let enemies = snapshot
            .units_where(|u| matches!(u.owner, Owner::Enemy { .. }))
            .count();
        let _ = writeln!(
            output,
            "║ enemies {enemies} │ spawned {} │ bosses defeated {}",
            snapshot.stats.enemies_spawned, snapshot.stats.bosses_defeated
        );

        if let Some(MatchOutcome::Defeat(stats)) = snapshot.outcome {
            let _ = writeln!(
                output,
                "║ {bold}DEFEAT after {} turns{reset}",
                stats.turn_count
            );
        }
    }

    output.push_str("╚══\n");
    output
}
