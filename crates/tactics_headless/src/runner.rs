//! Headless battle runner implementation.

use std::io::{self, BufRead, Write};

use tactics_core::battle::Battle;
use tactics_core::board::BoardCoord;
use tactics_core::events::MatchOutcome;
use tactics_core::input::Input;
use tactics_core::math::Fixed;
use tactics_core::roster::RosterId;

use crate::protocol::{Command, Response};

/// Convert a protocol tick length to seconds.
///
/// Whole seconds and the millisecond remainder are converted separately so
/// every `u32` fits the fixed-point range.
fn tick_delta(delta_ms: u32) -> Fixed {
    Fixed::from_num(delta_ms / 1000) + Fixed::from_num(delta_ms % 1000) / Fixed::from_num(1000)
}

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every command (vs only on query).
    pub auto_state_output: bool,
}

/// Drives one battle from protocol commands.
pub struct HeadlessRunner {
    battle: Battle,
    config: HeadlessConfig,
    game_over_sent: bool,
}

impl HeadlessRunner {
    /// Create a runner with default config.
    #[must_use]
    pub fn new(battle: Battle) -> Self {
        Self::with_config(battle, HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    #[must_use]
    pub fn with_config(battle: Battle, config: HeadlessConfig) -> Self {
        Self {
            battle,
            config,
            game_over_sent: false,
        }
    }

    /// The battle being driven.
    #[must_use]
    pub const fn battle(&self) -> &Battle {
        &self.battle
    }

    /// Process one command and return the responses to send, in order.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let name = cmd.name();
        let mut responses = Vec::new();

        let accepted = match cmd {
            Command::Advance => self.battle.handle_input(Input::Advance),
            Command::Tick { count, delta_ms } => {
                let delta = tick_delta(delta_ms);
                for _ in 0..count {
                    if self.battle.is_over() {
                        break;
                    }
                    self.battle.update(delta);
                }
                true
            }
            Command::Toggle { row, col } => self.battle.handle_input(Input::ToggleIntent {
                tile: BoardCoord::new(row, col),
            }),
            Command::Pick { slot } => self.battle.handle_input(Input::PickCard { slot }),
            Command::Drop { roster } => self.battle.handle_input(Input::DropOnRoster {
                roster: RosterId(roster),
            }),
            Command::Release => self.battle.handle_input(Input::ReleaseCard),
            Command::Query => {
                responses.push(self.state_response());
                return responses;
            }
            Command::Hash => {
                responses.push(Response::StateHash {
                    frame: self.battle.frame(),
                    hash: self.battle.state_hash(),
                });
                return responses;
            }
            Command::Quit => {
                responses.push(Response::Bye);
                return responses;
            }
        };

        tracing::debug!(cmd = name, accepted, phase = %self.battle.phase(), "Command processed");
        responses.push(Response::ack(name, accepted, self.battle.take_events()));
        if self.config.auto_state_output {
            responses.push(self.state_response());
        }
        if let Some(MatchOutcome::Defeat(stats)) = self.battle.outcome() {
            if !self.game_over_sent {
                self.game_over_sent = true;
                tracing::info!(turns = stats.turn_count, "Game over");
                responses.push(Response::GameOver { stats });
            }
        }
        responses
    }

    fn state_response(&self) -> Response {
        Response::State {
            hash: self.battle.state_hash(),
            snapshot: Box::new(self.battle.snapshot()),
        }
    }

    /// Run the command loop until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        let ready = Response::ready(self.battle.phase(), self.battle.frame());
        output.write_all(ready.to_json_line().as_bytes())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (responses, quit) = match Command::from_json(line) {
                Ok(cmd) => {
                    let quit = cmd == Command::Quit;
                    (self.handle(cmd), quit)
                }
                Err(e) => {
                    tracing::warn!("Invalid command: {}", e);
                    (vec![Response::error(format!("Invalid command: {e}"), None)], false)
                }
            };

            for response in &responses {
                output.write_all(response.to_json_line().as_bytes())?;
            }
            output.flush()?;
            if quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tactics_core::prelude::*;
    use tactics_test_utils::fixtures::{
        battle, battle_with, character, enemy, place_enemy, place_player, straight_one, walk_card,
    };

    use super::*;

    fn run_script(runner: &mut HeadlessRunner, script: &str) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        runner.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_script_session() {
        let mut runner = HeadlessRunner::new(battle());
        let script = concat!(
            "{\"cmd\":\"pick\",\"slot\":0}\n",
            "{\"cmd\":\"drop\",\"roster\":0}\n",
            "this is not json\n",
            "\n",
            "{\"cmd\":\"hash\"}\n",
            "{\"cmd\":\"quit\"}\n",
            "{\"cmd\":\"advance\"}\n",
        );
        let lines = run_script(&mut runner, script);

        let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
        assert_eq!(types, ["ready", "ack", "ack", "error", "state_hash", "bye"]);
        assert_eq!(lines[1]["accepted"], true);
        assert_eq!(lines[2]["cmd"], "drop");
        assert!(!lines[2]["events"].as_array().unwrap().is_empty());
        assert_eq!(runner.battle().phase(), Phase::Attack);
    }

    #[test]
    fn test_refused_input_is_acked_as_rejected() {
        let mut runner = HeadlessRunner::new(battle());
        let responses = runner.handle(Command::Toggle { row: 2, col: 1 });
        assert!(matches!(
            responses.as_slice(),
            [Response::Ack { accepted: false, .. }]
        ));
    }

    #[test]
    fn test_tick_delta_covers_full_u32_range() {
        assert_eq!(tick_delta(50), Fixed::from_num(50) / Fixed::from_num(1000));
        assert_eq!(tick_delta(2_500), Fixed::from_num(5) / Fixed::from_num(2));
        assert_eq!(tick_delta(3_000_000_000), Fixed::from_num(3_000_000));
        assert!(tick_delta(u32::MAX) > Fixed::from_num(4_294_967));
    }

    #[test]
    fn test_long_tick_is_accepted() {
        let mut runner = HeadlessRunner::new(battle());
        let cmd = Command::from_json(r#"{"cmd":"tick","count":1,"delta_ms":3000000000}"#).unwrap();
        let responses = runner.handle(cmd);
        assert!(matches!(
            responses.as_slice(),
            [Response::Ack { accepted: true, .. }]
        ));
        assert_eq!(runner.battle().frame(), 1);
    }

    #[test]
    fn test_auto_state_follows_each_ack() {
        let config = HeadlessConfig {
            auto_state_output: true,
        };
        let mut runner = HeadlessRunner::with_config(battle(), config);
        let responses = runner.handle(Command::Tick {
            count: 3,
            delta_ms: 50,
        });
        assert_eq!(responses.len(), 2);
        assert!(matches!(&responses[1], Response::State { snapshot, .. } if snapshot.frame == 3));
    }

    #[test]
    fn test_game_over_sent_once() {
        let data = GameData {
            player_cards: vec![straight_one()],
            enemy_cards: vec![walk_card("enemy-climb", &[(0, -3), (0, 1)])],
            characters: vec![character("knight", 1, 1)],
            enemies: vec![enemy(character("slime", 2, 1), &["enemy-climb"], 1)],
        };
        let mut b = battle_with(data);
        place_player(&mut b, 0, 0, 2, 1);
        place_enemy(&mut b, 0, 0, 1, 1);
        b.move_units(Side::Enemy);

        let mut runner = HeadlessRunner::new(b);
        let tick = Command::Tick {
            count: 5,
            delta_ms: 50,
        };
        let first = runner.handle(tick.clone());
        let game_overs = |rs: &[Response]| {
            rs.iter()
                .filter(|r| matches!(r, Response::GameOver { .. }))
                .count()
        };
        assert_eq!(game_overs(&first), 1);
        assert_eq!(game_overs(&runner.handle(tick)), 0);
        assert_eq!(runner.battle().frame(), 1);
    }
}
