//! The owning match state and per-frame update.
//!
//! [`Battle`] owns the board, entities, roster, card pool and turn
//! controller. A single driver calls [`Battle::update`] with the elapsed
//! time each frame and forwards player actions through
//! [`Battle::handle_input`]. All mutation happens inside those two calls.
//!
//! # Frame Order
//!
//! Each update runs, in order:
//! 1. **Locomotion** - advance glides, despawn finished attack effects
//! 2. **Defeat check** - report the outcome once every character is dead
//! 3. **Phase gate** - force-advance glide-gated phases once glides settle
//! 4. **Cleanup** - destroy queued entities in id order
//!
//! Every phase entry action is also followed by a defeat check, and a lost
//! match never changes phase again, so the reported counters are the ones
//! in place when the last character fell.
//!
//! The wave, combat, spawn and AI systems live in their own modules as
//! further `impl Battle` blocks and run as phase entry actions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, BoardCoord};
use crate::components::{CardRef, CharacterStats, Facing, Intent, Owner, Side, Transform, Unit};
use crate::config::BattleConfig;
use crate::data::GameData;
use crate::deck::DeploymentPool;
use crate::error::{GameError, Result};
use crate::events::{BattleEvent, MatchOutcome, MatchStats};
use crate::input::Input;
use crate::math::{Fixed, Vec2Fixed};
use crate::roster::{Roster, RosterId};
use crate::storage::{DestroyQueue, Entity, EntityId, EntityStorage};
use crate::turn::{Phase, TurnController};

/// A single match.
#[derive(Debug, Clone)]
pub struct Battle {
    pub(crate) config: BattleConfig,
    pub(crate) data: GameData,
    pub(crate) board: Board,
    pub(crate) entities: EntityStorage,
    pub(crate) roster: Roster,
    pub(crate) pool: DeploymentPool,
    pub(crate) turn: TurnController,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) destroy_queue: DestroyQueue,
    pub(crate) events: Vec<BattleEvent>,
    pub(crate) enemies_spawned: u32,
    pub(crate) bosses_defeated: u32,
    outcome: Option<MatchOutcome>,
    frame: u64,
}

impl Battle {
    /// Start a match on an empty board in the summon phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or the template data is unusable.
    pub fn new(config: BattleConfig, data: GameData) -> Result<Self> {
        config.validate()?;
        data.validate()?;

        let mut battle = Self {
            board: Board::from_config(&config),
            entities: EntityStorage::new(),
            roster: Roster::from_data(&data.characters),
            pool: DeploymentPool::new(data.player_cards.len()),
            turn: TurnController::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            destroy_queue: DestroyQueue::default(),
            events: Vec::new(),
            enemies_spawned: 0,
            bosses_defeated: 0,
            outcome: None,
            frame: 0,
            config,
            data,
        };
        battle.pool.set_pickable(true);

        tracing::info!(
            rows = battle.config.rows,
            cols = battle.config.cols,
            characters = battle.roster.len(),
            cards = battle.pool.items().len(),
            seed = battle.config.seed,
            "Battle started"
        );
        Ok(battle)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Battle configuration.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Template data.
    #[must_use]
    pub const fn data(&self) -> &GameData {
        &self.data
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All entities.
    #[must_use]
    pub const fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Player roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Card pool.
    #[must_use]
    pub const fn pool(&self) -> &DeploymentPool {
        &self.pool
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.turn.phase()
    }

    /// Completed turns.
    #[must_use]
    pub const fn turn_count(&self) -> u32 {
        self.turn.turn_count()
    }

    /// Number of updates run so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Current match counters.
    #[must_use]
    pub const fn stats(&self) -> MatchStats {
        MatchStats {
            enemies_spawned: self.enemies_spawned,
            turn_count: self.turn.turn_count(),
            bosses_defeated: self.bosses_defeated,
        }
    }

    /// Final result, once the match is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Match is over; updates and inputs are ignored.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Live units of one side, in creation order.
    #[must_use]
    pub fn unit_ids(&self, side: Side) -> Vec<EntityId> {
        self.entities
            .ids_where(|e| e.unit.as_ref().is_some_and(|u| u.owner.side() == side))
    }

    /// Intent of the unit standing on `tile`.
    #[must_use]
    pub fn intent_at(&self, tile: BoardCoord) -> Option<Intent> {
        self.board
            .occupant(tile)
            .and_then(|id| self.entities.unit(id))
            .map(|u| u.intent)
    }

    /// Entities with an active glide.
    #[must_use]
    pub fn glide_count(&self) -> usize {
        self.entities.count_where(|e| e.locomotion.is_some())
    }

    /// Stats a unit fights with: its roster entry for players, its own
    /// component for enemies.
    #[must_use]
    pub fn unit_stats(&self, id: EntityId) -> Option<&CharacterStats> {
        match self.entities.unit(id)?.owner {
            Owner::Player(roster) => self.roster.get(roster).map(|e| &e.stats),
            Owner::Enemy { .. } => self.entities.get(id)?.stats.as_ref(),
        }
    }

    pub(crate) fn unit_stats_mut(&mut self, id: EntityId) -> Option<&mut CharacterStats> {
        match self.entities.unit(id)?.owner {
            Owner::Player(roster) => self.roster.get_mut(roster).map(|e| &mut e.stats),
            Owner::Enemy { .. } => self.entities.get_mut(id)?.stats.as_mut(),
        }
    }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    /// Advance the battle by `delta` seconds.
    pub fn update(&mut self, delta: Fixed) {
        if self.is_over() {
            return;
        }
        self.frame += 1;

        if delta > Fixed::ZERO {
            self.run_locomotion_system(delta);
        }

        self.check_defeat();
        if self.phase().waits_for_glides() && self.glide_count() == 0 {
            self.advance_phase(true);
        }

        let destroyed = self.destroy_queue.flush(&mut self.entities);
        if destroyed > 0 {
            tracing::trace!(frame = self.frame, destroyed, "Destroyed queued entities");
        }
    }

    fn check_defeat(&mut self) {
        if self.outcome.is_none() && self.roster.all_dead() {
            let stats = self.stats();
            self.outcome = Some(MatchOutcome::Defeat(stats));
            self.events.push(BattleEvent::Defeat { stats });
            tracing::info!(
                turns = stats.turn_count,
                enemies_spawned = stats.enemies_spawned,
                bosses_defeated = stats.bosses_defeated,
                "Match lost"
            );
        }
    }

    // ========================================================================
    // Phase Control
    // ========================================================================

    /// Request the next phase.
    ///
    /// Returns the phase the battle ends up in, or `None` when the current
    /// phase needs `force` or the match is lost.
    pub fn advance_phase(&mut self, force: bool) -> Option<Phase> {
        if self.is_over() {
            return None;
        }
        let from = self.turn.phase();
        let to = self.turn.advance(force)?;
        if from == Phase::Summon {
            self.pool.set_pickable(false);
            self.pool.release();
        }
        self.events.push(BattleEvent::PhaseChanged { from, to });
        tracing::debug!(
            frame = self.frame,
            from = %from,
            to = %to,
            turn = self.turn.turn_count(),
            "Phase changed"
        );
        self.enter_phase(to);

        #[cfg(feature = "debug-validation")]
        if let Err(err) = self.check_occupancy() {
            tracing::error!(phase = %to, error = %err, "Occupancy out of sync");
        }

        Some(self.turn.phase())
    }

    /// Check that every occupied tile and every unit's `board_pos` agree.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidData`] describing the first mismatch.
    pub fn check_occupancy(&self) -> Result<()> {
        for tile in self.board.tiles() {
            let Some(id) = tile.occupant else {
                continue;
            };
            match self.entities.unit(id) {
                Some(unit) if unit.board_pos == tile.coord => {}
                Some(unit) => {
                    return Err(GameError::InvalidData(format!(
                        "tile {} holds entity {id} standing on {}",
                        tile.coord, unit.board_pos
                    )))
                }
                None => {
                    return Err(GameError::InvalidData(format!(
                        "tile {} holds entity {id} without a unit",
                        tile.coord
                    )))
                }
            }
        }
        for id in self.entities.sorted_ids() {
            let Some(unit) = self.entities.unit(id) else {
                continue;
            };
            if self.board.occupant(unit.board_pos) != Some(id) {
                return Err(GameError::InvalidData(format!(
                    "entity {id} stands on {} but the tile does not hold it",
                    unit.board_pos
                )));
            }
        }
        Ok(())
    }

    /// Run the entry action of a phase.
    fn enter_phase(&mut self, phase: Phase) {
        match phase {
            Phase::SetActions => {
                tracing::debug!(state_hash = self.state_hash(), "Turn start");
            }
            Phase::Autoplayer => {
                self.move_units(Side::Player);
            }
            Phase::Summon => self.pool.set_pickable(true),
            Phase::Attack => self.do_attacks(Side::Player),
            Phase::Return => self.return_units(),
            Phase::EnemyMove => {
                self.enemy_ai();
            }
            Phase::EnemySpawn => {
                self.spawn_enemy();
                self.advance_phase(true);
            }
            Phase::EnemyAttack => self.do_attacks(Side::Enemy),
        }
        self.check_defeat();
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Apply a player action. Returns `false` when it is not allowed right now.
    pub fn handle_input(&mut self, input: Input) -> bool {
        if self.is_over() {
            return false;
        }
        match input {
            Input::Advance => self.advance_phase(false).is_some(),
            Input::ToggleIntent { tile } => self.toggle_intent(tile),
            Input::PickCard { slot } => self.phase() == Phase::Summon && self.pool.pick(slot),
            Input::DropOnRoster { roster } => {
                let deployed = match self.pool.picked() {
                    Some(slot) if self.phase() == Phase::Summon => self.deploy(slot, roster),
                    _ => false,
                };
                self.pool.release();
                deployed
            }
            Input::ReleaseCard => self.pool.release().is_some(),
        }
    }

    /// Flip play/pause on the player unit standing at `tile`.
    pub fn toggle_intent(&mut self, tile: BoardCoord) -> bool {
        if self.phase() != Phase::SetActions {
            return false;
        }
        let Some(id) = self.board.occupant(tile) else {
            return false;
        };
        match self.entities.unit_mut(id) {
            Some(unit) if unit.player_controlled() => {
                unit.intent = unit.intent.toggled();
                tracing::debug!(entity = id, tile = %tile, intent = ?unit.intent, "Intent toggled");
                true
            }
            _ => false,
        }
    }

    /// Pair a card slot with a roster character and place the unit.
    ///
    /// The unit appears on the card's entry tile (player start plus the
    /// first step). Fails without side effects if the phase is wrong, the
    /// slot is not visible, the character is dead or already deployed, or
    /// the entry tile is taken. On success the summon phase ends.
    pub fn deploy(&mut self, slot: usize, roster: RosterId) -> bool {
        if self.phase() != Phase::Summon {
            return false;
        }
        let Some(item) = self.pool.item(slot).copied() else {
            return false;
        };
        if !item.visible || !self.roster.get(roster).is_some_and(|e| e.available()) {
            return false;
        }
        let Some(first) = self.data.player_cards.get(item.card).and_then(|c| c.step(0)) else {
            return false;
        };
        let at = self.config.player_start.offset(first.x, first.y);
        if !self.board.contains(at) {
            tracing::warn!(card = item.card, tile = %at, "Card entry tile is off the board");
            return false;
        }
        if self.board.occupant(at).is_some() {
            return false;
        }

        let id = match self.spawn_unit(Owner::Player(roster), CardRef::Player(item.card), at) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(error = %err, "Failed to place deployed unit");
                return false;
            }
        };
        self.pool.hide(slot);
        self.events.push(BattleEvent::CardPlaced {
            entity: id,
            roster,
            card: item.card,
            at,
        });
        tracing::info!(entity = id, roster = %roster, card = item.card, tile = %at, "Card deployed");

        self.advance_phase(false);
        true
    }

    /// Place a unit directly on a free tile, outside the deploy and spawn
    /// rules.
    ///
    /// Player owners are marked deployed and fight with their roster stats;
    /// enemy owners get a fresh stats instance from their template.
    ///
    /// # Errors
    ///
    /// Fails if the tile is off the board or occupied, the card does not
    /// exist, or the owner does not resolve to a living character or an
    /// enemy template.
    pub fn spawn_unit(&mut self, owner: Owner, card: CardRef, at: BoardCoord) -> Result<EntityId> {
        let center = self.board.center(at)?;
        if let Some(existing) = self.board.occupant(at) {
            return Err(GameError::InvalidData(format!(
                "tile {at} already holds entity {existing}"
            )));
        }
        if self.data.card(card).is_none() {
            return Err(GameError::UnknownCard(format!("{card:?}")));
        }
        let stats = match owner {
            Owner::Player(roster) => {
                if !self.roster.get(roster).is_some_and(|e| !e.dead) {
                    return Err(GameError::InvalidData(format!(
                        "roster entry {roster} cannot deploy"
                    )));
                }
                None
            }
            Owner::Enemy { template } => {
                let data = self.data.enemies.get(template).ok_or_else(|| {
                    GameError::InvalidData(format!("no enemy template {template}"))
                })?;
                Some(CharacterStats::from_data(&data.character))
            }
        };

        let facing = self.initial_facing(card);
        let mut entity = Entity::new()
            .with_transform(Transform { position: center })
            .with_unit(Unit::new(owner, card, at, facing));
        if let Some(stats) = stats {
            entity = entity.with_stats(stats);
        }
        let id = self.entities.insert(entity);
        self.board.place(at, id)?;
        if let Owner::Player(roster) = owner {
            if let Some(entry) = self.roster.get_mut(roster) {
                entry.deployed = true;
            }
        }
        Ok(id)
    }

    /// Facing toward a new unit's first move after its entry step.
    fn initial_facing(&self, card: CardRef) -> Facing {
        self.data
            .card(card)
            .and_then(|c| c.step(1))
            .map_or_else(Facing::default, |s| {
                Facing::from_delta(Vec2Fixed::from_ints(s.x, s.y))
            })
    }

    /// Strip a unit's components and queue it for destruction.
    pub(crate) fn retire_unit(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.unit = None;
            entity.locomotion = None;
        }
        self.destroy_queue.push(id);
    }

    // ========================================================================
    // Determinism
    // ========================================================================

    /// Hash of the whole gameplay state.
    ///
    /// Two battles built from the same config, data and seed that received
    /// the same inputs and frame deltas produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);
        self.enemies_spawned.hash(&mut hasher);
        self.bosses_defeated.hash(&mut hasher);
        self.rng.get_word_pos().hash(&mut hasher);

        for tile in self.board.tiles() {
            tile.occupant.hash(&mut hasher);
            tile.player_threatens.hash(&mut hasher);
            tile.pending_spawn.hash(&mut hasher);
        }

        let ids = self.entities.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(entity) = self.entities.get(id) {
                id.hash(&mut hasher);
                entity.unit.hash(&mut hasher);
                entity.stats.hash(&mut hasher);
                entity.transform.hash(&mut hasher);
                entity.locomotion.hash(&mut hasher);
                entity.effect.hash(&mut hasher);
            }
        }

        for (id, entry) in self.roster.iter() {
            id.hash(&mut hasher);
            entry.hash(&mut hasher);
        }
        self.pool.items().hash(&mut hasher);
        self.pool.picked().hash(&mut hasher);

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CharacterData, EnemyData, MovementCard, MovementStep};

    fn character() -> CharacterData {
        CharacterData {
            max_health: 2,
            power: 1,
            portrait: "knight".to_string(),
            attack_pattern: Vec::new(),
        }
    }

    fn data() -> GameData {
        GameData {
            player_cards: vec![
                MovementCard::new("down", vec![MovementStep::walk(0, -1)]),
                MovementCard::new("side", vec![MovementStep::walk(1, -1), MovementStep::walk(0, -1)]),
            ],
            enemy_cards: vec![MovementCard::new("up", vec![MovementStep::walk(0, 1)])],
            characters: vec![character(), character()],
            enemies: vec![EnemyData {
                character: character(),
                moves: vec!["up".to_string()],
                random_weight: 1,
            }],
        }
    }

    fn battle() -> Battle {
        let config = BattleConfig::default().with_board(4, 3, BoardCoord::new(3, 1));
        Battle::new(config, data()).unwrap()
    }

    #[test]
    fn test_new_battle_opens_in_summon() {
        let b = battle();
        assert_eq!(b.phase(), Phase::Summon);
        assert!(b.pool().items().iter().all(|i| i.visible && i.pickable));
        assert!(b.entities().is_empty());
        assert!(b.outcome().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BattleConfig::default().with_board(0, 3, BoardCoord::new(0, 0));
        assert!(matches!(
            Battle::new(config, data()),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deploy_places_unit_and_leaves_summon() {
        let mut b = battle();
        assert!(b.handle_input(Input::PickCard { slot: 0 }));
        assert!(b.handle_input(Input::DropOnRoster { roster: RosterId(1) }));

        let at = BoardCoord::new(2, 1);
        let id = b.board().occupant(at).unwrap();
        assert_eq!(b.entities().unit(id).unwrap().owner, Owner::Player(RosterId(1)));
        assert!(b.roster().get(RosterId(1)).unwrap().deployed);
        assert!(!b.pool().item(0).unwrap().visible);
        assert_eq!(b.phase(), Phase::Attack);
        assert!(b.pool().items().iter().all(|i| !i.pickable));
        assert_eq!(b.pool().picked(), None);
    }

    #[test]
    fn test_deploy_rejected_on_taken_tile() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        // Cycle back to the next summon phase.
        while b.phase() != Phase::Summon {
            if b.advance_phase(false).is_none() {
                b.advance_phase(true);
            }
        }
        let before = b.entities().len();
        // Slot 1 enters at (2,2); slot 0 is hidden. Occupy (2,2) first.
        let blocker = b
            .spawn_unit(Owner::Enemy { template: 0 }, CardRef::Enemy(0), BoardCoord::new(2, 2))
            .unwrap();
        assert!(!b.deploy(1, RosterId(1)));
        assert_eq!(b.entities().len(), before + 1);
        assert!(b.entities().contains(blocker));
        assert_eq!(b.phase(), Phase::Summon);
    }

    #[test]
    fn test_drop_without_pick_does_nothing() {
        let mut b = battle();
        assert!(!b.handle_input(Input::DropOnRoster { roster: RosterId(0) }));
        assert!(!b.handle_input(Input::ReleaseCard));
        assert_eq!(b.phase(), Phase::Summon);
    }

    #[test]
    fn test_toggle_only_in_set_actions() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let at = BoardCoord::new(2, 1);
        assert!(!b.toggle_intent(at));
        while b.phase() != Phase::SetActions {
            if b.advance_phase(false).is_none() {
                b.advance_phase(true);
            }
        }
        // No player wave has run yet.
        assert!(b.handle_input(Input::ToggleIntent { tile: at }));
        assert_eq!(b.intent_at(at), Some(Intent::Pause));
        assert!(!b.handle_input(Input::ToggleIntent { tile: BoardCoord::new(0, 0) }));
    }

    #[test]
    fn test_advance_ignored_in_forced_phase() {
        let mut b = battle();
        b.handle_input(Input::Advance);
        b.handle_input(Input::Advance);
        b.handle_input(Input::Advance);
        assert_eq!(b.phase(), Phase::EnemyMove);
        assert!(!b.handle_input(Input::Advance));
    }

    #[test]
    fn test_update_advances_glide_gated_phases() {
        let mut b = battle();
        b.handle_input(Input::Advance); // -> Attack
        b.update(Fixed::from_num(0.1)); // no glides: -> Return
        assert_eq!(b.phase(), Phase::Return);
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let a = battle();
        let mut b = battle();
        assert_eq!(a.state_hash(), b.state_hash());
        b.deploy(0, RosterId(0));
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_take_events_drains() {
        let mut b = battle();
        b.deploy(0, RosterId(0));
        let events = b.take_events();
        assert!(events.iter().any(|e| matches!(e, BattleEvent::CardPlaced { .. })));
        assert!(b.take_events().is_empty());
    }
}
