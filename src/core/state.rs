//! Game state.
//!
//! ## GameState
//!
//! Complete authoritative state of one game:
//! - Per-player zones, lore and flags
//! - Active (continuous) effects
//! - Turn counters and the turn history
//! - Action history
//! - RNG
//!
//! Every zone change goes through [`GameState::move_card`], a single
//! remove-then-insert, so a card is never in two zone lists.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::action::ActionRecord;
use super::config::EngineConfig;
use super::entity::{EffectId, InstanceId};
use super::error::EngineError;
use super::player::{PlayerId, PlayerMap, PlayerState};
use super::rng::GameRng;
use crate::cards::{CardInstance, Zone};
use crate::effects::{ActiveEffect, EffectTarget, Restriction};

/// Something that happened this turn that later conditions may ask about.
///
/// Cleared at the end of every turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// `card` was put under `under` (Boost and similar).
    CardPlacedUnder {
        player: PlayerId,
        card: InstanceId,
        under: InstanceId,
    },
    CardPlayed { player: PlayerId, card: InstanceId },
}

/// Complete game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub config: EngineConfig,

    pub players: PlayerMap<PlayerState>,

    /// Every continuous effect currently in force.
    pub active_effects: Vec<ActiveEffect>,

    /// Whose turn it is.
    pub active_player: PlayerId,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Events of the current turn, for conditional triggers.
    pub turn_history: Vector<TurnEvent>,

    /// Every action taken, in order.
    pub action_history: Vector<ActionRecord>,

    pub winner: Option<PlayerId>,

    /// Random number generator. Not part of snapshots.
    #[serde(skip)]
    pub rng: GameRng,

    next_instance_id: u32,
    next_effect_id: u64,
    /// Sequence for while-active effect ids, restarted by every reconciliation.
    pub(crate) static_effect_seq: u64,
}

impl GameState {
    /// Create an empty game.
    ///
    /// ## Defaults
    ///
    /// - `active_player`: Player 0
    /// - `turn_number`: 1
    /// - every player's `lore_goal`: `config.default_lore_goal`
    #[must_use]
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let players = PlayerMap::new(config.player_count, |id| PlayerState::new(id, config.default_lore_goal));
        Self {
            config,
            players,
            active_effects: Vec::new(),
            active_player: PlayerId::new(0),
            turn_number: 1,
            turn_history: Vector::new(),
            action_history: Vector::new(),
            winner: None,
            rng: GameRng::new(seed),
            next_instance_id: 1,
            next_effect_id: 1,
            static_effect_seq: 0,
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    /// Opponents of `player`, in turn order starting after them.
    #[must_use]
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        let count = self.player_count();
        (1..count)
            .map(|offset| PlayerId::new(((player.index() + offset) % count) as u8))
            .collect()
    }

    /// The player after `player` in turn order.
    #[must_use]
    pub fn next_player(&self, player: PlayerId) -> PlayerId {
        PlayerId::new(((player.index() + 1) % self.player_count()) as u8)
    }

    /// Is the game over?
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    // === Ids ===

    /// Allocate a fresh card instance id.
    pub fn allocate_instance_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        id
    }

    fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        id
    }

    // === Cards ===

    /// Find a card in any zone of any player.
    #[must_use]
    pub fn find_card(&self, id: InstanceId) -> Option<&CardInstance> {
        self.players.iter().find_map(|(_, p)| p.find(id))
    }

    /// Find a card in any zone of any player, mutably.
    pub fn card_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        let owner = self.find_card(id)?.owner;
        self.players[owner].find_mut(id)
    }

    /// A card that is in play.
    #[must_use]
    pub fn in_play(&self, id: InstanceId) -> Option<&CardInstance> {
        self.find_card(id).filter(|c| c.zone == Zone::Play)
    }

    /// Every card in play, in player order then play order.
    pub fn cards_in_play(&self) -> impl Iterator<Item = &CardInstance> {
        self.players.iter().flat_map(|(_, p)| p.play.iter())
    }

    /// Ids of every card in play, in player order then play order.
    #[must_use]
    pub fn play_order(&self) -> Vec<InstanceId> {
        self.cards_in_play().map(|c| c.instance_id).collect()
    }

    /// Put a new card into its owner's zone. The card must not already be
    /// in the game.
    pub fn put_into(&mut self, mut card: CardInstance, zone: Zone) {
        debug_assert!(self.find_card(card.instance_id).is_none(), "card already in the game");
        self.next_instance_id = self.next_instance_id.max(card.instance_id.raw() + 1);
        card.zone = zone;
        self.players[card.owner].zone_mut(zone).push(card);
    }

    /// Move a card to a zone of its owner (on top, for the deck).
    ///
    /// Leaving play clears the card's board state, sends anything under it
    /// to the discard pile, detaches characters from it (for locations) and
    /// drops card-targeted effects aimed at it. Returns false if the card
    /// doesn't exist.
    pub fn move_card(&mut self, id: InstanceId, to: Zone) -> bool {
        let Some((owner, from)) = self.find_card(id).map(|c| (c.owner, c.zone)) else {
            return false;
        };

        let player = &mut self.players[owner];
        let list = player.zone_mut(from);
        let Some(index) = list.iter().position(|c| c.instance_id == id) else {
            return false;
        };
        let mut card = list.remove(index);

        if from == Zone::Play && to != Zone::Play {
            card.leave_play();
            for mut under in card.cards_under.drain(..) {
                under.zone = Zone::Discard;
                player.discard.push(under);
            }
            self.forget_card(id);
        }

        card.zone = to;
        self.players[owner].zone_mut(to).push(card);
        true
    }

    /// Remove references to a card that left play.
    fn forget_card(&mut self, id: InstanceId) {
        for (_, player) in self.players.iter_mut() {
            for card in player.play.iter_mut().filter(|c| c.location_id == Some(id)) {
                card.location_id = None;
            }
        }
        self.active_effects.retain_mut(|effect| match &mut effect.target {
            EffectTarget::Cards(ids) => {
                ids.retain(|target| *target != id);
                !ids.is_empty()
            }
            _ => true,
        });
    }

    /// Draw up to `count` cards from the top of the deck. Returns the ids drawn.
    pub fn draw(&mut self, player: PlayerId, count: u32) -> SmallVec<[InstanceId; 4]> {
        let mut drawn = SmallVec::new();
        for _ in 0..count {
            let Some(top) = self.players[player].deck.last().map(|c| c.instance_id) else {
                break;
            };
            self.move_card(top, Zone::Hand);
            drawn.push(top);
        }
        drawn
    }

    /// Shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        let Self { players, rng, .. } = self;
        rng.shuffle(&mut players[player].deck);
    }

    // === Active effects ===

    /// Record a continuous effect. Assigns its id and creation turn.
    pub fn add_effect(&mut self, mut effect: ActiveEffect) -> EffectId {
        effect.id = if effect.duration.is_while_active() {
            let id = EffectId::while_active(self.static_effect_seq);
            self.static_effect_seq += 1;
            id
        } else {
            self.allocate_effect_id()
        };
        effect.created_turn = self.turn_number;
        let id = effect.id;
        self.active_effects.push(effect);
        id
    }

    /// Remove every effect matching the predicate.
    pub fn remove_effects(&mut self, mut predicate: impl FnMut(&ActiveEffect) -> bool) {
        self.active_effects.retain(|e| !predicate(e));
    }

    /// Cards in play an effect currently applies to.
    #[must_use]
    pub fn effect_targets(&self, effect: &ActiveEffect) -> SmallVec<[InstanceId; 4]> {
        match &effect.target {
            EffectTarget::Cards(ids) => ids.iter().copied().filter(|id| self.in_play(*id).is_some()).collect(),
            EffectTarget::Scope(filter) => self
                .cards_in_play()
                .filter(|c| filter.matches(c, effect.controller, effect.source))
                .map(|c| c.instance_id)
                .collect(),
            EffectTarget::Players(_) => SmallVec::new(),
        }
    }

    /// Is a card under a restriction?
    #[must_use]
    pub fn card_restricted(&self, id: InstanceId, restriction: Restriction) -> bool {
        self.active_effects
            .iter()
            .filter(|e| e.as_restriction() == Some(restriction))
            .any(|e| self.effect_targets(e).contains(&id))
    }

    /// Is a player under a restriction?
    #[must_use]
    pub fn player_restricted(&self, player: PlayerId, restriction: Restriction) -> bool {
        self.active_effects
            .iter()
            .any(|e| e.as_restriction() == Some(restriction) && e.target.includes_player(player))
    }

    // === History ===

    pub fn record_turn_event(&mut self, event: TurnEvent) {
        self.turn_history.push_back(event);
    }

    pub fn record_action(&mut self, record: ActionRecord) {
        self.action_history.push_back(record);
    }

    /// Serialize the state with bincode.
    ///
    /// Two states with equal snapshots are identical in every field but the RNG.
    pub fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        Ok(bincode::serialize(self)?)
    }
}
