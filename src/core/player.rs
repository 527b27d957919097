//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 1-255 players.
//!
//! ## PlayerMap
//!
//! Efficient per-player data storage backed by `Vec` for O(1) access.
//! Supports iteration and indexing by `PlayerId`.
//!
//! ## PlayerState
//!
//! A player's zones, lore total and per-turn flags.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::cards::{CardFilter, CardInstance, CardType, Zone};
use crate::core::entity::InstanceId;

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use lore_engine::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use lore_engine::core::{PlayerId, PlayerMap};
///
/// let mut lore: PlayerMap<u32> = PlayerMap::with_value(2, 0);
/// lore[PlayerId::new(1)] = 5;
/// assert_eq!(lore[PlayerId::new(1)], 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// A queued discount, consumed by the next matching purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostReduction {
    pub amount: u32,
    pub filter: CardFilter,
}

/// Everything one player owns: zones, lore and per-turn flags.
///
/// Zones are ordered; the deck's tail is its top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub hand: Vec<CardInstance>,
    pub deck: Vec<CardInstance>,
    pub discard: Vec<CardInstance>,
    pub inkwell: Vec<CardInstance>,
    pub play: Vec<CardInstance>,
    /// Victory points.
    pub lore: u32,
    /// Lore needed to win. Reset to the configured default every reconciliation.
    pub lore_goal: u32,
    pub inked_this_turn: bool,
    pub cost_reductions: Vec<CostReduction>,
}

impl PlayerState {
    /// Create an empty player with the given lore goal.
    #[must_use]
    pub fn new(id: PlayerId, lore_goal: u32) -> Self {
        Self {
            id,
            hand: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            inkwell: Vec::new(),
            play: Vec::new(),
            lore: 0,
            lore_goal,
            inked_this_turn: false,
            cost_reductions: Vec::new(),
        }
    }

    /// Get the cards in a zone.
    #[must_use]
    pub fn zone(&self, zone: Zone) -> &Vec<CardInstance> {
        match zone {
            Zone::Deck => &self.deck,
            Zone::Hand => &self.hand,
            Zone::Inkwell => &self.inkwell,
            Zone::Play => &self.play,
            Zone::Discard => &self.discard,
        }
    }

    /// Get the cards in a zone mutably.
    pub fn zone_mut(&mut self, zone: Zone) -> &mut Vec<CardInstance> {
        match zone {
            Zone::Deck => &mut self.deck,
            Zone::Hand => &mut self.hand,
            Zone::Inkwell => &mut self.inkwell,
            Zone::Play => &mut self.play,
            Zone::Discard => &mut self.discard,
        }
    }

    /// Find a card in any of this player's zones.
    #[must_use]
    pub fn find(&self, id: InstanceId) -> Option<&CardInstance> {
        Zone::ALL
            .iter()
            .find_map(|&zone| self.zone(zone).iter().find(|c| c.instance_id == id))
    }

    /// Find a card in any of this player's zones, mutably.
    pub fn find_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        let zone = self.find(id)?.zone;
        self.zone_mut(zone).iter_mut().find(|c| c.instance_id == id)
    }

    /// Number of ready (unexerted) cards in the inkwell.
    #[must_use]
    pub fn ready_ink(&self) -> u32 {
        self.inkwell.iter().filter(|c| c.ready).count() as u32
    }

    /// Exert `amount` ready ink cards. Returns false, paying nothing, if short.
    pub fn pay_ink(&mut self, amount: u32) -> bool {
        if self.ready_ink() < amount {
            return false;
        }
        for card in self.inkwell.iter_mut().filter(|c| c.ready).take(amount as usize) {
            card.ready = false;
        }
        true
    }

    /// Characters this player has in play.
    pub fn characters(&self) -> impl Iterator<Item = &CardInstance> {
        self.play.iter().filter(|c| c.card_type == CardType::Character)
    }
}
