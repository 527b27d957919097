//! Card instances - runtime card state.
//!
//! `CardInstance` is a specific card in a game. It carries its print data
//! (base stats, base keywords, abilities) next to the values derived from
//! them by reconciliation (current stats, keywords, `meta`).
//!
//! Derived fields are only authoritative after `continuous::recalculate`
//! has run following the latest change to base values or active effects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::keyword::Keyword;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::effects::Ability;

/// Printed card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Character,
    Item,
    Location,
    Action,
}

impl CardType {
    /// Parse a type name as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "character" | "characters" => Some(Self::Character),
            "item" | "items" => Some(Self::Item),
            "location" | "locations" => Some(Self::Location),
            "action" | "actions" | "song" | "songs" => Some(Self::Action),
            _ => None,
        }
    }

    /// Does a card of this type stay in play after being played?
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, Self::Action)
    }
}

/// Where a card is. A card is in exactly one zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Deck,
    Hand,
    Inkwell,
    Play,
    Discard,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Deck, Zone::Hand, Zone::Inkwell, Zone::Play, Zone::Discard];
}

/// A modifiable stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Willpower,
    Lore,
}

impl Stat {
    /// Parse a stat name as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" | "modify_strength" => Some(Self::Strength),
            "willpower" | "will" | "modify_willpower" => Some(Self::Willpower),
            "lore" | "modify_lore" => Some(Self::Lore),
            _ => None,
        }
    }
}

/// Key under which per-turn ability use is tracked.
///
/// Boost abilities share one key however many a card has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbilityUseKey {
    Index(usize),
    Boost,
}

/// Transient derived flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMeta {
    /// Total Resist, rebuilt every reconciliation.
    pub resist: u32,
    pub has_ward: bool,
    pub has_reckless: bool,
    /// Strength lent by Support this turn. Re-applied on every reset.
    pub temporary_strength: i32,
    /// Abilities used this turn.
    pub used_abilities: BTreeSet<AbilityUseKey>,
    /// Triggered abilities (by index) that already fired this turn.
    pub triggered_this_turn: BTreeSet<usize>,
}

impl CardMeta {
    /// Forget everything that only lasts for a turn.
    pub fn clear_turn_markers(&mut self) {
        self.temporary_strength = 0;
        self.used_abilities.clear();
        self.triggered_this_turn.clear();
    }
}

/// A card in a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique instance ID.
    pub instance_id: InstanceId,

    /// Owner. The controller is whoever's zone holds the card, which is
    /// always the owner.
    pub owner: PlayerId,

    pub name: String,
    pub card_type: CardType,
    #[serde(default)]
    pub subtypes: SmallVec<[String; 4]>,
    pub cost: u32,
    #[serde(default)]
    pub inkable: bool,
    /// Ink needed to move a character here (locations only).
    #[serde(default)]
    pub move_cost: Option<u32>,

    pub zone: Zone,

    // === Print values ===
    pub base_strength: i32,
    pub base_willpower: i32,
    pub base_lore: i32,
    #[serde(default)]
    pub base_keywords: Vec<Keyword>,

    // === Derived values ===
    pub strength: i32,
    pub willpower: i32,
    pub lore: i32,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub meta: CardMeta,

    // === Board state ===
    /// False once exerted.
    pub ready: bool,
    pub damage: u32,
    /// Turn this card entered play. A character is drying on that turn.
    pub turn_played: Option<u32>,
    /// Location this character is at.
    pub location_id: Option<InstanceId>,
    /// Cards placed under this one (Boost and similar). Not in any zone.
    #[serde(default)]
    pub cards_under: Vec<CardInstance>,

    /// Parsed abilities, in printed order.
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl CardInstance {
    /// Create a card with no stats.
    #[must_use]
    pub fn new(
        instance_id: InstanceId,
        owner: PlayerId,
        name: impl Into<String>,
        card_type: CardType,
        cost: u32,
    ) -> Self {
        Self {
            instance_id,
            owner,
            name: name.into(),
            card_type,
            subtypes: SmallVec::new(),
            cost,
            inkable: false,
            move_cost: None,
            zone: Zone::Deck,
            base_strength: 0,
            base_willpower: 0,
            base_lore: 0,
            base_keywords: Vec::new(),
            strength: 0,
            willpower: 0,
            lore: 0,
            keywords: Vec::new(),
            meta: CardMeta::default(),
            ready: true,
            damage: 0,
            turn_played: None,
            location_id: None,
            cards_under: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// Create a character with printed stats.
    #[must_use]
    pub fn character(
        instance_id: InstanceId,
        owner: PlayerId,
        name: impl Into<String>,
        cost: u32,
        strength: i32,
        willpower: i32,
        lore: i32,
    ) -> Self {
        let mut card = Self::new(instance_id, owner, name, CardType::Character, cost);
        card.base_strength = strength;
        card.base_willpower = willpower;
        card.base_lore = lore;
        card.reset_stats();
        card
    }

    // === Builders ===

    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<Keyword>) -> Self {
        let keyword = keyword.into();
        self.keywords.push(keyword.clone());
        self.base_keywords.push(keyword);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn inkable(mut self) -> Self {
        self.inkable = true;
        self
    }

    #[must_use]
    pub fn with_move_cost(mut self, cost: u32) -> Self {
        self.move_cost = Some(cost);
        self
    }

    #[must_use]
    pub fn in_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    // === Queries ===

    /// Played this turn, so it can't quest, challenge or pay exert costs.
    #[must_use]
    pub fn is_drying(&self, current_turn: u32) -> bool {
        self.card_type == CardType::Character && self.turn_played == Some(current_turn)
    }

    /// Does the card currently have a keyword of this kind?
    #[must_use]
    pub fn has_keyword(&self, keyword: &Keyword) -> bool {
        self.keywords.iter().any(|k| k.same_kind(keyword))
    }

    /// Case-insensitive subtype check.
    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s.eq_ignore_ascii_case(subtype))
    }

    /// Songs are actions with the Song subtype.
    #[must_use]
    pub fn is_song(&self) -> bool {
        self.card_type == CardType::Action && self.has_subtype("Song")
    }

    /// Sum of every `Resist +N` keyword currently on the card.
    #[must_use]
    pub fn keyword_resist(&self) -> u32 {
        self.keywords
            .iter()
            .filter_map(|k| match k {
                Keyword::Resist(n) => Some(*n),
                _ => None,
            })
            .sum()
    }

    /// Highest Challenger bonus on the card.
    #[must_use]
    pub fn challenger_bonus(&self) -> u32 {
        self.keywords
            .iter()
            .filter_map(|k| match k {
                Keyword::Challenger(n) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Strength usable for dealing damage.
    #[must_use]
    pub fn effective_strength(&self) -> u32 {
        self.strength.max(0) as u32
    }

    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.damage > 0
    }

    // === Mutation ===

    /// Copy base stats and keywords into the derived fields.
    pub fn reset_stats(&mut self) {
        self.strength = self.base_strength;
        self.willpower = self.base_willpower;
        self.lore = self.base_lore;
        self.keywords = self.base_keywords.clone();
    }

    /// Add to a derived stat.
    pub fn modify_stat(&mut self, stat: Stat, delta: i32) {
        match stat {
            Stat::Strength => self.strength += delta,
            Stat::Willpower => self.willpower += delta,
            Stat::Lore => self.lore += delta,
        }
    }

    /// Add a keyword unless the exact keyword is already present.
    pub fn grant_keyword(&mut self, keyword: Keyword) {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
    }

    /// Clear everything a card forgets when it leaves play.
    pub fn leave_play(&mut self) {
        self.damage = 0;
        self.ready = true;
        self.turn_played = None;
        self.location_id = None;
        self.meta = CardMeta::default();
        self.reset_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> CardInstance {
        CardInstance::character(InstanceId(10), PlayerId::new(0), "Hero", 3, 2, 4, 1)
    }

    #[test]
    fn test_character_stats() {
        let card = hero();
        assert_eq!(card.strength, 2);
        assert_eq!(card.willpower, 4);
        assert_eq!(card.lore, 1);
        assert!(card.ready);
        assert_eq!(card.zone, Zone::Deck);
    }

    #[test]
    fn test_drying() {
        let mut card = hero();
        card.turn_played = Some(3);
        assert!(card.is_drying(3));
        assert!(!card.is_drying(4));

        let mut item = CardInstance::new(InstanceId(11), PlayerId::new(0), "Lamp", CardType::Item, 1);
        item.turn_played = Some(3);
        assert!(!item.is_drying(3));
    }

    #[test]
    fn test_keyword_queries() {
        let card = hero()
            .with_keyword("Resist +1")
            .with_keyword(Keyword::Resist(2))
            .with_keyword("Challenger +2");

        assert_eq!(card.keyword_resist(), 3);
        assert_eq!(card.challenger_bonus(), 2);
        assert!(card.has_keyword(&Keyword::Resist(0)));
        assert!(!card.has_keyword(&Keyword::Ward));
    }

    #[test]
    fn test_song_detection() {
        let song = CardInstance::new(InstanceId(12), PlayerId::new(0), "Ballad", CardType::Action, 3)
            .with_subtype("Song");
        assert!(song.is_song());
        assert!(!hero().is_song());
    }

    #[test]
    fn test_reset_and_modify() {
        let mut card = hero();
        card.modify_stat(Stat::Strength, 3);
        card.grant_keyword(Keyword::Evasive);
        assert_eq!(card.strength, 5);

        card.reset_stats();
        assert_eq!(card.strength, 2);
        assert!(!card.has_keyword(&Keyword::Evasive));
    }

    #[test]
    fn test_leave_play_clears_board_state() {
        let mut card = hero();
        card.damage = 2;
        card.ready = false;
        card.turn_played = Some(1);
        card.meta.temporary_strength = 3;

        card.leave_play();

        assert_eq!(card.damage, 0);
        assert!(card.ready);
        assert!(card.turn_played.is_none());
        assert_eq!(card.meta, CardMeta::default());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(CardType::parse("Song"), Some(CardType::Action));
        assert_eq!(Stat::parse("modify_strength"), Some(Stat::Strength));
        assert_eq!(Stat::parse("cost"), None);
    }

    #[test]
    fn test_card_instance_serialization() {
        let mut card = hero().with_keyword("Ward").with_subtype("Hero");
        card.meta.used_abilities.insert(AbilityUseKey::Boost);

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
