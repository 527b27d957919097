//! Card definitions - printed card data.
//!
//! `CardDefinition` holds what is printed on a card: cost, stats,
//! keywords and abilities. A game creates `CardInstance`s from it.
//!
//! Card data arrives as JSON produced by the ability parser. Its ability
//! descriptors are in the AST shape (`effects::ast`) and are converted to
//! typed abilities once, when the definition is loaded.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::instance::{CardInstance, CardType, Zone};
use super::keyword::Keyword;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::EngineError;
use crate::effects::ast::AbilityAst;
use crate::effects::Ability;

/// Unique identifier for a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Printed card data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub card_type: CardType,
    pub cost: u32,
    pub inkable: bool,
    pub strength: i32,
    pub willpower: i32,
    pub lore: i32,
    pub move_cost: Option<u32>,
    pub keywords: Vec<Keyword>,
    pub subtypes: SmallVec<[String; 4]>,
    pub abilities: Vec<Ability>,
}

impl CardDefinition {
    /// Create a definition with no stats or abilities.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType, cost: u32) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            cost,
            inkable: false,
            strength: 0,
            willpower: 0,
            lore: 0,
            move_cost: None,
            keywords: Vec::new(),
            subtypes: SmallVec::new(),
            abilities: Vec::new(),
        }
    }

    /// Set printed strength, willpower and lore (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, strength: i32, willpower: i32, lore: i32) -> Self {
        self.strength = strength;
        self.willpower = willpower;
        self.lore = lore;
        self
    }

    #[must_use]
    pub fn inkable(mut self) -> Self {
        self.inkable = true;
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<Keyword>) -> Self {
        self.keywords.push(keyword.into());
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

    /// Create an instance of this card for `owner`, placed in the deck.
    #[must_use]
    pub fn instantiate(&self, instance_id: InstanceId, owner: PlayerId) -> CardInstance {
        let mut card = CardInstance::new(instance_id, owner, self.name.clone(), self.card_type, self.cost);
        card.inkable = self.inkable;
        card.move_cost = self.move_cost;
        card.subtypes = self.subtypes.clone();
        card.base_strength = self.strength;
        card.base_willpower = self.willpower;
        card.base_lore = self.lore;
        card.base_keywords = self.keywords.clone();
        card.abilities = self.abilities.clone();
        card.zone = Zone::Deck;
        card.reset_stats();
        card
    }
}

/// Card data as the parser emits it.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawCardDefinition {
    id: u32,
    name: String,
    #[serde(rename = "type")]
    card_type: String,
    #[serde(default)]
    cost: u32,
    #[serde(default)]
    inkable: bool,
    #[serde(default)]
    strength: i32,
    #[serde(default)]
    willpower: i32,
    #[serde(default)]
    lore: i32,
    #[serde(default)]
    move_cost: Option<u32>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    subtypes: Vec<String>,
    #[serde(default)]
    abilities: Vec<AbilityAst>,
}

impl TryFrom<RawCardDefinition> for CardDefinition {
    type Error = EngineError;

    fn try_from(raw: RawCardDefinition) -> Result<Self, Self::Error> {
        let card_type = CardType::parse(&raw.card_type)
            .ok_or_else(|| EngineError::invalid(format!("unknown card type `{}`", raw.card_type)))?;
        let abilities = raw
            .abilities
            .into_iter()
            .map(Ability::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut subtypes: SmallVec<[String; 4]> = raw.subtypes.into_iter().collect();
        if raw.card_type.eq_ignore_ascii_case("song") && !subtypes.iter().any(|s| s == "Song") {
            subtypes.push("Song".to_string());
        }

        Ok(Self {
            id: CardId::new(raw.id),
            name: raw.name,
            card_type,
            cost: raw.cost,
            inkable: raw.inkable,
            strength: raw.strength,
            willpower: raw.willpower,
            lore: raw.lore,
            move_cost: raw.move_cost,
            keywords: raw.keywords.iter().map(|k| Keyword::parse(k)).collect(),
            subtypes,
            abilities,
        })
    }
}
