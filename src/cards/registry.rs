//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores all card definitions for a game.
//! It provides fast lookup by `CardId` and by name.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId, RawCardDefinition};
use crate::core::EngineError;

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use lore_engine::cards::{CardDefinition, CardId, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new(CardId::new(1), "Lantern", CardType::Item, 2));
///
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Lantern");
/// assert!(registry.find_by_name("lantern").is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load definitions from the parser's JSON output (an array of cards).
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let raw: Vec<RawCardDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for card in raw {
            let definition = CardDefinition::try_from(card)?;
            if registry.contains(definition.id) {
                return Err(EngineError::invalid(format!("duplicate card id {}", definition.id.raw())));
            }
            log::debug!("loaded {} ({})", definition.name, definition.id);
            registry.register(definition);
        }
        Ok(registry)
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, card);
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Find a definition by name, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.values().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}
