//! Game setup.

use log::info;

use super::Game;
use crate::cards::{CardId, CardRegistry, Zone};
use crate::core::player::PlayerId;
use crate::core::{EngineConfig, EngineError, GameState};
use crate::decisions::DecisionMaker;
use crate::rules::{self, AbilityExecutor};
use crate::triggers::EventBus;

enum DeckList {
    Ids(Vec<CardId>),
    Names(Vec<String>),
}

/// Builder for a game ready to play: decks shuffled, opening hands drawn,
/// the first turn started.
///
/// One deck per player, in seat order. Player 0 goes first.
pub struct GameBuilder {
    registry: CardRegistry,
    config: Option<EngineConfig>,
    decks: Vec<DeckList>,
    shuffle: bool,
    decisions: Option<Box<dyn DecisionMaker>>,
    events: Option<Box<dyn EventBus>>,
    executor: Option<Box<dyn AbilityExecutor>>,
}

impl GameBuilder {
    #[must_use]
    pub fn new(registry: CardRegistry) -> Self {
        Self {
            registry,
            config: None,
            decks: Vec::new(),
            shuffle: true,
            decisions: None,
            events: None,
            executor: None,
        }
    }

    /// Use this configuration. Its player count must match the decks.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Add the next player's deck by card id.
    #[must_use]
    pub fn deck(mut self, cards: impl IntoIterator<Item = CardId>) -> Self {
        self.decks.push(DeckList::Ids(cards.into_iter().collect()));
        self
    }

    /// Add the next player's deck by card name.
    #[must_use]
    pub fn deck_by_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.decks.push(DeckList::Names(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Keep decks in list order; the last card listed is drawn first.
    #[must_use]
    pub fn unshuffled(mut self) -> Self {
        self.shuffle = false;
        self
    }

    #[must_use]
    pub fn decisions(mut self, decisions: impl DecisionMaker + 'static) -> Self {
        self.decisions = Some(Box::new(decisions));
        self
    }

    #[must_use]
    pub fn events(mut self, events: impl EventBus + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    #[must_use]
    pub fn executor(mut self, executor: impl AbilityExecutor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    fn resolve(&self, deck: &DeckList) -> Result<Vec<CardId>, EngineError> {
        match deck {
            DeckList::Ids(ids) => {
                if let Some(missing) = ids.iter().find(|id| !self.registry.contains(**id)) {
                    return Err(EngineError::UnknownCard(missing.to_string()));
                }
                Ok(ids.clone())
            }
            DeckList::Names(names) => names
                .iter()
                .map(|name| {
                    self.registry
                        .find_by_name(name)
                        .map(|card| card.id)
                        .ok_or_else(|| EngineError::UnknownCard(name.clone()))
                })
                .collect(),
        }
    }

    /// Build the game.
    pub fn build(self, seed: u64) -> Result<Game, EngineError> {
        if self.decks.is_empty() {
            return Err(EngineError::Setup("no decks".to_string()));
        }
        let config = match &self.config {
            Some(config) if config.player_count != self.decks.len() => {
                return Err(EngineError::Setup(format!(
                    "{} decks for {} players",
                    self.decks.len(),
                    config.player_count
                )));
            }
            Some(config) => config.clone(),
            None => EngineConfig::new(self.decks.len()),
        };

        let lists = self
            .decks
            .iter()
            .map(|deck| self.resolve(deck))
            .collect::<Result<Vec<_>, _>>()?;

        let hand_size = config.starting_hand_size as u32;
        let mut state = GameState::new(config, seed);
        for (seat, list) in lists.iter().enumerate() {
            let player = PlayerId::new(seat as u8);
            for card_id in list {
                if let Some(definition) = self.registry.get(*card_id) {
                    let instance_id = state.allocate_instance_id();
                    state.put_into(definition.instantiate(instance_id, player), Zone::Deck);
                }
            }
            if self.shuffle {
                state.shuffle_deck(player);
            }
            state.draw(player, hand_size);
        }
        info!(target: "lore_engine::action", "game set up for {} players, seed {}", lists.len(), seed);

        let mut game = Game::new(state);
        if let Some(decisions) = self.decisions {
            game.decisions = decisions;
        }
        if let Some(events) = self.events {
            game.events = events;
        }
        game.executor = self.executor;

        rules::start_turn(&mut game.context())?;
        Ok(game)
    }
}
