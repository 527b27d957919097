//! A game bundled with its collaborators.
//!
//! `Game` owns the state, the decision maker, the event bus and an
//! optional ability executor, and dispatches `PlayerAction`s to the rules.
//!
//! ```
//! use lore_engine::cards::{CardDefinition, CardId, CardRegistry, CardType};
//! use lore_engine::core::PlayerAction;
//! use lore_engine::game::GameBuilder;
//!
//! let mut registry = CardRegistry::new();
//! registry.register(CardDefinition::new(CardId(1), "Squire", CardType::Character, 1).with_stats(1, 2, 1).inkable());
//!
//! let mut game = GameBuilder::new(registry)
//!     .deck(vec![CardId(1); 10])
//!     .deck(vec![CardId(1); 10])
//!     .build(7)
//!     .unwrap();
//!
//! let card = game.state.player(game.state.active_player).hand[0].instance_id;
//! assert!(game.apply(PlayerAction::Ink { card }).unwrap());
//! assert!(game.apply(PlayerAction::PassTurn).unwrap());
//! assert_eq!(game.state.turn_number, 2);
//! ```

mod builder;

pub use builder::GameBuilder;

use log::info;

use crate::core::{ActionRecord, EngineError, GameState, PlayerAction};
use crate::decisions::{DecisionMaker, NoDecisions};
use crate::rules::{self, AbilityExecutor, GameContext};
use crate::triggers::{EventBus, NullEventBus};

/// One game in progress.
pub struct Game {
    pub state: GameState,
    pub decisions: Box<dyn DecisionMaker>,
    pub events: Box<dyn EventBus>,
    pub executor: Option<Box<dyn AbilityExecutor>>,
}

impl Game {
    /// Wrap a state with headless collaborators.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            decisions: Box::new(NoDecisions),
            events: Box::new(NullEventBus),
            executor: None,
        }
    }

    /// Install a decision maker (builder pattern).
    #[must_use]
    pub fn with_decisions(mut self, decisions: impl DecisionMaker + 'static) -> Self {
        self.decisions = Box::new(decisions);
        self
    }

    /// Install an event bus (builder pattern).
    #[must_use]
    pub fn with_events(mut self, events: impl EventBus + 'static) -> Self {
        self.events = Box::new(events);
        self
    }

    /// Install an ability executor (builder pattern).
    #[must_use]
    pub fn with_executor(mut self, executor: impl AbilityExecutor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Borrow everything as a handler context.
    pub fn context(&mut self) -> GameContext<'_> {
        let executor: Option<&mut dyn AbilityExecutor> = match &mut self.executor {
            Some(executor) => Some(executor.as_mut()),
            None => None,
        };
        let ctx = GameContext::new(&mut self.state, self.decisions.as_mut(), self.events.as_mut());
        match executor {
            Some(executor) => ctx.with_executor(executor),
            None => ctx,
        }
    }

    /// Take an action for the active player and record it.
    ///
    /// Returns whether the action did anything. Nothing happens once the
    /// game is over.
    pub fn apply(&mut self, action: PlayerAction) -> Result<bool, EngineError> {
        if self.state.is_over() {
            return Ok(false);
        }
        let player = self.state.active_player;
        let turn = self.state.turn_number;
        info!(target: "lore_engine::action", "{} takes {}", player, action.name());

        let mut ctx = self.context();
        let succeeded = match &action {
            PlayerAction::Ink { card } => rules::ink(&mut ctx, player, *card),
            PlayerAction::Quest { card } => rules::quest(&mut ctx, player, *card)?,
            PlayerAction::PlayCard { card, target } => rules::play_card(&mut ctx, player, *card, *target, false)?,
            PlayerAction::UseAbility { card, index, target } => {
                rules::use_ability(&mut ctx, player, *card, *index, *target)?
            }
            PlayerAction::SingSong { singer, song } => rules::sing_song(&mut ctx, player, *singer, *song)?,
            PlayerAction::MoveToLocation { character, location } => {
                rules::move_to_location(&mut ctx, player, *character, *location)
            }
            PlayerAction::Challenge { attacker, defender } => rules::challenge(&mut ctx, player, *attacker, *defender)?,
            PlayerAction::PassTurn => {
                rules::pass_turn(&mut ctx)?;
                true
            }
        };

        self.state.record_action(ActionRecord::new(player, turn, action, succeeded));
        Ok(succeeded)
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("executor", &self.executor.is_some())
            .finish_non_exhaustive()
    }
}
