//! # lore-engine
//!
//! Rules engine for an ink-and-lore trading card game.
//!
//! Cards describe their abilities declaratively. The engine decides what
//! the board legally looks like at any instant and what happens when a
//! player acts.
//!
//! ## Design Principles
//!
//! 1. **Rebuild, don't track**: continuous effects are re-derived from base
//!    values after every change (`continuous::recalculate`). Derived stats
//!    are never patched incrementally.
//!
//! 2. **Explicit context**: every rule and effect handler receives a
//!    `GameContext` holding the state and its collaborators. There is no
//!    global game, so any number of games can run side by side.
//!
//! 3. **Typed at the boundary**: ability descriptors arrive as JSON in two
//!    historical shapes and are converted once, when cards are loaded.
//!
//! ## Modules
//!
//! - `core`: ids, players, game state, actions, RNG, configuration, errors
//! - `cards`: card definitions, instances, keywords, filters, the registry
//! - `effects`: the ability and effect model, and the effect resolver
//! - `triggers`: conditions, lifecycle events and the event bus
//! - `decisions`: the choice protocol
//! - `continuous`: continuous-effect reconciliation
//! - `rules`: player actions and the turn cycle
//! - `game`: a game bundled with its collaborators, and setup

pub mod core;
pub mod cards;
pub mod effects;
pub mod triggers;
pub mod decisions;
pub mod continuous;
pub mod rules;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    EffectId, InstanceId, PlayerId, PlayerMap, PlayerState,
    GameRng, EngineConfig, EngineError,
    PlayerAction, ActionRecord,
    GameState, TurnEvent,
};

pub use crate::cards::{CardDefinition, CardFilter, CardId, CardInstance, CardRegistry, CardType, Keyword, Zone};

pub use crate::effects::{Ability, ActiveEffect, Duration, Effect, EffectResolver, Invocation, TargetSpec};

pub use crate::triggers::{Condition, ConditionContext, ConditionEvaluator, EventBus, EventKind, EventLog, GameEvent};

pub use crate::decisions::{ChoiceRequest, ChoiceResponse, DecisionMaker, NoDecisions, ScriptedDecisions};

pub use crate::rules::{AbilityExecutor, GameContext};

pub use crate::game::{Game, GameBuilder};
