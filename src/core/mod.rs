//! Core engine types: ids, players, state, actions, RNG, configuration, errors.
//!
//! These are the building blocks every other module works on. Games
//! configure them via `EngineConfig` rather than modifying the core.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;
pub mod action;
pub mod state;

pub use entity::{EffectId, InstanceId};
pub use player::{CostReduction, PlayerId, PlayerMap, PlayerState};
pub use rng::{GameRng, GameRngState};
pub use config::EngineConfig;
pub use error::EngineError;
pub use action::{ActionRecord, PlayerAction};
pub use state::{GameState, TurnEvent};
