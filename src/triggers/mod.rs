//! Conditions and lifecycle events.
//!
//! ## Key Components
//!
//! - [`Condition`]: A predicate over the game state, seen from a player and a source card
//! - [`ConditionEvaluator`]: Evaluates conditions
//! - [`GameEvent`]: Something that happened, announced by an action
//! - [`EventBus`]: Where events go; awaited events finish before the action continues
//!
//! ## Example Usage
//!
//! ```
//! use lore_engine::core::{EngineConfig, GameState, PlayerId};
//! use lore_engine::triggers::{Comparison, Condition, ConditionContext, ConditionEvaluator};
//!
//! let state = GameState::new(EngineConfig::new(2), 42);
//! let ctx = ConditionContext::new(&state, PlayerId::new(0), None);
//!
//! let empty_hand = Condition::HandSize { comparison: Comparison::AtMost, value: 0 };
//! assert!(ConditionEvaluator::evaluate(&empty_hand, &ctx));
//! assert!(ConditionEvaluator::evaluate(&Condition::IsYourTurn, &ctx));
//! ```

mod bus;
mod condition;
mod event;

pub use bus::{EventBus, EventLog, NullEventBus};
pub use condition::{Comparison, Condition, ConditionContext, ConditionEvaluator};
pub use event::{EventKind, GameEvent};
