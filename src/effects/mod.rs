//! Effect system for card abilities.
//!
//! - `Ability`: one parsed entry of a card's rules text
//! - `Effect`: an instantaneous effect, as an exhaustive enum
//! - `ActiveEffect`: a continuous effect record, read by reconciliation
//! - `TargetSpec`: how an effect selects cards
//! - `EffectResolver`: executes effects on game state
//!
//! Card data arrives as JSON effect descriptors (`ast`) and is converted
//! into the typed model once, when the card is loaded.

pub mod ast;
mod ability;
mod active;
mod effect;
mod resolver;
pub mod targeting;

pub use ability::{Ability, AbilityKind, Cost, LegacyStatic, StaticEffect, StaticTarget, TriggerKind};
pub use active::{ActiveEffect, ComputedBuff, Duration, EffectKind, EffectTarget, Modification, Restriction};
pub use effect::{Amount, Effect, EffectPayload, Invocation, PlayerTarget, TargetSpec, TypedEffect};
pub use resolver::EffectResolver;
pub(crate) use resolver::apply_damage;
pub use targeting::validate_target;
