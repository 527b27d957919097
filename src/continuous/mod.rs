//! Continuous-effect reconciliation.
//!
//! Continuous abilities can't be tracked incrementally: their conditions
//! (a named card in play, a stat threshold, a card under a character) flip
//! after unrelated changes. `recalculate` therefore rebuilds every derived
//! value from scratch:
//!
//! 1. **Reset**: drop while-active effects, reset lore goals, copy base
//!    stats and keywords into the derived fields.
//! 2. **Apply**: per card in play order, apply durational modifications,
//!    static Resist, generic static modifications and legacy static forms.
//!    Some legacy forms are promoted into new while-active records.
//! 3. **Sweep**: apply computed modifications, then while-active ones.
//! 4. **Finalize**: total Resist and derive the Ward and Reckless flags.
//!
//! The pass is idempotent: running it twice yields identical snapshots.
//!
//! ```
//! use lore_engine::cards::{CardInstance, Zone};
//! use lore_engine::continuous::recalculate;
//! use lore_engine::core::{EngineConfig, GameState, InstanceId, PlayerId};
//!
//! let mut state = GameState::new(EngineConfig::new(2), 1);
//! let hero = CardInstance::character(InstanceId(1), PlayerId::new(0), "Hero", 2, 2, 3, 1)
//!     .with_keyword("Resist +2");
//! state.put_into(hero, Zone::Play);
//!
//! recalculate(&mut state);
//! assert_eq!(state.find_card(InstanceId(1)).unwrap().meta.resist, 2);
//! ```

mod change;
mod reconcile;
mod statics;

pub use reconcile::recalculate;
