//! Game actions.
//!
//! Each action runs the same pipeline:
//! - Validate against the current state
//! - Pay costs
//! - Change the board and exert
//! - Emit lifecycle events
//! - Resolve ability effects
//! - Settle: reconcile, banish, check for a winner
//!
//! A rule violation changes nothing and reports `false`. Errors are
//! reserved for failures inside effect resolution.

mod ability;
mod banish;
mod challenge;
mod context;
mod ink;
mod movement;
mod play;
mod quest;
mod sing;
mod turn;

pub use ability::{fire_triggers, use_ability};
pub use banish::{banish, check_winner};
pub use challenge::challenge;
pub use context::{AbilityExecutor, GameContext};
pub use ink::ink;
pub use movement::{move_cost, move_to_location};
pub use play::{is_playable, play_card, play_cost, PlayCost};
pub use quest::quest;
pub use sing::{sing_song, singer_value, song_requirement};
pub use turn::{end_turn, pass_turn, start_turn};
