//! Player actions.
//!
//! A `PlayerAction` is one thing a player can ask the engine to do on
//! their turn. `Game::apply` dispatches it to the matching rules function
//! and appends an `ActionRecord` to the history.
//!
//! ```
//! use lore_engine::core::{InstanceId, PlayerAction};
//!
//! let quest = PlayerAction::Quest { card: InstanceId(5) };
//! assert_eq!(quest.name(), "quest");
//! assert_eq!(quest.cards().as_slice(), &[InstanceId(5)]);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::InstanceId;
use super::player::PlayerId;

/// An action a player takes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Put a card from hand into the inkwell.
    Ink { card: InstanceId },
    Quest { card: InstanceId },
    /// Play a card from hand, optionally aiming its on-play effects.
    PlayCard { card: InstanceId, target: Option<InstanceId> },
    UseAbility {
        card: InstanceId,
        index: usize,
        target: Option<InstanceId>,
    },
    SingSong { singer: InstanceId, song: InstanceId },
    MoveToLocation { character: InstanceId, location: InstanceId },
    Challenge { attacker: InstanceId, defender: InstanceId },
    /// End the turn.
    PassTurn,
}

impl PlayerAction {
    /// Short name used in log records.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ink { .. } => "ink",
            Self::Quest { .. } => "quest",
            Self::PlayCard { .. } => "play_card",
            Self::UseAbility { .. } => "use_ability",
            Self::SingSong { .. } => "sing_song",
            Self::MoveToLocation { .. } => "move_to_location",
            Self::Challenge { .. } => "challenge",
            Self::PassTurn => "pass_turn",
        }
    }

    /// Cards the action refers to, in order.
    #[must_use]
    pub fn cards(&self) -> SmallVec<[InstanceId; 3]> {
        let mut cards = SmallVec::new();
        match self {
            Self::Ink { card } | Self::Quest { card } => cards.push(*card),
            Self::PlayCard { card, target } | Self::UseAbility { card, target, .. } => {
                cards.push(*card);
                cards.extend(*target);
            }
            Self::SingSong { singer, song } => cards.extend([*singer, *song]),
            Self::MoveToLocation { character, location } => cards.extend([*character, *location]),
            Self::Challenge { attacker, defender } => cards.extend([*attacker, *defender]),
            Self::PassTurn => {}
        }
        cards
    }
}

/// An action taken, with who took it, when, and whether it did anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub turn: u32,
    pub action: PlayerAction,
    pub succeeded: bool,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, turn: u32, action: PlayerAction, succeeded: bool) -> Self {
        Self {
            player,
            turn,
            action,
            succeeded,
        }
    }
}
