//! Pending changes collected while the state is borrowed immutably.

use crate::cards::{Keyword, Stat};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::GameState;
use crate::effects::ActiveEffect;

/// One change to derived state.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum Change {
    Stat { card: InstanceId, stat: Stat, delta: i32 },
    Keyword { card: InstanceId, keyword: Keyword },
    Resist { card: InstanceId, amount: u32 },
    LoreGoal { player: PlayerId, delta: i32 },
    /// A new while-active effect.
    Push(ActiveEffect),
}

impl Change {
    pub(super) fn stat(card: InstanceId, stat: Stat, delta: i32) -> Self {
        Self::Stat { card, stat, delta }
    }

    pub(super) fn keyword(card: InstanceId, keyword: Keyword) -> Self {
        Self::Keyword { card, keyword }
    }
}

/// Apply changes in order. Changes to cards no longer in the game are dropped.
pub(super) fn apply(state: &mut GameState, changes: Vec<Change>) {
    for change in changes {
        match change {
            Change::Stat { card, stat, delta } => {
                if let Some(card) = state.card_mut(card) {
                    card.modify_stat(stat, delta);
                }
            }
            Change::Keyword { card, keyword } => {
                if let Some(card) = state.card_mut(card) {
                    card.grant_keyword(keyword);
                }
            }
            Change::Resist { card, amount } => {
                if let Some(card) = state.card_mut(card) {
                    card.meta.resist += amount;
                }
            }
            Change::LoreGoal { player, delta } => {
                let player = state.player_mut(player);
                player.lore_goal = player.lore_goal.saturating_add_signed(delta);
            }
            Change::Push(effect) => {
                state.add_effect(effect);
            }
        }
    }
}
