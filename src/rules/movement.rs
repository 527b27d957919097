//! Moving characters to locations.

use log::{debug, info};

use super::context::GameContext;
use crate::cards::CardType;
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::GameState;
use crate::effects::Modification;
use crate::triggers::{EventKind, GameEvent};

/// Ink `player` pays to move a character to `location`.
#[must_use]
pub fn move_cost(state: &GameState, player: PlayerId, location: InstanceId) -> u32 {
    let printed = state.in_play(location).and_then(|c| c.move_cost).unwrap_or(0);
    state
        .active_effects
        .iter()
        .filter(|e| e.target.includes_player(player))
        .filter_map(|e| match e.as_modification() {
            Some(Modification::MoveCostReduction { amount }) => Some(*amount),
            _ => None,
        })
        .fold(printed, u32::saturating_sub)
}

/// Move one of `player`'s characters to one of their locations.
pub fn move_to_location(ctx: &mut GameContext, player: PlayerId, character: InstanceId, location: InstanceId) -> bool {
    let state = &*ctx.state;
    let Some(mover) = state.in_play(character).filter(|c| c.owner == player) else {
        debug!("{} has no {} in play", player, character);
        return false;
    };
    let Some(place) = state.in_play(location).filter(|c| c.owner == player) else {
        debug!("{} has no {} in play", player, location);
        return false;
    };
    if mover.card_type != CardType::Character || place.card_type != CardType::Location {
        debug!("{} can't move to {}", mover.name, place.name);
        return false;
    }
    if mover.location_id == Some(location) {
        debug!("{} is already at {}", mover.name, place.name);
        return false;
    }
    let cost = move_cost(state, player, location);
    let (who, place) = (mover.name.clone(), place.name.clone());

    if !ctx.state.player_mut(player).pay_ink(cost) {
        debug!("{} needs {} ink to move {}", player, cost, who);
        return false;
    }
    if let Some(card) = ctx.state.card_mut(character) {
        card.location_id = Some(location);
    }
    info!(target: "lore_engine::action", "{} moves {} to {} for {} ink", player, who, place, cost);

    let event = GameEvent::new(EventKind::CardMoved, player)
        .with_source(character)
        .with_target(location);
    ctx.events.emit(ctx.state, &event);
    continuous::recalculate(ctx.state);
    true
}
