//! Banishment and the state checks run after every action.

use log::{debug, info};

use super::ability::fire_triggers;
use super::context::GameContext;
use crate::cards::{CardType, Zone};
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::{EngineError, GameState};
use crate::effects::TriggerKind;
use crate::triggers::{EventKind, GameEvent};

const LOG_TARGET: &str = "lore_engine::action";

/// Banish a card in play: discard it, announce it, resolve its
/// banish triggers.
pub fn banish(ctx: &mut GameContext, id: InstanceId) -> Result<(), EngineError> {
    let Some((owner, name)) = ctx.state.in_play(id).map(|c| (c.owner, c.name.clone())) else {
        debug!("{} is not in play, can't be banished", id);
        return Ok(());
    };

    ctx.state.move_card(id, Zone::Discard);
    info!(target: LOG_TARGET, "{} ({}) is banished", name, id);

    let event = GameEvent::new(EventKind::CardBanished, owner).with_source(id);
    ctx.events.emit(ctx.state, &event);
    fire_triggers(ctx, id, TriggerKind::OnBanish, None)
}

/// Characters and locations whose damage has reached their willpower.
fn lethally_damaged(state: &GameState) -> Vec<InstanceId> {
    state
        .cards_in_play()
        .filter(|c| matches!(c.card_type, CardType::Character | CardType::Location))
        .filter(|c| c.damage > 0 && i64::from(c.damage) >= i64::from(c.willpower))
        .map(|c| c.instance_id)
        .collect()
}

/// Reconcile, banish until nothing is lethally damaged, then check for a winner.
pub(crate) fn settle(ctx: &mut GameContext) -> Result<(), EngineError> {
    ctx.depth += 1;
    let result = banish_lethal(ctx);
    ctx.depth -= 1;
    result?;

    continuous::recalculate(ctx.state);
    check_winner(ctx.state);
    Ok(())
}

fn banish_lethal(ctx: &mut GameContext) -> Result<(), EngineError> {
    loop {
        continuous::recalculate(ctx.state);
        let lethal = lethally_damaged(ctx.state);
        if lethal.is_empty() {
            return Ok(());
        }
        for id in lethal {
            banish(ctx, id)?;
        }
    }
}

/// Set the winner if a player has reached their lore goal. The active
/// player is checked first.
pub fn check_winner(state: &mut GameState) -> Option<PlayerId> {
    if state.winner.is_some() {
        return state.winner;
    }
    let first = state.active_player;
    let winner = std::iter::once(first)
        .chain(state.opponents(first))
        .find(|p| state.player(*p).lore >= state.player(*p).lore_goal);
    if let Some(player) = winner {
        info!(target: LOG_TARGET, "{} wins with {} lore", player, state.player(player).lore);
        state.winner = Some(player);
    }
    winner
}
