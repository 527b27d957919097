//! Questing.
//!
//! The quest event is awaited before lore is counted, so anything that
//! happens "whenever this character quests" is already applied when the
//! character's lore is read.

use log::{debug, info};

use super::ability::fire_triggers;
use super::context::GameContext;
use crate::cards::{CardType, Keyword};
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::EngineError;
use crate::decisions::{choose_cards, ChoiceOption, ChoiceRequest};
use crate::effects::{Restriction, TriggerKind};
use crate::triggers::GameEvent;

const LOG_TARGET: &str = "lore_engine::action";

/// Quest with one of `player`'s characters.
pub fn quest(ctx: &mut GameContext, player: PlayerId, card_id: InstanceId) -> Result<bool, EngineError> {
    let state = &*ctx.state;
    let Some(card) = state.in_play(card_id) else {
        debug!("{} is not in play", card_id);
        return Ok(false);
    };
    if card.owner != player || card.card_type != CardType::Character {
        debug!("{} can't quest with {}", player, card.name);
        return Ok(false);
    }
    if !card.ready {
        debug!("{} is exerted", card.name);
        return Ok(false);
    }
    if card.meta.has_reckless || card.has_keyword(&Keyword::Reckless) {
        debug!("{} is reckless and can't quest", card.name);
        return Ok(false);
    }
    if state.card_restricted(card_id, Restriction::CantQuest) {
        debug!("{} can't quest", card.name);
        return Ok(false);
    }
    if card.is_drying(state.turn_number) {
        debug!("{} is drying", card.name);
        return Ok(false);
    }
    let support = card.has_keyword(&Keyword::Support);
    let name = card.name.clone();

    if let Some(card) = ctx.state.card_mut(card_id) {
        card.ready = false;
    }
    ctx.events.notify(ctx.state, &GameEvent::exerted(player, card_id));
    ctx.events.emit(ctx.state, &GameEvent::quested(player, card_id));

    continuous::recalculate(ctx.state);
    let lore = ctx.state.in_play(card_id).map_or(0, |c| c.lore.max(0) as u32);
    ctx.state.player_mut(player).lore += lore;
    info!(target: LOG_TARGET, "{} quests with {} for {} lore", player, name, lore);
    ctx.events.emit(ctx.state, &GameEvent::lore_gained(player, Some(card_id), lore));

    if support {
        lend_strength(ctx, player, card_id);
    }
    fire_triggers(ctx, card_id, TriggerKind::OnQuest, None)?;
    ctx.settle()?;
    Ok(true)
}

/// Support: add the quester's strength to another of the player's
/// characters for the rest of the turn.
fn lend_strength(ctx: &mut GameContext, player: PlayerId, supporter: InstanceId) {
    let Some(strength) = ctx.state.in_play(supporter).map(|c| c.strength) else {
        return;
    };
    let options: Vec<ChoiceOption> = ctx
        .state
        .player(player)
        .characters()
        .filter(|c| c.instance_id != supporter)
        .map(|c| ChoiceOption::card(c.instance_id, &c.name))
        .collect();
    if options.is_empty() || strength <= 0 {
        return;
    }

    let request = ChoiceRequest::pick_one(player, "Choose a character to support", options)
        .with_bounds(0, 1)
        .with_source(Some(supporter));
    let Some(ally) = choose_cards(ctx.decisions, ctx.state, &request).first().copied() else {
        return;
    };
    if let Some(card) = ctx.state.card_mut(ally) {
        card.meta.temporary_strength += strength;
        info!(target: LOG_TARGET, "{} supports {} with {} strength", supporter, card.name, strength);
    }
    continuous::recalculate(ctx.state);
}
