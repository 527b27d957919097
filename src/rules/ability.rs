//! Activated abilities and triggers.
//!
//! ## Using an ability
//!
//! 1. The ability must be activated, or a start-of-turn ability used on
//!    its owner's turn.
//! 2. It must not have been used this turn. Boost abilities share one
//!    use marker however many a card has.
//! 3. Every cost is validated before any is paid, then paid in the order
//!    exert, ink, discard, banish self.

use log::{debug, info};

use super::banish::banish;
use super::context::GameContext;
use crate::cards::{AbilityUseKey, Zone};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::EngineError;
use crate::decisions::{choose_cards, ChoiceOption, ChoiceRequest};
use crate::effects::{AbilityKind, Cost, Effect, EffectResolver, Invocation, TriggerKind};
use crate::triggers::{ConditionContext, ConditionEvaluator, EventKind, GameEvent};

const LOG_TARGET: &str = "lore_engine::action";

pub(super) fn invocation(player: PlayerId, source: InstanceId, target: Option<InstanceId>) -> Invocation {
    let invocation = Invocation::new(player).from_source(source);
    match target {
        Some(target) => invocation.targeting(target),
        None => invocation,
    }
}

/// Use the ability at `index` on one of `player`'s cards in play.
///
/// Returns `Ok(false)` without changing anything if the ability can't be
/// used or its costs can't be paid.
pub fn use_ability(
    ctx: &mut GameContext,
    player: PlayerId,
    card_id: InstanceId,
    index: usize,
    target: Option<InstanceId>,
) -> Result<bool, EngineError> {
    let state = &*ctx.state;
    let Some(card) = state.in_play(card_id) else {
        debug!("{} is not in play", card_id);
        return Ok(false);
    };
    if card.owner != player {
        debug!("{} doesn't control {}", player, card.name);
        return Ok(false);
    }
    let Some(ability) = card.abilities.get(index) else {
        debug!("{} has no ability {}", card.name, index);
        return Ok(false);
    };

    let (mut costs, effect) = match &ability.kind {
        AbilityKind::Activated { costs, effect } => (costs.clone(), effect.clone()),
        AbilityKind::Triggered {
            trigger: TriggerKind::OnStartTurn,
            effect,
        } if state.active_player == player => (Vec::new(), effect.clone()),
        _ => {
            debug!("ability {} of {} can't be activated", index, card.name);
            return Ok(false);
        }
    };
    costs.sort_by_key(Cost::payment_order);

    let key = if ability.is_boost() {
        AbilityUseKey::Boost
    } else {
        AbilityUseKey::Index(index)
    };
    if card.meta.used_abilities.contains(&key) {
        debug!("{} already used {:?} this turn", card.name, key);
        return Ok(false);
    }
    let conditions = ConditionContext::new(state, player, Some(card_id));
    if !ConditionEvaluator::holds(ability.condition.as_ref(), &conditions) {
        debug!("condition of ability {} on {} doesn't hold", index, card.name);
        return Ok(false);
    }

    // === Validate ===
    let ink: u32 = costs
        .iter()
        .map(|c| match c {
            Cost::Ink(n) => *n,
            _ => 0,
        })
        .sum();
    let discard: u32 = costs
        .iter()
        .map(|c| match c {
            Cost::Discard(n) => *n,
            _ => 0,
        })
        .sum();
    if costs.contains(&Cost::Exert) && (!card.ready || card.is_drying(state.turn_number)) {
        debug!("{} can't exert to pay for ability {}", card.name, index);
        return Ok(false);
    }
    if state.player(player).ready_ink() < ink {
        debug!("{} lacks {} ink for {}", player, ink, card.name);
        return Ok(false);
    }
    if (state.player(player).hand.len() as u32) < discard {
        debug!("{} can't discard {} cards", player, discard);
        return Ok(false);
    }
    let name = card.name.clone();

    // === Pay ===
    if let Some(card) = ctx.state.card_mut(card_id) {
        card.meta.used_abilities.insert(key);
    }
    for cost in &costs {
        match cost {
            Cost::Exert => {
                if let Some(card) = ctx.state.card_mut(card_id) {
                    card.ready = false;
                }
                ctx.events.notify(ctx.state, &GameEvent::exerted(player, card_id));
            }
            Cost::Ink(n) => {
                ctx.state.player_mut(player).pay_ink(*n);
            }
            Cost::Discard(n) => discard_for_cost(ctx, player, card_id, *n),
            Cost::BanishSelf => banish(ctx, card_id)?,
        }
    }

    info!(target: LOG_TARGET, "{} uses ability {} of {}", player, index, name);
    let event = GameEvent::new(EventKind::AbilityActivated, player)
        .with_source(card_id)
        .with_value(index as i64);
    ctx.events.emit(ctx.state, &event);

    EffectResolver::resolve(ctx, &effect, &invocation(player, card_id, target))?;
    ctx.settle()?;
    Ok(true)
}

fn discard_for_cost(ctx: &mut GameContext, player: PlayerId, source: InstanceId, count: u32) {
    let options = ctx
        .state
        .player(player)
        .hand
        .iter()
        .map(|c| ChoiceOption::card(c.instance_id, &c.name))
        .collect();
    let count = count as usize;
    let request = ChoiceRequest::pick_one(player, format!("Choose {} cards to discard", count), options)
        .with_bounds(count, count)
        .with_source(Some(source));
    for id in choose_cards(ctx.decisions, ctx.state, &request) {
        ctx.state.move_card(id, Zone::Discard);
    }
}

/// Resolve every ability of `card_id` with this trigger whose condition holds.
///
/// The card may be anywhere; banish triggers resolve from the discard pile.
pub fn fire_triggers(
    ctx: &mut GameContext,
    card_id: InstanceId,
    trigger: TriggerKind,
    target: Option<InstanceId>,
) -> Result<(), EngineError> {
    let Some(card) = ctx.state.find_card(card_id) else {
        return Ok(());
    };
    let owner = card.owner;
    let conditions = ConditionContext::new(ctx.state, owner, Some(card_id));
    let fired: Vec<(usize, Effect)> = card
        .abilities
        .iter()
        .enumerate()
        .filter(|(_, a)| a.trigger() == Some(trigger))
        .filter(|(_, a)| ConditionEvaluator::holds(a.condition.as_ref(), &conditions))
        .filter_map(|(i, a)| a.effect().map(|e| (i, e.clone())))
        .collect();

    for (index, effect) in fired {
        if let Some(card) = ctx.state.card_mut(card_id) {
            card.meta.triggered_this_turn.insert(index);
            if trigger == TriggerKind::OnStartTurn {
                card.meta.used_abilities.insert(AbilityUseKey::Index(index));
            }
        }
        info!(target: LOG_TARGET, "{} triggers {:?} ability {}", card_id, trigger, index);
        EffectResolver::resolve(ctx, &effect, &invocation(owner, card_id, target))?;
    }
    Ok(())
}
