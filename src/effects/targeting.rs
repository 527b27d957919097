//! Target resolution.
//!
//! Turns a `TargetSpec` into concrete cards in play. Chosen targets come
//! from the invocation when the caller supplied one, otherwise from a
//! choice request to the acting player. Ward protects a card from being
//! chosen by opponents; area effects and challenges don't choose, so Ward
//! doesn't apply to them.

use log::debug;
use smallvec::SmallVec;

use super::effect::{Invocation, TargetSpec};
use crate::cards::{CardFilter, CardInstance, Keyword};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::GameState;
use crate::decisions::{choose_cards, ChoiceOption, ChoiceRequest};
use crate::rules::GameContext;

/// Can `actor` choose this card as a target?
#[must_use]
pub fn validate_target(card: &CardInstance, actor: PlayerId) -> bool {
    card.owner == actor || !(card.meta.has_ward || card.has_keyword(&Keyword::Ward))
}

/// Ids of cards in play matching a filter, in player order then play order.
#[must_use]
pub fn matching_in_play(
    state: &GameState,
    filter: &CardFilter,
    player: PlayerId,
    source: Option<InstanceId>,
) -> SmallVec<[InstanceId; 4]> {
    state
        .cards_in_play()
        .filter(|card| filter.matches(card, player, source))
        .map(|card| card.instance_id)
        .collect()
}

/// Resolve a `TargetSpec` to the cards it currently names.
pub fn resolve_targets(
    ctx: &mut GameContext,
    spec: &TargetSpec,
    invocation: &Invocation,
    prompt: &str,
) -> SmallVec<[InstanceId; 4]> {
    let state = &*ctx.state;
    match spec {
        TargetSpec::Source => invocation.source.filter(|id| state.in_play(*id).is_some()).into_iter().collect(),
        TargetSpec::Resolved(id) => state.in_play(*id).map(|c| c.instance_id).into_iter().collect(),
        TargetSpec::All(filter) => matching_in_play(state, filter, invocation.player, invocation.source),
        TargetSpec::Chosen(filter) => choose_target(ctx, filter, invocation, prompt).into_iter().collect(),
    }
}

/// The first card a `TargetSpec` names, if any.
pub fn resolve_single(
    ctx: &mut GameContext,
    spec: &TargetSpec,
    invocation: &Invocation,
    prompt: &str,
) -> Option<InstanceId> {
    resolve_targets(ctx, spec, invocation, prompt).first().copied()
}

fn choose_target(
    ctx: &mut GameContext,
    filter: &CardFilter,
    invocation: &Invocation,
    prompt: &str,
) -> Option<InstanceId> {
    let state = &*ctx.state;
    let player = invocation.player;

    if let Some(target) = invocation.target {
        let valid = state
            .in_play(target)
            .is_some_and(|card| filter.matches(card, player, invocation.source) && validate_target(card, player));
        if !valid {
            debug!("{}: {} is not a valid target for {}", prompt, target, player);
            return None;
        }
        return Some(target);
    }

    let options: Vec<ChoiceOption> = state
        .cards_in_play()
        .filter(|card| filter.matches(card, player, invocation.source))
        .map(|card| {
            let option = ChoiceOption::card(card.instance_id, &card.name);
            if validate_target(card, player) {
                option
            } else {
                option.invalid()
            }
        })
        .collect();
    if options.is_empty() {
        return None;
    }

    let request = ChoiceRequest::pick_one(player, prompt, options).with_source(invocation.source);
    choose_cards(ctx.decisions, ctx.state, &request).first().copied()
}
