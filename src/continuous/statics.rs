//! Static abilities of one card, turned into pending changes.

use smallvec::SmallVec;

use super::change::Change;
use crate::cards::{CardInstance, CardType, Stat};
use crate::core::entity::{EffectId, InstanceId};
use crate::core::GameState;
use crate::effects::targeting::matching_in_play;
use crate::effects::{
    ActiveEffect, ComputedBuff, Duration, EffectTarget, LegacyStatic, Modification, Restriction, StaticEffect,
    StaticTarget,
};
use crate::triggers::{ConditionContext, ConditionEvaluator};

/// Changes made by a card's static abilities, in printed order.
pub(super) fn collect(state: &GameState, card: &CardInstance) -> Vec<Change> {
    let id = card.instance_id;
    let ctx = ConditionContext::new(state, card.owner, Some(id));
    let mut changes = Vec::new();

    for ability in card.abilities.iter().filter(|a| a.is_static()) {
        if !ConditionEvaluator::holds(ability.condition.as_ref(), &ctx) {
            continue;
        }
        for effect in ability.static_effects() {
            match effect {
                StaticEffect::Resist(amount) => changes.push(Change::Resist { card: id, amount: *amount }),
                StaticEffect::Modify {
                    stat,
                    amount,
                    target,
                    condition,
                } => {
                    if !ConditionEvaluator::holds(condition.as_ref(), &ctx) {
                        continue;
                    }
                    let delta = amount.evaluate(state, card.owner, Some(id));
                    for target in targets(state, card, target) {
                        changes.push(Change::stat(target, *stat, delta));
                    }
                }
                StaticEffect::GrantKeyword {
                    keyword,
                    target,
                    condition,
                } => {
                    if !ConditionEvaluator::holds(condition.as_ref(), &ctx) {
                        continue;
                    }
                    for target in targets(state, card, target) {
                        changes.push(Change::keyword(target, keyword.clone()));
                    }
                }
                StaticEffect::Legacy(legacy) => legacy_changes(state, card, &ctx, legacy, &mut changes),
            }
        }
    }
    changes
}

fn targets(state: &GameState, card: &CardInstance, target: &StaticTarget) -> SmallVec<[InstanceId; 4]> {
    match target {
        StaticTarget::SelfOnly => std::iter::once(card.instance_id).collect(),
        StaticTarget::Cards(filter) => matching_in_play(state, filter, card.owner, Some(card.instance_id)),
    }
}

fn while_active(card: &CardInstance, target: EffectTarget, modification: Modification) -> Change {
    Change::Push(ActiveEffect::modification(
        EffectId(0),
        card.owner,
        Some(card.instance_id),
        target,
        Duration::WhileActive,
        modification,
    ))
}

fn while_active_restriction(card: &CardInstance, target: EffectTarget, restriction: Restriction) -> Change {
    Change::Push(ActiveEffect::restriction(
        EffectId(0),
        card.owner,
        Some(card.instance_id),
        target,
        Duration::WhileActive,
        restriction,
    ))
}

fn legacy_changes(
    state: &GameState,
    card: &CardInstance,
    ctx: &ConditionContext,
    legacy: &LegacyStatic,
    changes: &mut Vec<Change>,
) {
    let id = card.instance_id;
    let owner = card.owner;
    match legacy {
        // === Promoted to while-active records ===
        LegacyStatic::CantPlaySongs { players } => {
            let players = players.resolve(state, owner).into_iter().collect();
            changes.push(while_active_restriction(card, EffectTarget::Players(players), Restriction::CantPlaySongs));
        }
        LegacyStatic::CantChallenge { target } => {
            let target = match target {
                StaticTarget::SelfOnly => EffectTarget::card(id),
                StaticTarget::Cards(filter) => EffectTarget::Scope(filter.clone()),
            };
            changes.push(while_active_restriction(card, target, Restriction::CantChallenge));
        }
        LegacyStatic::ConditionalCantReady { condition } => {
            if ConditionEvaluator::evaluate(condition, ctx) {
                changes.push(while_active_restriction(card, EffectTarget::card(id), Restriction::CantReady));
            }
        }
        LegacyStatic::ReduceCost { amount, filter } => changes.push(while_active(
            card,
            EffectTarget::player(owner),
            Modification::CostReduction {
                amount: *amount,
                filter: filter.clone(),
            },
        )),
        LegacyStatic::ReduceMoveCost { amount } => changes.push(while_active(
            card,
            EffectTarget::player(owner),
            Modification::MoveCostReduction { amount: *amount },
        )),
        LegacyStatic::BuffSubtype { filter, stat, amount } => changes.push(while_active(
            card,
            EffectTarget::Scope(filter.clone()),
            Modification::Computed(ComputedBuff::BuffSubtype {
                filter: filter.clone(),
                stat: *stat,
                amount: *amount,
            }),
        )),
        LegacyStatic::ConditionalLoreBonus { condition, amount } => changes.push(while_active(
            card,
            EffectTarget::card(id),
            Modification::Computed(ComputedBuff::ConditionalLoreBonus {
                condition: condition.clone(),
                amount: *amount,
            }),
        )),
        LegacyStatic::LorePerOpposingDamaged { amount } => changes.push(while_active(
            card,
            EffectTarget::card(id),
            Modification::Computed(ComputedBuff::LorePerOpposingDamaged { amount: *amount }),
        )),

        // === Applied immediately ===
        LegacyStatic::BuffAllCharacters { filter, stat, amount } => {
            for target in matching_in_play(state, filter, owner, Some(id)) {
                changes.push(Change::stat(target, *stat, *amount));
            }
        }
        LegacyStatic::ConditionalStatBuff { condition, stat, amount } => {
            if ConditionEvaluator::evaluate(condition, ctx) {
                changes.push(Change::stat(id, *stat, *amount));
            }
        }
        LegacyStatic::GrantKeywordToOthers { keyword, filter } => {
            for target in matching_in_play(state, filter, owner, Some(id)) {
                changes.push(Change::keyword(target, keyword.clone()));
            }
        }
        LegacyStatic::ConditionalGrantKeywords { condition, keywords } => {
            if ConditionEvaluator::evaluate(condition, ctx) {
                changes.extend(keywords.iter().map(|k| Change::keyword(id, k.clone())));
            }
        }
        LegacyStatic::DynamicStatPerCount { stat, amount } => {
            changes.push(Change::stat(id, *stat, amount.evaluate(state, owner, Some(id))));
        }
        LegacyStatic::ModifyLoreGoal { amount, players } => {
            for player in players.resolve(state, owner) {
                changes.push(Change::LoreGoal { player, delta: *amount });
            }
        }
    }
}

/// Changes made by one computed modification.
pub(super) fn computed_changes(state: &GameState, effect: &ActiveEffect, buff: &ComputedBuff) -> Vec<Change> {
    let targets = state.effect_targets(effect);
    match buff {
        ComputedBuff::Strength { amount } => {
            let delta = amount.evaluate(state, effect.controller, effect.source);
            targets.into_iter().map(|t| Change::stat(t, Stat::Strength, delta)).collect()
        }
        ComputedBuff::BuffSubtype { filter, stat, amount } => targets
            .into_iter()
            .filter(|t| {
                state
                    .in_play(*t)
                    .is_some_and(|card| filter.matches(card, effect.controller, effect.source))
            })
            .map(|t| Change::stat(t, *stat, *amount))
            .collect(),
        ComputedBuff::ConditionalLoreBonus { condition, amount } => {
            let ctx = ConditionContext::new(state, effect.controller, effect.source);
            if !ConditionEvaluator::evaluate(condition, &ctx) {
                return Vec::new();
            }
            targets.into_iter().map(|t| Change::stat(t, Stat::Lore, *amount)).collect()
        }
        ComputedBuff::LorePerOpposingDamaged { amount } => {
            let damaged = state
                .cards_in_play()
                .filter(|c| c.owner != effect.controller && c.card_type == CardType::Character)
                .filter(|c| c.is_damaged())
                .count() as i32;
            targets
                .into_iter()
                .map(|t| Change::stat(t, Stat::Lore, amount * damaged))
                .collect()
        }
    }
}
