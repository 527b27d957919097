//! Effect resolution - executing effects on game state.
//!
//! `EffectResolver::resolve` is an exhaustive match over `Effect`. Area
//! targets fan out into one recursive call per card, re-targeted at that
//! card. Anything that lasts beyond the instant is pushed as an
//! `ActiveEffect` for reconciliation to apply.
//!
//! ## Errors
//!
//! The only error path is a typed effect whose executor fails. Everything
//! else that can't happen (no legal target, empty deck) is skipped and
//! logged.
//!
//! ## Settling
//!
//! The outermost `resolve` call reconciles, banishes cards with lethal
//! damage and checks for a winner before returning.

use log::{debug, error, info, warn};

use super::active::{ActiveEffect, ComputedBuff, Duration, EffectTarget, Modification, Restriction};
use super::effect::{Amount, Effect, Invocation, TargetSpec, TypedEffect};
use super::targeting::{matching_in_play, resolve_single};
use crate::cards::{CardFilter, Stat, Zone};
use crate::core::entity::{EffectId, InstanceId};
use crate::core::player::{CostReduction, PlayerId};
use crate::core::state::TurnEvent;
use crate::core::EngineError;
use crate::decisions::{choose_cards, choose_with, ChoiceOption, ChoiceRequest};
use crate::rules::{self, GameContext};
use crate::triggers::{ConditionContext, ConditionEvaluator, EventKind, GameEvent};

const LOG_TARGET: &str = "lore_engine::effect";

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve an effect for `invocation.player`.
    ///
    /// Nesting deeper than `config.max_effect_depth` is skipped with a warning.
    pub fn resolve(ctx: &mut GameContext, effect: &Effect, invocation: &Invocation) -> Result<(), EngineError> {
        let limit = ctx.state.config.max_effect_depth;
        if ctx.depth >= limit {
            warn!(target: LOG_TARGET, "`{}` nested deeper than {} effects, skipped", effect.name(), limit);
            return Ok(());
        }

        let top = ctx.is_top_level();
        ctx.depth += 1;
        let result = Self::dispatch(ctx, effect, invocation);
        ctx.depth -= 1;

        if top {
            let settled = ctx.settle();
            return result.and(settled);
        }
        result
    }

    fn dispatch(ctx: &mut GameContext, effect: &Effect, inv: &Invocation) -> Result<(), EngineError> {
        if let Some(TargetSpec::All(filter)) = effect.card_target() {
            let targets = matching_in_play(ctx.state, filter, inv.player, inv.source);
            debug!(target: LOG_TARGET, "`{}` applies to {} cards", effect.name(), targets.len());
            for id in targets {
                Self::resolve(ctx, &effect.retargeted(TargetSpec::Resolved(id)), &inv.retarget(id))?;
            }
            return Ok(());
        }

        match effect {
            // === Composite ===
            Effect::Sequence(effects) => {
                for effect in effects {
                    Self::resolve(ctx, effect, inv)?;
                }
                Ok(())
            }

            Effect::Typed(typed) => Self::typed(ctx, typed, inv),

            Effect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let holds = ConditionEvaluator::evaluate(condition, &ConditionContext::new(ctx.state, inv.player, inv.source));
                match (holds, otherwise) {
                    (true, _) => Self::resolve(ctx, then, inv),
                    (false, Some(otherwise)) => Self::resolve(ctx, otherwise, inv),
                    (false, None) => {
                        debug!(target: LOG_TARGET, "condition not met, nothing resolves");
                        Ok(())
                    }
                }
            }

            // === Players ===
            Effect::Draw { amount, players } => {
                for player in players.resolve(ctx.state, inv.player) {
                    let drawn = ctx.state.draw(player, *amount);
                    info!(target: LOG_TARGET, "{} draws {} cards", player, drawn.len());
                    for card in drawn {
                        let event = GameEvent::new(EventKind::CardDrawn, player).with_source(card);
                        ctx.events.notify(ctx.state, &event);
                    }
                }
                Ok(())
            }

            Effect::GainLore { amount, players } => {
                let gained = amount.evaluate_u32(ctx.state, inv.player, inv.source);
                for player in players.resolve(ctx.state, inv.player) {
                    ctx.state.player_mut(player).lore += gained;
                    info!(target: LOG_TARGET, "{} gains {} lore", player, gained);
                    let event = GameEvent::lore_gained(player, inv.source, gained);
                    ctx.events.emit(ctx.state, &event);
                }
                Ok(())
            }

            Effect::LoseLore { amount, players } => {
                for player in players.resolve(ctx.state, inv.player) {
                    let state = ctx.state.player_mut(player);
                    state.lore = state.lore.saturating_sub(*amount);
                    info!(target: LOG_TARGET, "{} loses {} lore", player, amount);
                }
                Ok(())
            }

            Effect::Discard { amount, players, random } => {
                for player in players.resolve(ctx.state, inv.player) {
                    Self::discard(ctx, player, *amount, *random, inv);
                }
                Ok(())
            }

            Effect::InkFromDeck { amount, exerted } => {
                for _ in 0..*amount {
                    let Some(top) = ctx.state.player(inv.player).deck.last().map(|c| c.instance_id) else {
                        debug!(target: LOG_TARGET, "{} has no deck left to ink from", inv.player);
                        break;
                    };
                    ctx.state.move_card(top, Zone::Inkwell);
                    if let Some(card) = ctx.state.card_mut(top) {
                        card.ready = !exerted;
                    }
                }
                info!(target: LOG_TARGET, "{} puts {} cards from deck into inkwell", inv.player, amount);
                Ok(())
            }

            Effect::ReduceNextCost { amount, filter } => {
                ctx.state.player_mut(inv.player).cost_reductions.push(CostReduction {
                    amount: *amount,
                    filter: filter.clone(),
                });
                info!(target: LOG_TARGET, "{} pays {} less for their next card", inv.player, amount);
                Ok(())
            }

            Effect::PlayFreeCard { filter } => Self::play_free(ctx, filter, inv),

            // === Cards ===
            Effect::Ready { target } => {
                let Some(id) = resolve_single(ctx, target, inv, "Choose a character to ready") else {
                    return Ok(());
                };
                Self::ready(ctx, id);
                Ok(())
            }

            Effect::Exert { target } => {
                let Some(id) = resolve_single(ctx, target, inv, "Choose a character to exert") else {
                    return Ok(());
                };
                if let Some(card) = ctx.state.card_mut(id) {
                    card.ready = false;
                    info!(target: LOG_TARGET, "{} is exerted", card.name);
                }
                ctx.events.notify(ctx.state, &GameEvent::exerted(inv.player, id));
                Ok(())
            }

            Effect::DealDamage { amount, target } => {
                let amount = amount.evaluate_u32(ctx.state, inv.player, inv.source);
                if let Some(id) = resolve_single(ctx, target, inv, "Choose a character to damage") {
                    apply_damage(ctx, id, amount, inv.player, inv.source);
                }
                Ok(())
            }

            Effect::Heal { amount, target } => {
                if let Some(id) = resolve_single(ctx, target, inv, "Choose a character to heal") {
                    if let Some(card) = ctx.state.card_mut(id) {
                        card.damage = card.damage.saturating_sub(*amount);
                        info!(target: LOG_TARGET, "{} heals {} damage", card.name, amount);
                    }
                }
                Ok(())
            }

            Effect::Banish { target, max_cost } => {
                let target = cost_limited(target, *max_cost);
                let Some(id) = resolve_single(ctx, &target, inv, "Choose a character to banish") else {
                    return Ok(());
                };
                let cost = ctx.state.find_card(id).map_or(0, |c| c.cost);
                if max_cost.is_some_and(|max| cost > max) {
                    debug!(target: LOG_TARGET, "{} costs more than {:?}, not banished", id, max_cost);
                    return Ok(());
                }
                rules::banish(ctx, id)
            }

            Effect::ReturnToHand { target } => {
                if let Some(id) = resolve_single(ctx, target, inv, "Choose a character to return") {
                    ctx.state.move_card(id, Zone::Hand);
                    info!(target: LOG_TARGET, "{} returns to its owner's hand", id);
                }
                Ok(())
            }

            Effect::MoveDamage { amount, from, to } => {
                // The caller's target is where the damage goes. The other end
                // comes from the payload, or is chosen.
                let from_inv = Invocation {
                    target: inv.payload.selected.first().copied(),
                    ..inv.clone()
                };
                let from = resolve_single(ctx, from, &from_inv, "Choose a character to move damage from");
                let to = resolve_single(ctx, to, inv, "Choose a character to move damage to");
                let (Some(from), Some(to)) = (from, to) else {
                    return Ok(());
                };
                if from == to {
                    return Ok(());
                }
                let moved = ctx.state.card_mut(from).map_or(0, |card| {
                    let moved = card.damage.min(*amount);
                    card.damage -= moved;
                    moved
                });
                if let Some(card) = ctx.state.card_mut(to) {
                    card.damage += moved;
                }
                info!(target: LOG_TARGET, "{} damage moved from {} to {}", moved, from, to);
                Ok(())
            }

            Effect::ReturnFromDiscard { filter, optional } => {
                let options: Vec<ChoiceOption> = ctx
                    .state
                    .player(inv.player)
                    .discard
                    .iter()
                    .filter(|card| filter.matches(card, inv.player, inv.source))
                    .map(|card| ChoiceOption::card(card.instance_id, &card.name))
                    .collect();
                if options.is_empty() {
                    return Ok(());
                }
                let request = ChoiceRequest::pick_one(inv.player, "Choose a card to return from your discard", options)
                    .with_bounds(usize::from(!optional), 1)
                    .with_source(inv.source);
                for id in choose_cards(ctx.decisions, ctx.state, &request) {
                    ctx.state.move_card(id, Zone::Hand);
                    info!(target: LOG_TARGET, "{} returns {} from discard to hand", inv.player, id);
                }
                Ok(())
            }

            Effect::Boost { amount } => {
                Self::boost(ctx, *amount, inv);
                Ok(())
            }

            Effect::ReadyCantQuest { target } => {
                let Some(id) = resolve_single(ctx, target, inv, "Choose a character to ready") else {
                    return Ok(());
                };
                Self::ready(ctx, id);
                ctx.state.add_effect(ActiveEffect::restriction(
                    EffectId(0),
                    inv.player,
                    inv.source,
                    EffectTarget::card(id),
                    Duration::UntilEndOfTurn,
                    Restriction::CantQuest,
                ));
                Ok(())
            }

            // === Durational ===
            Effect::GrantKeyword {
                keyword,
                target,
                duration,
            } => {
                if let Some(id) = resolve_single(ctx, target, inv, "Choose a character to gain a keyword") {
                    Self::push_modification(ctx, inv, EffectTarget::card(id), duration, Modification::Keyword(keyword.clone()));
                    info!(target: LOG_TARGET, "{} gains {} ({:?})", id, keyword, duration);
                }
                Ok(())
            }

            Effect::StatBuff {
                stat,
                amount,
                target,
                duration,
            } => {
                let Some(id) = resolve_single(ctx, target, inv, "Choose a character to modify") else {
                    return Ok(());
                };
                let modification = match (stat, amount) {
                    (Stat::Strength, Amount::Count { .. }) => Modification::Computed(ComputedBuff::Strength {
                        amount: amount.clone(),
                    }),
                    _ => Modification::Stat {
                        stat: *stat,
                        delta: amount.evaluate(ctx.state, inv.player, inv.source),
                    },
                };
                info!(target: LOG_TARGET, "{} gets {:?} ({:?})", id, modification, duration);
                Self::push_modification(ctx, inv, EffectTarget::card(id), duration, modification);
                Ok(())
            }

            Effect::Restrict {
                restriction,
                target,
                duration,
            } => {
                if let Some(id) = resolve_single(ctx, target, inv, "Choose a character to restrict") {
                    ctx.state.add_effect(ActiveEffect::restriction(
                        EffectId(0),
                        inv.player,
                        inv.source,
                        EffectTarget::card(id),
                        duration.clone(),
                        *restriction,
                    ));
                    info!(target: LOG_TARGET, "{} gets {:?} ({:?})", id, restriction, duration);
                }
                Ok(())
            }

            Effect::RestrictPlayers {
                restriction,
                players,
                duration,
            } => {
                let players = players.resolve(ctx.state, inv.player).into_iter().collect();
                ctx.state.add_effect(ActiveEffect::restriction(
                    EffectId(0),
                    inv.player,
                    inv.source,
                    EffectTarget::Players(players),
                    duration.clone(),
                    *restriction,
                ));
                info!(target: LOG_TARGET, "{:?} applied to players ({:?})", restriction, duration);
                Ok(())
            }

            Effect::SingRequirement { .. } => Ok(()),
        }
    }

    fn typed(ctx: &mut GameContext, typed: &TypedEffect, inv: &Invocation) -> Result<(), EngineError> {
        if let Some(executor) = &mut ctx.executor {
            info!(target: LOG_TARGET, "executing `{}` for {}", typed.kind, inv.player);
            return executor.execute(ctx.state, ctx.decisions, typed, inv).map_err(|err| {
                error!(target: LOG_TARGET, "`{}` failed: {}", typed.kind, err);
                err
            });
        }

        match &typed.fallback {
            Some(fallback) => Self::resolve(ctx, fallback, inv),
            None => {
                debug!(target: LOG_TARGET, "no executor for `{}`, skipped", typed.kind);
                Ok(())
            }
        }
    }

    fn push_modification(
        ctx: &mut GameContext,
        inv: &Invocation,
        target: EffectTarget,
        duration: &Duration,
        modification: Modification,
    ) {
        ctx.state.add_effect(ActiveEffect::modification(
            EffectId(0),
            inv.player,
            inv.source,
            target,
            duration.clone(),
            modification,
        ));
    }

    fn ready(ctx: &mut GameContext, id: InstanceId) {
        if ctx.state.card_restricted(id, Restriction::CantReady) {
            debug!(target: LOG_TARGET, "{} can't ready", id);
            return;
        }
        if let Some(card) = ctx.state.card_mut(id) {
            card.ready = true;
            info!(target: LOG_TARGET, "{} is readied", card.name);
        }
    }

    /// Discard from `player`'s hand: the caller's selection, random picks,
    /// or the player's own choice.
    fn discard(ctx: &mut GameContext, player: PlayerId, amount: u32, random: bool, inv: &Invocation) {
        let hand: Vec<InstanceId> = ctx.state.player(player).hand.iter().map(|c| c.instance_id).collect();
        let count = (amount as usize).min(hand.len());
        if count == 0 {
            return;
        }

        let selected: Vec<InstanceId> = inv
            .payload
            .selected
            .iter()
            .copied()
            .filter(|id| hand.contains(id))
            .take(count)
            .collect();

        let picked = if !selected.is_empty() {
            selected
        } else if random {
            let mut pool = hand;
            let mut picked = Vec::with_capacity(count);
            for _ in 0..count {
                let Some(index) = ctx.state.rng.choose_index(pool.len()) else {
                    break;
                };
                picked.push(pool.swap_remove(index));
            }
            picked
        } else {
            let options = ctx
                .state
                .player(player)
                .hand
                .iter()
                .map(|card| ChoiceOption::card(card.instance_id, &card.name))
                .collect();
            let request = ChoiceRequest::pick_one(player, format!("Choose {} cards to discard", count), options)
                .with_bounds(count, count)
                .with_source(inv.source);
            choose_cards(ctx.decisions, ctx.state, &request)
        };

        for id in picked {
            ctx.state.move_card(id, Zone::Discard);
            info!(target: LOG_TARGET, "{} discards {}", player, id);
        }
    }

    fn play_free(ctx: &mut GameContext, filter: &CardFilter, inv: &Invocation) -> Result<(), EngineError> {
        let player = inv.player;
        let candidates: Vec<(InstanceId, String, u32)> = ctx
            .state
            .player(player)
            .hand
            .iter()
            .filter(|card| Some(card.instance_id) != inv.source)
            .filter(|card| filter.matches(card, player, inv.source) && rules::is_playable(ctx.state, player, card))
            .map(|card| (card.instance_id, card.name.clone(), card.cost))
            .collect();
        if candidates.is_empty() {
            debug!(target: LOG_TARGET, "{} has nothing to play for free", player);
            return Ok(());
        }

        let highest = candidates
            .iter()
            .min_by_key(|(_, _, cost)| std::cmp::Reverse(*cost))
            .map(|(id, _, _)| *id);
        let options = candidates
            .iter()
            .map(|(id, name, _)| ChoiceOption::card(*id, name))
            .collect();
        let request = ChoiceRequest::pick_one(player, "Choose a card to play for free", options).with_source(inv.source);

        let picked = choose_with(ctx.decisions, ctx.state, &request, |_| {
            highest.into_iter().map(InstanceId::option_id).collect()
        });
        match picked.first().and_then(|id| InstanceId::parse_option(id)) {
            Some(id) => rules::play_card(ctx, player, id, None, true).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Put the top cards of the source owner's deck under the source.
    fn boost(ctx: &mut GameContext, amount: u32, inv: &Invocation) {
        let Some((source, owner)) = inv
            .source
            .and_then(|id| ctx.state.in_play(id))
            .map(|card| (card.instance_id, card.owner))
        else {
            debug!(target: LOG_TARGET, "boost without a source in play");
            return;
        };

        for _ in 0..amount {
            let Some(card) = ctx.state.player_mut(owner).deck.pop() else {
                debug!(target: LOG_TARGET, "{} has no deck left to boost from", owner);
                break;
            };
            let placed = card.instance_id;
            if let Some(host) = ctx.state.card_mut(source) {
                host.cards_under.push(card);
            }
            ctx.state.record_turn_event(TurnEvent::CardPlacedUnder {
                player: owner,
                card: placed,
                under: source,
            });
            info!(target: LOG_TARGET, "{} placed under {}", placed, source);
        }
    }
}

/// A target restricted to cards costing at most `max_cost`.
fn cost_limited(target: &TargetSpec, max_cost: Option<u32>) -> TargetSpec {
    match (target, max_cost) {
        (TargetSpec::Chosen(filter), Some(max)) => TargetSpec::Chosen(filter.clone().max_cost(max)),
        _ => target.clone(),
    }
}

/// Deal damage to a card, reduced by its Resist. Returns the damage dealt.
pub(crate) fn apply_damage(
    ctx: &mut GameContext,
    target: InstanceId,
    amount: u32,
    player: PlayerId,
    source: Option<InstanceId>,
) -> u32 {
    let Some(card) = ctx.state.card_mut(target) else {
        return 0;
    };
    let dealt = amount.saturating_sub(card.meta.resist);
    card.damage += dealt;
    info!(target: LOG_TARGET, "{} takes {} damage ({} resisted)", card.name, dealt, amount - dealt);

    let mut event = GameEvent::new(EventKind::DamageDealt, player)
        .with_target(target)
        .with_value(i64::from(dealt));
    if let Some(source) = source {
        event = event.with_source(source);
    }
    ctx.events.notify(ctx.state, &event);
    dealt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInstance, CardType, Keyword};
    use crate::core::{EngineConfig, GameState};
    use crate::decisions::{ChoiceResponse, NoDecisions, ScriptedDecisions};
    use crate::effects::{EffectPayload, PlayerTarget};
    use crate::triggers::{Condition, EventLog, NullEventBus};

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn setup() -> GameState {
        let mut state = GameState::new(EngineConfig::new(2), 3);
        state.put_into(CardInstance::character(InstanceId(1), p(0), "Healer", 2, 1, 3, 1), Zone::Play);
        state.put_into(CardInstance::character(InstanceId(2), p(1), "Brute", 4, 4, 4, 2), Zone::Play);
        state.put_into(
            CardInstance::character(InstanceId(3), p(1), "Guardian", 3, 2, 5, 1).with_keyword(Keyword::Ward),
            Zone::Play,
        );
        for id in 10..15 {
            state.put_into(CardInstance::character(InstanceId(id), p(0), "Filler", 1, 1, 1, 1), Zone::Deck);
        }
        crate::continuous::recalculate(&mut state);
        state
    }

    fn run(state: &mut GameState, effect: &Effect, inv: &Invocation) -> Result<(), EngineError> {
        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(state, &mut decisions, &mut events);
        EffectResolver::resolve(&mut ctx, effect, inv)
    }

    #[test]
    fn test_draw_and_lore() {
        let mut state = setup();
        let inv = Invocation::new(p(0));
        run(&mut state, &Effect::sequence([Effect::draw(2), Effect::gain_lore(3)]), &inv).unwrap();

        assert_eq!(state.player(p(0)).hand.len(), 2);
        assert_eq!(state.player(p(0)).deck.len(), 3);
        assert_eq!(state.player(p(0)).lore, 3);
    }

    #[test]
    fn test_lose_lore_saturates() {
        let mut state = setup();
        state.player_mut(p(1)).lore = 1;
        let effect = Effect::LoseLore {
            amount: 3,
            players: PlayerTarget::Opponents,
        };
        run(&mut state, &effect, &Invocation::new(p(0))).unwrap();
        assert_eq!(state.player(p(1)).lore, 0);
    }

    #[test]
    fn test_damage_banishes_at_willpower() {
        let mut state = setup();
        let inv = Invocation::new(p(0)).targeting(InstanceId(2));
        run(&mut state, &Effect::deal_damage(4, TargetSpec::chosen_opposing()), &inv).unwrap();

        assert_eq!(state.find_card(InstanceId(2)).unwrap().zone, Zone::Discard);
        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 0);
    }

    #[test]
    fn test_ward_blocks_payload_target() {
        let mut state = setup();
        let before = state.snapshot().unwrap();
        let inv = Invocation::new(p(0)).targeting(InstanceId(3));

        for effect in [
            Effect::deal_damage(2, TargetSpec::chosen_opposing()),
            Effect::Banish {
                target: TargetSpec::chosen_opposing(),
                max_cost: None,
            },
            Effect::GrantKeyword {
                keyword: Keyword::Reckless,
                target: TargetSpec::chosen_opposing(),
                duration: Duration::UntilEndOfTurn,
            },
            Effect::strength_this_turn(-2, TargetSpec::chosen_opposing()),
        ] {
            run(&mut state, &effect, &inv).unwrap();
        }

        assert_eq!(state.snapshot().unwrap(), before);
    }

    #[test]
    fn test_area_damage_ignores_ward() {
        let mut state = setup();
        run(&mut state, &Effect::deal_damage(1, TargetSpec::all_opposing()), &Invocation::new(p(0))).unwrap();

        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 1);
        assert_eq!(state.find_card(InstanceId(3)).unwrap().damage, 1);
        assert_eq!(state.find_card(InstanceId(1)).unwrap().damage, 0);
    }

    #[test]
    fn test_resist_reduces_damage() {
        let mut state = setup();
        state.card_mut(InstanceId(2)).unwrap().base_keywords.push(Keyword::Resist(1));
        crate::continuous::recalculate(&mut state);

        let inv = Invocation::new(p(0)).targeting(InstanceId(2));
        run(&mut state, &Effect::deal_damage(3, TargetSpec::chosen_opposing()), &inv).unwrap();
        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 2);
    }

    #[test]
    fn test_stat_buff_pushes_active_effect() {
        let mut state = setup();
        let inv = Invocation::new(p(0)).from_source(InstanceId(1));
        run(&mut state, &Effect::strength_this_turn(2, TargetSpec::Source), &inv).unwrap();

        assert_eq!(state.active_effects.len(), 1);
        assert_eq!(state.active_effects[0].duration, Duration::UntilEndOfTurn);
        assert_eq!(state.find_card(InstanceId(1)).unwrap().strength, 3);
    }

    #[test]
    fn test_conditional_branches() {
        let mut state = setup();
        let effect = Effect::Conditional {
            condition: Condition::LoreAtLeast(5),
            then: Box::new(Effect::draw(1)),
            otherwise: Some(Box::new(Effect::gain_lore(1))),
        };
        run(&mut state, &effect, &Invocation::new(p(0))).unwrap();
        assert_eq!(state.player(p(0)).lore, 1);
        assert!(state.player(p(0)).hand.is_empty());
    }

    #[test]
    fn test_typed_effect_uses_executor_then_fallback() {
        let typed = Effect::Typed(TypedEffect {
            kind: "gain_lore".to_string(),
            params: serde_json::json!({ "amount": 2 }),
            fallback: Some(Box::new(Effect::gain_lore(2))),
        });

        let mut state = setup();
        run(&mut state, &typed, &Invocation::new(p(0))).unwrap();
        assert_eq!(state.player(p(0)).lore, 2);

        let mut calls = 0;
        let mut executor = |state: &mut GameState, effect: &TypedEffect, inv: &Invocation| -> Result<(), EngineError> {
            calls += 1;
            state.player_mut(inv.player).lore += effect.params["amount"].as_u64().unwrap_or(0) as u32 * 10;
            Ok(())
        };
        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events).with_executor(&mut executor);
        EffectResolver::resolve(&mut ctx, &typed, &Invocation::new(p(0))).unwrap();
        assert_eq!(calls, 1);
        assert_eq!(state.player(p(0)).lore, 22);
    }

    #[test]
    fn test_executor_error_propagates() {
        let typed = Effect::Typed(TypedEffect {
            kind: "explode".to_string(),
            params: serde_json::Value::Null,
            fallback: None,
        });
        let mut state = setup();
        let mut executor = |_: &mut GameState, effect: &TypedEffect, _: &Invocation| -> Result<(), EngineError> {
            Err(EngineError::executor(effect.kind.clone(), "boom"))
        };
        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events).with_executor(&mut executor);

        assert!(matches!(
            EffectResolver::resolve(&mut ctx, &typed, &Invocation::new(p(0))),
            Err(EngineError::Executor { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut state = GameState::new(EngineConfig::new(2).with_max_effect_depth(2), 1);
        for id in 1..5 {
            state.put_into(CardInstance::character(InstanceId(id), p(0), "Card", 1, 1, 1, 1), Zone::Deck);
        }
        let nested = Effect::sequence([Effect::draw(1), Effect::sequence([Effect::draw(1), Effect::sequence([Effect::draw(1)])])]);
        run(&mut state, &nested, &Invocation::new(p(0))).unwrap();
        assert_eq!(state.player(p(0)).hand.len(), 1);
    }

    #[test]
    fn test_discard_from_payload_and_choice() {
        let mut state = setup();
        state.draw(p(0), 3);
        let hand: Vec<InstanceId> = state.player(p(0)).hand.iter().map(|c| c.instance_id).collect();

        let effect = Effect::Discard {
            amount: 1,
            players: PlayerTarget::You,
            random: false,
        };
        let inv = Invocation::new(p(0)).with_payload(EffectPayload::with_selected([hand[2]]));
        run(&mut state, &effect, &inv).unwrap();
        assert_eq!(state.find_card(hand[2]).unwrap().zone, Zone::Discard);

        let mut decisions = ScriptedDecisions::new([ChoiceResponse::cards([hand[1]])]);
        let mut events = NullEventBus;
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);
        EffectResolver::resolve(&mut ctx, &effect, &Invocation::new(p(0))).unwrap();
        assert_eq!(state.find_card(hand[1]).unwrap().zone, Zone::Discard);
        assert_eq!(state.player(p(0)).hand.len(), 1);
    }

    #[test]
    fn test_boost_records_turn_event() {
        let mut state = setup();
        let inv = Invocation::new(p(0)).from_source(InstanceId(1));
        run(&mut state, &Effect::Boost { amount: 1 }, &inv).unwrap();

        assert_eq!(state.find_card(InstanceId(1)).unwrap().cards_under.len(), 1);
        assert_eq!(state.player(p(0)).deck.len(), 4);
        assert!(matches!(
            state.turn_history.front(),
            Some(TurnEvent::CardPlacedUnder { under, .. }) if *under == InstanceId(1)
        ));
    }

    #[test]
    fn test_play_free_card_picks_highest_cost() {
        let mut state = setup();
        state.put_into(CardInstance::new(InstanceId(20), p(0), "Cheap", CardType::Item, 1), Zone::Hand);
        state.put_into(CardInstance::new(InstanceId(21), p(0), "Pricey", CardType::Item, 6), Zone::Hand);

        let effect = Effect::PlayFreeCard {
            filter: CardFilter::of_type(CardType::Item),
        };
        run(&mut state, &effect, &Invocation::new(p(0))).unwrap();

        assert_eq!(state.find_card(InstanceId(21)).unwrap().zone, Zone::Play);
        assert_eq!(state.find_card(InstanceId(20)).unwrap().zone, Zone::Hand);
    }

    #[test]
    fn test_move_damage_and_heal() {
        let mut state = setup();
        state.card_mut(InstanceId(1)).unwrap().damage = 2;

        let effect = Effect::MoveDamage {
            amount: 1,
            from: TargetSpec::Source,
            to: TargetSpec::Resolved(InstanceId(2)),
        };
        let inv = Invocation::new(p(0)).from_source(InstanceId(1));
        run(&mut state, &effect, &inv).unwrap();
        assert_eq!(state.find_card(InstanceId(1)).unwrap().damage, 1);
        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 1);

        run(&mut state, &Effect::Heal { amount: 5, target: TargetSpec::Source }, &inv).unwrap();
        assert_eq!(state.find_card(InstanceId(1)).unwrap().damage, 0);
    }

    #[test]
    fn test_move_damage_from_card_data() {
        let ast: crate::effects::ast::EffectAst =
            serde_json::from_str(r#"{"action": "move_damage", "amount": 1}"#).unwrap();
        let effect = Effect::try_from(ast).unwrap();

        // Headless: the damaged character is picked as the source end.
        let mut state = setup();
        state.card_mut(InstanceId(1)).unwrap().damage = 2;
        let inv = Invocation::new(p(0)).from_source(InstanceId(1)).targeting(InstanceId(2));
        run(&mut state, &effect, &inv).unwrap();
        assert_eq!(state.find_card(InstanceId(1)).unwrap().damage, 1);
        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 1);

        // The payload names the source end.
        let mut state = setup();
        state.card_mut(InstanceId(2)).unwrap().damage = 1;
        state.put_into(CardInstance::character(InstanceId(4), p(0), "Medic", 1, 1, 3, 1), Zone::Play);
        state.card_mut(InstanceId(4)).unwrap().damage = 2;
        let inv = Invocation::new(p(0))
            .targeting(InstanceId(2))
            .with_payload(EffectPayload::with_selected([InstanceId(4)]));
        run(&mut state, &effect, &inv).unwrap();
        assert_eq!(state.find_card(InstanceId(4)).unwrap().damage, 1);
        assert_eq!(state.find_card(InstanceId(2)).unwrap().damage, 2);
    }

    #[test]
    fn test_damage_event_is_notified() {
        let mut state = setup();
        let (mut decisions, mut events) = (NoDecisions, EventLog::new());
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);
        let inv = Invocation::new(p(0)).targeting(InstanceId(2));
        EffectResolver::resolve(&mut ctx, &Effect::deal_damage(1, TargetSpec::chosen_opposing()), &inv).unwrap();

        let event = &events.events()[0];
        assert_eq!(event.kind, EventKind::DamageDealt);
        assert_eq!(event.value, Some(1));
    }
}
