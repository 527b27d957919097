//! Playing cards from hand.

use log::{debug, info};

use super::ability::fire_triggers;
use super::context::GameContext;
use crate::cards::{CardInstance, CardType, Zone};
use crate::continuous;
use crate::core::entity::{EffectId, InstanceId};
use crate::core::player::PlayerId;
use crate::core::state::TurnEvent;
use crate::core::{EngineError, GameState};
use crate::effects::{Duration, Modification, Restriction, TriggerKind};
use crate::triggers::GameEvent;

const LOG_TARGET: &str = "lore_engine::action";

/// May `player` play this card at all, cost aside?
#[must_use]
pub fn is_playable(state: &GameState, player: PlayerId, card: &CardInstance) -> bool {
    if card.card_type == CardType::Action && state.player_restricted(player, Restriction::CantPlayActions) {
        return false;
    }
    !(card.is_song() && state.player_restricted(player, Restriction::CantPlaySongs))
}

/// What playing a card would cost, and which discounts it would use up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayCost {
    pub ink: u32,
    /// Index of the queued reduction consumed.
    pub queued: Option<usize>,
    /// One-use reduction effects consumed.
    pub one_use: Vec<EffectId>,
}

/// Price a card in `player`'s hand: printed cost, less the first matching
/// queued reduction, less every cost reduction effect aimed at the player.
#[must_use]
pub fn play_cost(state: &GameState, player: PlayerId, card: &CardInstance) -> PlayCost {
    let mut price = PlayCost {
        ink: card.cost,
        ..PlayCost::default()
    };

    let queued = state
        .player(player)
        .cost_reductions
        .iter()
        .enumerate()
        .find(|(_, r)| r.filter.matches(card, player, None));
    if let Some((index, reduction)) = queued {
        price.ink = price.ink.saturating_sub(reduction.amount);
        price.queued = Some(index);
    }

    for effect in &state.active_effects {
        let Some(Modification::CostReduction { amount, filter }) = effect.as_modification() else {
            continue;
        };
        if !effect.target.includes_player(player) || !filter.matches(card, effect.controller, effect.source) {
            continue;
        }
        price.ink = price.ink.saturating_sub(*amount);
        if matches!(effect.duration, Duration::OneUse) {
            price.one_use.push(effect.id);
        }
    }
    price
}

/// Play a card from `player`'s hand.
///
/// Characters, items and locations enter play ready and drying. Actions
/// resolve their effects and go to the discard pile. A free play pays no
/// ink and leaves discounts untouched.
pub fn play_card(
    ctx: &mut GameContext,
    player: PlayerId,
    card_id: InstanceId,
    target: Option<InstanceId>,
    free: bool,
) -> Result<bool, EngineError> {
    let state = &*ctx.state;
    let Some(card) = state.player(player).hand.iter().find(|c| c.instance_id == card_id) else {
        debug!("{} is not in {}'s hand", card_id, player);
        return Ok(false);
    };
    if !is_playable(state, player, card) {
        debug!("{} can't play {} right now", player, card.name);
        return Ok(false);
    }
    let price = if free { PlayCost::default() } else { play_cost(state, player, card) };
    if state.player(player).ready_ink() < price.ink {
        debug!("{} needs {} ink to play {}", player, price.ink, card.name);
        return Ok(false);
    }
    let (name, card_type) = (card.name.clone(), card.card_type);

    ctx.state.player_mut(player).pay_ink(price.ink);
    if let Some(index) = price.queued {
        ctx.state.player_mut(player).cost_reductions.remove(index);
    }
    if !price.one_use.is_empty() {
        ctx.state.remove_effects(|e| price.one_use.contains(&e.id));
    }
    info!(target: LOG_TARGET, "{} plays {} for {} ink", player, name, price.ink);

    let turn = ctx.state.turn_number;
    if card_type.is_permanent() {
        ctx.state.move_card(card_id, Zone::Play);
        if let Some(card) = ctx.state.card_mut(card_id) {
            card.ready = true;
            card.turn_played = Some(turn);
        }
    }
    ctx.state.record_turn_event(TurnEvent::CardPlayed { player, card: card_id });
    ctx.events.emit(ctx.state, &GameEvent::played(player, card_id));
    continuous::recalculate(ctx.state);

    ctx.depth += 1;
    let resolved = fire_triggers(ctx, card_id, TriggerKind::OnPlay, target);
    ctx.depth -= 1;
    resolved?;

    if card_type == CardType::Action && ctx.state.player(player).hand.iter().any(|c| c.instance_id == card_id) {
        ctx.state.move_card(card_id, Zone::Discard);
    }
    ctx.settle()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardFilter;
    use crate::core::player::CostReduction;
    use crate::core::EngineConfig;
    use crate::decisions::NoDecisions;
    use crate::effects::{Ability, ActiveEffect, Effect, EffectTarget, TargetSpec};
    use crate::triggers::{EventKind, EventLog, NullEventBus};

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn setup(ink: u32) -> GameState {
        let mut state = GameState::new(EngineConfig::new(2), 1);
        state.turn_number = 3;
        for id in 0..ink {
            state.put_into(CardInstance::character(InstanceId(100 + id), p(0), "Ink", 1, 1, 1, 1), Zone::Inkwell);
        }
        state
    }

    fn run(state: &mut GameState, card: u32, free: bool) -> bool {
        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(state, &mut decisions, &mut events);
        play_card(&mut ctx, p(0), InstanceId(card), None, free).unwrap()
    }

    #[test]
    fn test_play_character_pays_and_dries() {
        let mut state = setup(3);
        state.put_into(CardInstance::character(InstanceId(1), p(0), "Hero", 3, 2, 2, 1), Zone::Hand);
        state.put_into(CardInstance::character(InstanceId(2), p(0), "Giant", 4, 5, 5, 2), Zone::Hand);

        let (mut decisions, mut events) = (NoDecisions, EventLog::new());
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);
        assert!(play_card(&mut ctx, p(0), InstanceId(1), None, false).unwrap());
        assert!(!play_card(&mut ctx, p(0), InstanceId(2), None, false).unwrap());

        let hero = state.find_card(InstanceId(1)).unwrap();
        assert_eq!(hero.zone, Zone::Play);
        assert!(hero.ready);
        assert!(hero.is_drying(3));
        assert_eq!(state.player(p(0)).ready_ink(), 0);
        assert_eq!(state.find_card(InstanceId(2)).unwrap().zone, Zone::Hand);
        assert_eq!(events.position(EventKind::CardPlayed), Some(0));
        assert_eq!(
            state.turn_history.back(),
            Some(&TurnEvent::CardPlayed {
                player: p(0),
                card: InstanceId(1)
            })
        );
    }

    #[test]
    fn test_action_resolves_then_discards() {
        let mut state = setup(2);
        state.put_into(CardInstance::character(InstanceId(5), p(1), "Target", 2, 2, 3, 1), Zone::Play);
        let action = CardInstance::new(InstanceId(1), p(0), "Zap", CardType::Action, 2).with_ability(
            Ability::triggered(TriggerKind::OnPlay, Effect::deal_damage(2, TargetSpec::chosen_opposing())),
        );
        state.put_into(action, Zone::Hand);

        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);
        assert!(play_card(&mut ctx, p(0), InstanceId(1), Some(InstanceId(5)), false).unwrap());

        assert_eq!(state.find_card(InstanceId(1)).unwrap().zone, Zone::Discard);
        assert_eq!(state.find_card(InstanceId(5)).unwrap().damage, 2);
    }

    #[test]
    fn test_restrictions_block_actions_and_songs() {
        let mut state = setup(5);
        state.put_into(CardInstance::new(InstanceId(1), p(0), "Trick", CardType::Action, 1), Zone::Hand);
        state.put_into(
            CardInstance::new(InstanceId(2), p(0), "Ballad", CardType::Action, 1).with_subtype("Song"),
            Zone::Hand,
        );
        state.add_effect(ActiveEffect::restriction(
            EffectId(0),
            p(1),
            None,
            EffectTarget::player(p(0)),
            Duration::UntilEndOfTurn,
            Restriction::CantPlaySongs,
        ));

        assert!(!run(&mut state, 2, false));
        assert!(run(&mut state, 1, false));

        state.add_effect(ActiveEffect::restriction(
            EffectId(0),
            p(1),
            None,
            EffectTarget::player(p(0)),
            Duration::UntilEndOfTurn,
            Restriction::CantPlayActions,
        ));
        state.put_into(CardInstance::new(InstanceId(3), p(0), "Trick", CardType::Action, 1), Zone::Hand);
        assert!(!run(&mut state, 3, false));
    }

    #[test]
    fn test_queued_and_one_use_reductions_are_consumed() {
        let mut state = setup(1);
        state.player_mut(p(0)).cost_reductions.push(CostReduction {
            amount: 1,
            filter: CardFilter::characters(),
        });
        state.add_effect(ActiveEffect::modification(
            EffectId(0),
            p(0),
            None,
            EffectTarget::player(p(0)),
            Duration::OneUse,
            Modification::CostReduction {
                amount: 1,
                filter: CardFilter::any(),
            },
        ));
        state.put_into(CardInstance::character(InstanceId(1), p(0), "Cheap", 3, 1, 1, 1), Zone::Hand);
        state.put_into(CardInstance::character(InstanceId(2), p(0), "Pricey", 2, 1, 1, 1), Zone::Hand);

        let price = play_cost(&state, p(0), state.find_card(InstanceId(1)).unwrap());
        assert_eq!(price.ink, 1);
        assert!(run(&mut state, 1, false));
        assert!(state.player(p(0)).cost_reductions.is_empty());
        assert!(state.active_effects.is_empty());

        let price = play_cost(&state, p(0), state.find_card(InstanceId(2)).unwrap());
        assert_eq!(price.ink, 2);
    }

    #[test]
    fn test_free_play_skips_ink_and_keeps_discounts() {
        let mut state = setup(0);
        state.player_mut(p(0)).cost_reductions.push(CostReduction {
            amount: 2,
            filter: CardFilter::any(),
        });
        state.put_into(CardInstance::character(InstanceId(1), p(0), "Gift", 5, 1, 1, 1), Zone::Hand);
        assert!(!run(&mut state, 1, false));
        assert!(run(&mut state, 1, true));
        assert_eq!(state.player(p(0)).cost_reductions.len(), 1);
    }

    #[test]
    fn test_on_play_trigger_resolves() {
        let mut state = setup(2);
        for id in 10..13 {
            state.put_into(CardInstance::character(InstanceId(id), p(0), "Deck", 1, 1, 1, 1), Zone::Deck);
        }
        let scholar = CardInstance::character(InstanceId(1), p(0), "Scholar", 2, 1, 2, 1)
            .with_ability(Ability::triggered(TriggerKind::OnPlay, Effect::draw(2)));
        state.put_into(scholar, Zone::Hand);

        assert!(run(&mut state, 1, false));
        assert_eq!(state.player(p(0)).hand.len(), 2);
        assert_eq!(state.player(p(0)).deck.len(), 1);
    }
}
