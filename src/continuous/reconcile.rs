//! The reconciliation pass.

use log::debug;

use super::change::{self, Change};
use super::statics;
use crate::cards::Keyword;
use crate::core::entity::InstanceId;
use crate::core::GameState;
use crate::effects::{ActiveEffect, Modification};

/// Rebuild every derived stat, keyword and flag from base values, active
/// effects and static abilities.
pub fn recalculate(state: &mut GameState) {
    reset(state);

    for id in state.play_order() {
        let changes = card_changes(state, id);
        change::apply(state, changes);
    }

    let changes = sweep(state);
    change::apply(state, changes);

    finalize(state);
    debug!(
        "reconciled {} cards, {} active effects",
        state.cards_in_play().count(),
        state.active_effects.len()
    );
}

fn reset(state: &mut GameState) {
    state.active_effects.retain(|e| !e.duration.is_while_active());
    state.static_effect_seq = 0;

    let goal = state.config.default_lore_goal;
    for (_, player) in state.players.iter_mut() {
        player.lore_goal = goal;
        for card in &mut player.play {
            card.reset_stats();
            card.strength += card.meta.temporary_strength;
            card.meta.resist = 0;
        }
    }
}

/// Stat and keyword changes an effect makes to its targets, if it is a
/// plain modification.
fn plain_changes(state: &GameState, effect: &ActiveEffect, only: Option<InstanceId>) -> Vec<Change> {
    let make = |target: InstanceId| match effect.as_modification() {
        Some(Modification::Stat { stat, delta }) => Some(Change::stat(target, *stat, *delta)),
        Some(Modification::Keyword(keyword)) => Some(Change::keyword(target, keyword.clone())),
        _ => None,
    };
    state
        .effect_targets(effect)
        .into_iter()
        .filter(|target| only.map_or(true, |id| id == *target))
        .filter_map(make)
        .collect()
}

/// Everything applied while visiting one card: durational modifications
/// aimed at it, then its own static abilities.
fn card_changes(state: &GameState, id: InstanceId) -> Vec<Change> {
    let Some(card) = state.in_play(id) else {
        return Vec::new();
    };

    let mut changes: Vec<Change> = state
        .active_effects
        .iter()
        .filter(|e| !e.duration.is_while_active())
        .flat_map(|e| plain_changes(state, e, Some(id)))
        .collect();

    changes.extend(statics::collect(state, card));
    changes
}

/// Computed modifications of any duration, then while-active ones.
fn sweep(state: &GameState) -> Vec<Change> {
    let mut changes = Vec::new();
    for effect in &state.active_effects {
        if let Some(Modification::Computed(buff)) = effect.as_modification() {
            changes.extend(statics::computed_changes(state, effect, buff));
        }
    }
    for effect in state.active_effects.iter().filter(|e| e.duration.is_while_active()) {
        changes.extend(plain_changes(state, effect, None));
    }
    changes
}

fn finalize(state: &mut GameState) {
    for (_, player) in state.players.iter_mut() {
        for card in &mut player.play {
            card.meta.resist += card.keyword_resist();
            card.meta.has_ward = card.has_keyword(&Keyword::Ward);
            card.meta.has_reckless = card.has_keyword(&Keyword::Reckless);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardFilter, CardInstance, CardType, Stat, Zone};
    use crate::core::entity::EffectId;
    use crate::core::{EngineConfig, PlayerId};
    use crate::effects::{
        Ability, Amount, ComputedBuff, Duration, EffectTarget, LegacyStatic, PlayerTarget, Restriction,
        StaticEffect, StaticTarget,
    };
    use crate::triggers::Condition;

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn buff_others(amount: i32) -> Ability {
        Ability::static_ability(vec![StaticEffect::Modify {
            stat: Stat::Strength,
            amount: Amount::Fixed(amount),
            target: StaticTarget::Cards(CardFilter::characters().yours().other()),
            condition: None,
        }])
    }

    fn setup() -> GameState {
        let mut state = GameState::new(EngineConfig::new(2), 5);
        state.put_into(
            CardInstance::character(InstanceId(1), p(0), "Captain", 4, 3, 4, 1).with_ability(buff_others(2)),
            Zone::Play,
        );
        state.put_into(CardInstance::character(InstanceId(2), p(0), "Deckhand", 2, 2, 2, 1), Zone::Play);
        state.put_into(CardInstance::character(InstanceId(3), p(1), "Rival", 3, 3, 3, 2), Zone::Play);
        state
    }

    fn card(state: &GameState, id: u32) -> &CardInstance {
        state.find_card(InstanceId(id)).unwrap()
    }

    #[test]
    fn test_static_buff_and_removal() {
        let mut state = setup();
        recalculate(&mut state);
        assert_eq!(card(&state, 2).strength, 4);
        assert_eq!(card(&state, 1).strength, 3);
        assert_eq!(card(&state, 3).strength, 3);

        state.move_card(InstanceId(1), Zone::Discard);
        recalculate(&mut state);
        assert_eq!(card(&state, 2).strength, 2);
    }

    #[test]
    fn test_no_stale_deltas() {
        let mut state = setup();
        for _ in 0..3 {
            recalculate(&mut state);
        }
        assert_eq!(card(&state, 2).strength, 4);
    }

    #[test]
    fn test_idempotent_snapshot() {
        let mut state = setup();
        state.card_mut(InstanceId(2)).unwrap().abilities.push(Ability::static_ability(vec![StaticEffect::Legacy(
            LegacyStatic::BuffSubtype {
                filter: CardFilter::characters().yours(),
                stat: Stat::Lore,
                amount: 1,
            },
        )]));
        recalculate(&mut state);
        let first = state.snapshot().unwrap();
        recalculate(&mut state);
        assert_eq!(state.snapshot().unwrap(), first);
        assert_eq!(card(&state, 1).lore, 2);
    }

    #[test]
    fn test_resist_stacking() {
        let mut state = setup();
        {
            let hero = state.card_mut(InstanceId(2)).unwrap();
            hero.abilities.push(Ability::static_ability(vec![StaticEffect::Resist(1)]));
        }
        state.add_effect(ActiveEffect::modification(
            EffectId(0),
            p(0),
            None,
            EffectTarget::card(InstanceId(2)),
            Duration::UntilEndOfTurn,
            Modification::Keyword(Keyword::Resist(2)),
        ));

        recalculate(&mut state);
        assert_eq!(card(&state, 2).meta.resist, 3);
    }

    #[test]
    fn test_durational_and_temporary_strength() {
        let mut state = setup();
        state.card_mut(InstanceId(3)).unwrap().meta.temporary_strength = 2;
        state.add_effect(ActiveEffect::modification(
            EffectId(0),
            p(1),
            None,
            EffectTarget::card(InstanceId(3)),
            Duration::UntilEndOfTurn,
            Modification::Stat {
                stat: Stat::Lore,
                delta: 2,
            },
        ));

        recalculate(&mut state);
        let rival = card(&state, 3);
        assert_eq!(rival.strength, 5);
        assert_eq!(rival.lore, 4);
    }

    #[test]
    fn test_ward_and_reckless_flags() {
        let mut state = setup();
        state.card_mut(InstanceId(3)).unwrap().base_keywords = vec![Keyword::Ward, Keyword::Reckless];
        recalculate(&mut state);
        assert!(card(&state, 3).meta.has_ward);
        assert!(card(&state, 3).meta.has_reckless);

        state.card_mut(InstanceId(3)).unwrap().base_keywords.clear();
        recalculate(&mut state);
        assert!(!card(&state, 3).meta.has_ward);
    }

    #[test]
    fn test_legacy_forms_promote_while_active_effects() {
        let mut state = setup();
        let statics = Ability::static_ability(vec![
            StaticEffect::Legacy(LegacyStatic::CantPlaySongs {
                players: PlayerTarget::Opponents,
            }),
            StaticEffect::Legacy(LegacyStatic::ReduceCost {
                amount: 1,
                filter: CardFilter::of_type(CardType::Item),
            }),
            StaticEffect::Legacy(LegacyStatic::ModifyLoreGoal {
                amount: 5,
                players: PlayerTarget::Opponents,
            }),
        ]);
        state.card_mut(InstanceId(1)).unwrap().abilities.push(statics);

        recalculate(&mut state);
        assert!(state.player_restricted(p(1), Restriction::CantPlaySongs));
        assert!(!state.player_restricted(p(0), Restriction::CantPlaySongs));
        assert_eq!(state.player(p(1)).lore_goal, 25);
        assert_eq!(state.player(p(0)).lore_goal, 20);
        assert!(state.active_effects.iter().all(|e| e.id.is_while_active()));
    }

    #[test]
    fn test_conditional_statics() {
        let mut state = setup();
        let statics = Ability::static_ability(vec![
            StaticEffect::Legacy(LegacyStatic::ConditionalStatBuff {
                condition: Condition::has_card_named("Rival"),
                stat: Stat::Willpower,
                amount: 3,
            }),
            StaticEffect::Legacy(LegacyStatic::LorePerOpposingDamaged { amount: 1 }),
        ]);
        state.card_mut(InstanceId(2)).unwrap().abilities.push(statics);
        state.card_mut(InstanceId(3)).unwrap().damage = 1;

        recalculate(&mut state);
        assert_eq!(card(&state, 2).willpower, 5);
        assert_eq!(card(&state, 2).lore, 2);

        state.move_card(InstanceId(3), Zone::Discard);
        recalculate(&mut state);
        assert_eq!(card(&state, 2).willpower, 2);
        assert_eq!(card(&state, 2).lore, 1);
    }

    #[test]
    fn test_computed_strength_counts_now() {
        let mut state = setup();
        state.add_effect(ActiveEffect::modification(
            EffectId(0),
            p(0),
            None,
            EffectTarget::card(InstanceId(2)),
            Duration::UntilEndOfTurn,
            Modification::Computed(ComputedBuff::Strength {
                amount: Amount::Count {
                    filter: CardFilter::characters().opponents(),
                    multiplier: 1,
                },
            }),
        ));
        recalculate(&mut state);
        assert_eq!(card(&state, 2).strength, 5);

        state.move_card(InstanceId(3), Zone::Discard);
        recalculate(&mut state);
        assert_eq!(card(&state, 2).strength, 4);
    }

    #[test]
    fn test_dynamic_modify_amount() {
        let mut state = setup();
        let ability = Ability::static_ability(vec![StaticEffect::Modify {
            stat: Stat::Strength,
            amount: Amount::Count {
                filter: CardFilter::characters().yours().other(),
                multiplier: 2,
            },
            target: StaticTarget::SelfOnly,
            condition: None,
        }]);
        state.card_mut(InstanceId(3)).unwrap().abilities.push(ability);
        state.put_into(CardInstance::character(InstanceId(4), p(1), "Crew", 1, 1, 1, 1), Zone::Play);

        recalculate(&mut state);
        assert_eq!(card(&state, 3).strength, 5);
    }
}
