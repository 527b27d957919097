//! Ability conditions.
//!
//! Conditions gate static abilities, individual static sub-effects,
//! conditional effects and `Until` durations. They are pure predicates
//! over the game state, evaluated from the point of view of a controlling
//! player and an optional source card.

use serde::{Deserialize, Serialize};

use crate::cards::{CardFilter, OwnerScope, Stat};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::state::{GameState, TurnEvent};

/// How to compare a measured value against a threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    AtLeast,
    AtMost,
    Exactly,
}

impl Comparison {
    /// Compare `value` against `threshold`.
    #[must_use]
    pub fn compare<T: PartialOrd>(self, value: T, threshold: T) -> bool {
        match self {
            Self::AtLeast => value >= threshold,
            Self::AtMost => value <= threshold,
            Self::Exactly => value == threshold,
        }
    }
}

/// A condition on the game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Controller's hand size compared to a value.
    HandSize { comparison: Comparison, value: u32 },

    /// A card with this name is in play within the scope.
    HasCardNamed { name: String, scope: OwnerScope },

    /// Number of cards in play matching the filter compared to a value.
    HasCardMatching { filter: CardFilter, comparison: Comparison, count: u32 },

    /// A stat of the source card compared to a value.
    SelfStat { stat: Stat, comparison: Comparison, value: i32 },

    /// The source card is (or isn't) damaged.
    SelfDamaged(bool),

    /// The source card is (or isn't) exerted.
    SelfExerted(bool),

    /// The source card has at least one card under it.
    SelfHasCardUnder,

    /// A card was put under the source card this turn.
    CardPlacedUnderThisTurn,

    /// It is the controller's turn.
    IsYourTurn,

    /// Controller has at least this much lore.
    LoreAtLeast(u32),

    // === Combinators ===
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
    Always,
    Never,
}

impl Condition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// A named card in play anywhere.
    pub fn has_card_named(name: impl Into<String>) -> Self {
        Self::HasCardNamed {
            name: name.into(),
            scope: OwnerScope::Any,
        }
    }
}

/// Who is asking.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    pub state: &'a GameState,
    /// The controlling player.
    pub player: PlayerId,
    /// The card whose ability is being checked.
    pub source: Option<InstanceId>,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(state: &'a GameState, player: PlayerId, source: Option<InstanceId>) -> Self {
        Self { state, player, source }
    }
}

/// Evaluator for conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    ///
    /// Conditions about the source card are false when there is no source
    /// or it can't be found.
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext) -> bool {
        let state = ctx.state;
        let source = || ctx.source.and_then(|id| state.find_card(id));

        match condition {
            Condition::HandSize { comparison, value } => {
                comparison.compare(state.player(ctx.player).hand.len() as u32, *value)
            }

            Condition::HasCardNamed { name, scope } => state
                .cards_in_play()
                .any(|c| c.name.eq_ignore_ascii_case(name) && scope.includes(c.owner, ctx.player)),

            Condition::HasCardMatching { filter, comparison, count } => {
                let found = state
                    .cards_in_play()
                    .filter(|c| filter.matches(c, ctx.player, ctx.source))
                    .count() as u32;
                comparison.compare(found, *count)
            }

            Condition::SelfStat { stat, comparison, value } => source().is_some_and(|card| {
                let current = match stat {
                    Stat::Strength => card.strength,
                    Stat::Willpower => card.willpower,
                    Stat::Lore => card.lore,
                };
                comparison.compare(current, *value)
            }),

            Condition::SelfDamaged(expected) => source().is_some_and(|card| card.is_damaged() == *expected),

            Condition::SelfExerted(expected) => source().is_some_and(|card| !card.ready == *expected),

            Condition::SelfHasCardUnder => source().is_some_and(|card| !card.cards_under.is_empty()),

            Condition::CardPlacedUnderThisTurn => ctx.source.is_some_and(|id| {
                state
                    .turn_history
                    .iter()
                    .any(|event| matches!(event, TurnEvent::CardPlacedUnder { under, .. } if *under == id))
            }),

            Condition::IsYourTurn => state.active_player == ctx.player,

            Condition::LoreAtLeast(lore) => state.player(ctx.player).lore >= *lore,

            Condition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            Condition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),

            Condition::Not(inner) => !Self::evaluate(inner, ctx),

            Condition::Always => true,

            Condition::Never => false,
        }
    }

    /// Evaluate an optional condition; absent means satisfied.
    pub fn holds(condition: Option<&Condition>, ctx: &ConditionContext) -> bool {
        condition.map_or(true, |c| Self::evaluate(c, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInstance, Zone};
    use crate::core::EngineConfig;

    fn setup() -> GameState {
        let mut state = GameState::new(EngineConfig::new(2), 42);
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        let hero = CardInstance::character(InstanceId(1), p0, "Hero", 3, 2, 3, 1).with_subtype("Hero");
        let villain = CardInstance::character(InstanceId(2), p1, "Villain", 4, 3, 4, 2);
        state.put_into(hero, Zone::Play);
        state.put_into(villain, Zone::Play);
        for id in 10..13 {
            state.put_into(CardInstance::character(InstanceId(id), p0, "Filler", 1, 1, 1, 1), Zone::Hand);
        }
        state
    }

    #[test]
    fn test_comparison() {
        assert!(Comparison::AtLeast.compare(3, 3));
        assert!(!Comparison::AtLeast.compare(2, 3));
        assert!(Comparison::AtMost.compare(2, 3));
        assert!(Comparison::Exactly.compare(3, 3));
    }

    #[test]
    fn test_hand_size() {
        let state = setup();
        let ctx = ConditionContext::new(&state, PlayerId::new(0), None);

        let three = Condition::HandSize { comparison: Comparison::AtLeast, value: 3 };
        let four = Condition::HandSize { comparison: Comparison::AtLeast, value: 4 };
        assert!(ConditionEvaluator::evaluate(&three, &ctx));
        assert!(!ConditionEvaluator::evaluate(&four, &ctx));
    }

    #[test]
    fn test_has_card_named_scope() {
        let state = setup();
        let ctx = ConditionContext::new(&state, PlayerId::new(0), None);

        assert!(ConditionEvaluator::evaluate(&Condition::has_card_named("villain"), &ctx));
        let yours = Condition::HasCardNamed {
            name: "Villain".to_string(),
            scope: OwnerScope::Yours,
        };
        assert!(!ConditionEvaluator::evaluate(&yours, &ctx));
    }

    #[test]
    fn test_self_conditions() {
        let mut state = setup();
        let p0 = PlayerId::new(0);

        {
            let ctx = ConditionContext::new(&state, p0, Some(InstanceId(1)));
            assert!(!ConditionEvaluator::evaluate(&Condition::SelfDamaged(true), &ctx));
            assert!(ConditionEvaluator::evaluate(
                &Condition::SelfStat { stat: Stat::Willpower, comparison: Comparison::AtLeast, value: 3 },
                &ctx
            ));
        }

        state.card_mut(InstanceId(1)).unwrap().damage = 1;
        let ctx = ConditionContext::new(&state, p0, Some(InstanceId(1)));
        assert!(ConditionEvaluator::evaluate(&Condition::SelfDamaged(true), &ctx));

        // No source: self conditions fail.
        let ctx = ConditionContext::new(&state, p0, None);
        assert!(!ConditionEvaluator::evaluate(&Condition::SelfDamaged(true), &ctx));
    }

    #[test]
    fn test_card_placed_under_this_turn() {
        let mut state = setup();
        let p0 = PlayerId::new(0);
        let cond = Condition::CardPlacedUnderThisTurn;

        assert!(!ConditionEvaluator::evaluate(&cond, &ConditionContext::new(&state, p0, Some(InstanceId(1)))));

        state.turn_history.push_back(TurnEvent::CardPlacedUnder {
            player: p0,
            card: InstanceId(10),
            under: InstanceId(1),
        });
        assert!(ConditionEvaluator::evaluate(&cond, &ConditionContext::new(&state, p0, Some(InstanceId(1)))));
        assert!(!ConditionEvaluator::evaluate(&cond, &ConditionContext::new(&state, p0, Some(InstanceId(2)))));
    }

    #[test]
    fn test_matching_count_and_combinators() {
        let state = setup();
        let ctx = ConditionContext::new(&state, PlayerId::new(0), Some(InstanceId(1)));

        let heroes = Condition::HasCardMatching {
            filter: CardFilter::characters().yours().with_subtype("Hero"),
            comparison: Comparison::AtLeast,
            count: 1,
        };
        let other_heroes = Condition::HasCardMatching {
            filter: CardFilter::characters().yours().with_subtype("Hero").other(),
            comparison: Comparison::AtLeast,
            count: 1,
        };

        assert!(ConditionEvaluator::evaluate(&heroes, &ctx));
        assert!(!ConditionEvaluator::evaluate(&other_heroes, &ctx));
        assert!(ConditionEvaluator::evaluate(&Condition::any([other_heroes.clone(), heroes.clone()]), &ctx));
        assert!(!ConditionEvaluator::evaluate(&Condition::all([other_heroes, heroes]), &ctx));
        assert!(ConditionEvaluator::evaluate(&Condition::Never.negate(), &ctx));
        assert!(ConditionEvaluator::evaluate(&Condition::IsYourTurn, &ctx));
    }
}
