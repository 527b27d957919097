//! Effect definitions.
//!
//! Effects are the instantaneous parts of card abilities: draw, damage,
//! zone moves, buffs that push active effects, and composites that recurse.
//! They are produced from the parser's AST by `effects::ast` and executed
//! by `EffectResolver`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::active::{Duration, Restriction};
use crate::cards::{CardFilter, Keyword, Stat};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::GameState;
use crate::triggers::Condition;

/// Which cards an effect is aimed at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetSpec {
    /// The card whose ability this is.
    Source,
    /// One card chosen by the acting player, or supplied by the caller.
    Chosen(CardFilter),
    /// Every card in play matching the filter.
    All(CardFilter),
    /// A concrete card. Area effects fan out into these.
    Resolved(InstanceId),
}

impl TargetSpec {
    /// A chosen character.
    #[must_use]
    pub fn chosen_character() -> Self {
        Self::Chosen(CardFilter::characters())
    }

    /// A chosen opposing character.
    #[must_use]
    pub fn chosen_opposing() -> Self {
        Self::Chosen(CardFilter::characters().opponents())
    }

    /// Every opposing character.
    #[must_use]
    pub fn all_opposing() -> Self {
        Self::All(CardFilter::characters().opponents())
    }

    #[must_use]
    pub fn is_area(&self) -> bool {
        matches!(self, Self::All(_))
    }
}

/// Which players an effect is aimed at, relative to the acting player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerTarget {
    #[default]
    You,
    /// The next opponent in turn order.
    Opponent,
    /// Every opponent.
    Opponents,
    Each,
}

impl PlayerTarget {
    /// Parse a player scope as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "you" | "self" | "yours" | "controller" => Some(Self::You),
            "opponent" | "target_opponent" => Some(Self::Opponent),
            "opponents" | "all_opponents" | "each_opponent" => Some(Self::Opponents),
            "each" | "each_player" | "all" | "all_players" => Some(Self::Each),
            _ => None,
        }
    }

    /// Concrete players, in turn order starting after `player` for opponents.
    #[must_use]
    pub fn resolve(self, state: &GameState, player: PlayerId) -> SmallVec<[PlayerId; 4]> {
        match self {
            Self::You => std::iter::once(player).collect(),
            Self::Opponent => state.opponents(player).into_iter().take(1).collect(),
            Self::Opponents => state.opponents(player).into_iter().collect(),
            Self::Each => state.players.player_ids().collect(),
        }
    }
}

/// A number an effect uses: fixed, or counted from the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    /// Cards in play matching the filter, times the multiplier.
    Count { filter: CardFilter, multiplier: i32 },
}

impl Amount {
    /// Evaluate against the board, relative to `controller` and `source`.
    #[must_use]
    pub fn evaluate(&self, state: &GameState, controller: PlayerId, source: Option<InstanceId>) -> i32 {
        match self {
            Self::Fixed(n) => *n,
            Self::Count { filter, multiplier } => {
                let count = state
                    .cards_in_play()
                    .filter(|card| filter.matches(card, controller, source))
                    .count() as i32;
                count * multiplier
            }
        }
    }

    /// Evaluate, clamped to a non-negative count.
    #[must_use]
    pub fn evaluate_u32(&self, state: &GameState, controller: PlayerId, source: Option<InstanceId>) -> u32 {
        self.evaluate(state, controller, source).max(0) as u32
    }
}

impl From<i32> for Amount {
    fn from(n: i32) -> Self {
        Self::Fixed(n)
    }
}

/// A new-style effect, kept verbatim for the ability executor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedEffect {
    pub kind: String,
    pub params: serde_json::Value,
    /// Legacy translation used when no executor is installed.
    pub fallback: Option<Box<Effect>>,
}

/// An instantaneous effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Composite ===
    Sequence(Vec<Effect>),
    Typed(TypedEffect),
    Conditional {
        condition: Condition,
        then: Box<Effect>,
        otherwise: Option<Box<Effect>>,
    },

    // === Players ===
    Draw { amount: u32, players: PlayerTarget },
    GainLore { amount: Amount, players: PlayerTarget },
    LoseLore { amount: u32, players: PlayerTarget },
    Discard { amount: u32, players: PlayerTarget, random: bool },
    InkFromDeck { amount: u32, exerted: bool },
    ReduceNextCost { amount: u32, filter: CardFilter },
    PlayFreeCard { filter: CardFilter },

    // === Cards ===
    Ready { target: TargetSpec },
    Exert { target: TargetSpec },
    DealDamage { amount: Amount, target: TargetSpec },
    Heal { amount: u32, target: TargetSpec },
    Banish { target: TargetSpec, max_cost: Option<u32> },
    ReturnToHand { target: TargetSpec },
    MoveDamage { amount: u32, from: TargetSpec, to: TargetSpec },
    ReturnFromDiscard { filter: CardFilter, optional: bool },
    Boost { amount: u32 },
    ReadyCantQuest { target: TargetSpec },

    // === Durational ===
    GrantKeyword { keyword: Keyword, target: TargetSpec, duration: Duration },
    StatBuff { stat: Stat, amount: Amount, target: TargetSpec, duration: Duration },
    Restrict { restriction: Restriction, target: TargetSpec, duration: Duration },
    RestrictPlayers { restriction: Restriction, players: PlayerTarget, duration: Duration },

    /// The song's singing requirement. Resolves to nothing.
    SingRequirement { cost: u32 },
}

impl Effect {
    /// Draw cards.
    #[must_use]
    pub fn draw(amount: u32) -> Self {
        Self::Draw {
            amount,
            players: PlayerTarget::You,
        }
    }

    /// Gain lore.
    #[must_use]
    pub fn gain_lore(amount: i32) -> Self {
        Self::GainLore {
            amount: Amount::Fixed(amount),
            players: PlayerTarget::You,
        }
    }

    /// Deal damage to a target.
    #[must_use]
    pub fn deal_damage(amount: i32, target: TargetSpec) -> Self {
        Self::DealDamage {
            amount: Amount::Fixed(amount),
            target,
        }
    }

    /// Strength buff until end of turn.
    #[must_use]
    pub fn strength_this_turn(amount: i32, target: TargetSpec) -> Self {
        Self::StatBuff {
            stat: Stat::Strength,
            amount: Amount::Fixed(amount),
            target,
            duration: Duration::UntilEndOfTurn,
        }
    }

    /// Run effects in order.
    #[must_use]
    pub fn sequence(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self::Sequence(effects.into_iter().collect())
    }

    /// Resolve `then` only if `condition` holds.
    #[must_use]
    pub fn when(condition: Condition, then: Effect) -> Self {
        Self::Conditional {
            condition,
            then: Box::new(then),
            otherwise: None,
        }
    }

    /// Short name used in log records.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Typed(typed) => &typed.kind,
            Self::Conditional { .. } => "conditional_effect",
            Self::Draw { .. } => "draw",
            Self::GainLore { .. } => "gain_lore",
            Self::LoseLore { .. } => "lose_lore",
            Self::Discard { .. } => "discard",
            Self::InkFromDeck { .. } => "ink_from_deck",
            Self::ReduceNextCost { .. } => "reduce_next_cost",
            Self::PlayFreeCard { .. } => "play_free_card",
            Self::Ready { .. } => "ready",
            Self::Exert { .. } => "exert",
            Self::DealDamage { .. } => "deal_damage",
            Self::Heal { .. } => "heal",
            Self::Banish { .. } => "banish",
            Self::ReturnToHand { .. } => "return_to_hand",
            Self::MoveDamage { .. } => "move_damage",
            Self::ReturnFromDiscard { .. } => "return_from_discard",
            Self::Boost { .. } => "boost",
            Self::ReadyCantQuest { .. } => "ready_cant_quest",
            Self::GrantKeyword { .. } => "grant_keyword_temporary",
            Self::StatBuff { .. } => "temp_stat_buff",
            Self::Restrict { .. } => "restrict",
            Self::RestrictPlayers { .. } => "restrict_players",
            Self::SingRequirement { .. } => "sing_requirement",
        }
    }

    /// The single card target of this effect, if it has one.
    #[must_use]
    pub fn card_target(&self) -> Option<&TargetSpec> {
        match self {
            Self::Ready { target }
            | Self::Exert { target }
            | Self::DealDamage { target, .. }
            | Self::Heal { target, .. }
            | Self::Banish { target, .. }
            | Self::ReturnToHand { target }
            | Self::ReadyCantQuest { target }
            | Self::GrantKeyword { target, .. }
            | Self::StatBuff { target, .. }
            | Self::Restrict { target, .. } => Some(target),
            _ => None,
        }
    }

    /// This effect aimed at another target. Effects without a single card
    /// target are returned unchanged.
    #[must_use]
    pub fn retargeted(&self, spec: TargetSpec) -> Effect {
        let mut effect = self.clone();
        match &mut effect {
            Self::Ready { target }
            | Self::Exert { target }
            | Self::DealDamage { target, .. }
            | Self::Heal { target, .. }
            | Self::Banish { target, .. }
            | Self::ReturnToHand { target }
            | Self::ReadyCantQuest { target }
            | Self::GrantKeyword { target, .. }
            | Self::StatBuff { target, .. }
            | Self::Restrict { target, .. } => *target = spec,
            _ => {}
        }
        effect
    }

    /// Find the singing requirement inside this effect, if any.
    #[must_use]
    pub fn sing_requirement(&self) -> Option<u32> {
        match self {
            Self::SingRequirement { cost } => Some(*cost),
            Self::Sequence(effects) => effects.iter().find_map(Effect::sing_requirement),
            _ => None,
        }
    }

    /// This effect with every singing requirement marker removed.
    #[must_use]
    pub fn without_sing_requirement(&self) -> Option<Effect> {
        match self {
            Self::SingRequirement { .. } => None,
            Self::Sequence(effects) => {
                let kept: Vec<_> = effects.iter().filter_map(Effect::without_sing_requirement).collect();
                if kept.is_empty() {
                    None
                } else {
                    Some(Self::Sequence(kept))
                }
            }
            other => Some(other.clone()),
        }
    }
}

/// Cards selected ahead of resolution by the caller (e.g. what to discard).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPayload {
    pub selected: SmallVec<[InstanceId; 2]>,
}

impl EffectPayload {
    #[must_use]
    pub fn with_selected(selected: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            selected: selected.into_iter().collect(),
        }
    }
}

/// Who is resolving an effect, from where, and at what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub player: PlayerId,
    pub source: Option<InstanceId>,
    /// Target supplied by the caller. Checked against the effect's filter
    /// and Ward before use.
    pub target: Option<InstanceId>,
    pub payload: EffectPayload,
}

impl Invocation {
    /// An invocation by `player` with no source or target.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            source: None,
            target: None,
            payload: EffectPayload::default(),
        }
    }

    #[must_use]
    pub fn from_source(mut self, source: InstanceId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn targeting(mut self, target: InstanceId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: EffectPayload) -> Self {
        self.payload = payload;
        self
    }

    /// The same invocation aimed at a resolved card.
    #[must_use]
    pub fn retarget(&self, target: InstanceId) -> Self {
        Self {
            target: Some(target),
            ..self.clone()
        }
    }
}
