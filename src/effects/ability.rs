//! Card abilities.
//!
//! An `Ability` is one parsed entry of a card's rules text. It is either
//! static (re-evaluated on every reconciliation pass), activated (paid for
//! and used by its controller) or triggered (resolved when a lifecycle
//! event happens to the card).

use serde::{Deserialize, Serialize};

use super::effect::{Amount, Effect, PlayerTarget};
use crate::cards::{CardFilter, Keyword, Stat};
use crate::triggers::Condition;

/// Events a triggered ability can respond to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    OnPlay,
    OnQuest,
    OnStartTurn,
    OnEndTurn,
    OnBanish,
    OnChallenge,
}

impl TriggerKind {
    /// Parse a trigger name as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "on_play" | "play" | "when_played" => Some(Self::OnPlay),
            "on_quest" | "quest" | "whenever_quests" => Some(Self::OnQuest),
            "on_start_turn" | "start_of_turn" | "start_turn" => Some(Self::OnStartTurn),
            "on_end_turn" | "end_of_turn" | "end_turn" => Some(Self::OnEndTurn),
            "on_banish" | "banished" | "when_banished" => Some(Self::OnBanish),
            "on_challenge" | "challenges" | "whenever_challenges" => Some(Self::OnChallenge),
            _ => None,
        }
    }
}

/// A cost paid to use an activated ability.
///
/// Costs are always paid in the order exert, ink, discard, banish self,
/// and only after every one of them has been validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cost {
    Exert,
    Ink(u32),
    Discard(u32),
    BanishSelf,
}

impl Cost {
    /// Position in the payment order.
    #[must_use]
    pub fn payment_order(&self) -> u8 {
        match self {
            Self::Exert => 0,
            Self::Ink(_) => 1,
            Self::Discard(_) => 2,
            Self::BanishSelf => 3,
        }
    }
}

/// Which cards a static modification applies to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum StaticTarget {
    /// The card carrying the ability.
    #[default]
    SelfOnly,
    /// Every card in play matching the filter, relative to the card's owner.
    Cards(CardFilter),
}

/// Static abilities whose exact shape predates the generic
/// `Modify`/`GrantKeyword` form. They are still produced by the parser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LegacyStatic {
    CantPlaySongs { players: PlayerTarget },
    CantChallenge { target: StaticTarget },
    ConditionalCantReady { condition: Condition },
    ReduceCost { amount: u32, filter: CardFilter },
    ReduceMoveCost { amount: u32 },
    BuffSubtype { filter: CardFilter, stat: Stat, amount: i32 },
    ConditionalLoreBonus { condition: Condition, amount: i32 },
    LorePerOpposingDamaged { amount: i32 },
    BuffAllCharacters { filter: CardFilter, stat: Stat, amount: i32 },
    ConditionalStatBuff { condition: Condition, stat: Stat, amount: i32 },
    GrantKeywordToOthers { keyword: Keyword, filter: CardFilter },
    ConditionalGrantKeywords { condition: Condition, keywords: Vec<Keyword> },
    DynamicStatPerCount { stat: Stat, amount: Amount },
    ModifyLoreGoal { amount: i32, players: PlayerTarget },
}

/// One sub-effect of a static ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StaticEffect {
    /// Permanent `Resist +N`.
    Resist(u32),
    Modify {
        stat: Stat,
        amount: Amount,
        target: StaticTarget,
        condition: Option<Condition>,
    },
    GrantKeyword {
        keyword: Keyword,
        target: StaticTarget,
        condition: Option<Condition>,
    },
    Legacy(LegacyStatic),
}

/// What kind of ability this is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilityKind {
    Static(Vec<StaticEffect>),
    Activated { costs: Vec<Cost>, effect: Effect },
    Triggered { trigger: TriggerKind, effect: Effect },
}

/// A parsed card ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: Option<String>,
    /// Set when the ability is a keyword (Boost, Singer, ...).
    pub keyword: Option<Keyword>,
    /// The ability only functions while this holds.
    pub condition: Option<Condition>,
    pub kind: AbilityKind,
}

impl Ability {
    /// A static ability.
    #[must_use]
    pub fn static_ability(effects: Vec<StaticEffect>) -> Self {
        Self {
            name: None,
            keyword: None,
            condition: None,
            kind: AbilityKind::Static(effects),
        }
    }

    /// An activated ability. Costs are sorted into payment order.
    #[must_use]
    pub fn activated(mut costs: Vec<Cost>, effect: Effect) -> Self {
        costs.sort_by_key(Cost::payment_order);
        Self {
            name: None,
            keyword: None,
            condition: None,
            kind: AbilityKind::Activated { costs, effect },
        }
    }

    /// A triggered ability.
    #[must_use]
    pub fn triggered(trigger: TriggerKind, effect: Effect) -> Self {
        Self {
            name: None,
            keyword: None,
            condition: None,
            kind: AbilityKind::Triggered { trigger, effect },
        }
    }

    /// `Boost N`: pay N ink to put the top card of your deck under this card.
    #[must_use]
    pub fn boost(cost: u32) -> Self {
        Self::activated(vec![Cost::Ink(cost)], Effect::Boost { amount: 1 }).with_keyword(Keyword::Boost(cost))
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.kind, AbilityKind::Static(_))
    }

    #[must_use]
    pub fn is_boost(&self) -> bool {
        matches!(self.keyword, Some(Keyword::Boost(_)))
    }

    /// Trigger kind, for triggered abilities.
    #[must_use]
    pub fn trigger(&self) -> Option<TriggerKind> {
        match &self.kind {
            AbilityKind::Triggered { trigger, .. } => Some(*trigger),
            _ => None,
        }
    }

    /// The effect resolved when the ability is used or triggers.
    #[must_use]
    pub fn effect(&self) -> Option<&Effect> {
        match &self.kind {
            AbilityKind::Activated { effect, .. } | AbilityKind::Triggered { effect, .. } => Some(effect),
            AbilityKind::Static(_) => None,
        }
    }

    /// Static sub-effects, for static abilities.
    #[must_use]
    pub fn static_effects(&self) -> &[StaticEffect] {
        match &self.kind {
            AbilityKind::Static(effects) => effects,
            _ => &[],
        }
    }
}
