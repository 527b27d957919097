//! Active (continuous) effects.
//!
//! Anything that outlasts the instant it resolved in is recorded as an
//! `ActiveEffect` on the game state rather than written into card stats.
//! Reconciliation reads these records on every pass, so stats always
//! reflect exactly the effects that are still active.
//!
//! ## Durations
//!
//! - `WhileActive`: rebuilt from static abilities on every pass
//! - `UntilEndOfTurn`: removed by `end_turn`
//! - `NextTurnStart`: removed when its controller's next turn starts
//! - `OneUse`: removed once consumed (cost reductions), otherwise at end of turn
//! - `Until(condition)`: removed at a turn boundary once the condition holds

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::effect::Amount;
use crate::cards::{CardFilter, Keyword, Stat};
use crate::core::entity::{EffectId, InstanceId};
use crate::core::player::PlayerId;
use crate::triggers::Condition;

/// How long an active effect lasts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Duration {
    WhileActive,
    UntilEndOfTurn,
    NextTurnStart,
    OneUse,
    Until(Condition),
}

impl Duration {
    /// Parse a duration name as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "while_active" | "static" => Some(Self::WhileActive),
            "until_end_of_turn" | "this_turn" | "end_of_turn" => Some(Self::UntilEndOfTurn),
            "next_turn_start" | "until_next_turn" | "next_turn" => Some(Self::NextTurnStart),
            "one_use" | "once" | "next" => Some(Self::OneUse),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_while_active(&self) -> bool {
        matches!(self, Self::WhileActive)
    }
}

/// Modifications whose value is recomputed on every pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ComputedBuff {
    /// Strength equal to an amount counted now, not when the effect resolved.
    Strength { amount: Amount },
    /// `stat` + `amount` for targets matching the filter.
    BuffSubtype { filter: CardFilter, stat: Stat, amount: i32 },
    /// Lore bonus while the condition holds for the effect's controller.
    ConditionalLoreBonus { condition: Condition, amount: i32 },
    /// Lore bonus per damaged opposing character.
    LorePerOpposingDamaged { amount: i32 },
}

/// A change to cards or players.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modification {
    Stat { stat: Stat, delta: i32 },
    Keyword(Keyword),
    Computed(ComputedBuff),
    /// Cards matching the filter cost less for the targeted players.
    CostReduction { amount: u32, filter: CardFilter },
    /// Moving to a location costs less for the targeted players.
    MoveCostReduction { amount: u32 },
}

/// Something a card or player can't do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    CantQuest,
    CantReady,
    CantChallenge,
    CantPlayActions,
    CantPlaySongs,
}

impl Restriction {
    /// Parse a restriction name as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "cant_quest" => Some(Self::CantQuest),
            "cant_ready" => Some(Self::CantReady),
            "cant_challenge" => Some(Self::CantChallenge),
            "cant_play_actions" => Some(Self::CantPlayActions),
            "cant_play_songs" => Some(Self::CantPlaySongs),
            _ => None,
        }
    }

    /// Does this restriction apply to players rather than cards?
    #[must_use]
    pub fn targets_players(self) -> bool {
        matches!(self, Self::CantPlayActions | Self::CantPlaySongs)
    }
}

/// What an active effect does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Modification(Modification),
    Restriction(Restriction),
}

/// Who an active effect applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// Specific cards.
    Cards(SmallVec<[InstanceId; 2]>),
    /// Every card in play matching the filter, evaluated against the
    /// effect's controller and source each time it is read.
    Scope(CardFilter),
    Players(SmallVec<[PlayerId; 2]>),
}

impl EffectTarget {
    /// Target a single card.
    #[must_use]
    pub fn card(id: InstanceId) -> Self {
        let mut ids = SmallVec::new();
        ids.push(id);
        Self::Cards(ids)
    }

    /// Target a single player.
    #[must_use]
    pub fn player(player: PlayerId) -> Self {
        let mut players = SmallVec::new();
        players.push(player);
        Self::Players(players)
    }

    /// Does this target include a player?
    #[must_use]
    pub fn includes_player(&self, player: PlayerId) -> bool {
        matches!(self, Self::Players(players) if players.contains(&player))
    }
}

/// A continuous effect record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: EffectId,
    pub controller: PlayerId,
    pub source: Option<InstanceId>,
    pub target: EffectTarget,
    pub duration: Duration,
    pub kind: EffectKind,
    pub created_turn: u32,
}

impl ActiveEffect {
    /// A modification record.
    #[must_use]
    pub fn modification(
        id: EffectId,
        controller: PlayerId,
        source: Option<InstanceId>,
        target: EffectTarget,
        duration: Duration,
        modification: Modification,
    ) -> Self {
        Self {
            id,
            controller,
            source,
            target,
            duration,
            kind: EffectKind::Modification(modification),
            created_turn: 0,
        }
    }

    /// A restriction record.
    #[must_use]
    pub fn restriction(
        id: EffectId,
        controller: PlayerId,
        source: Option<InstanceId>,
        target: EffectTarget,
        duration: Duration,
        restriction: Restriction,
    ) -> Self {
        Self {
            id,
            controller,
            source,
            target,
            duration,
            kind: EffectKind::Restriction(restriction),
            created_turn: 0,
        }
    }

    #[must_use]
    pub fn created_on(mut self, turn: u32) -> Self {
        self.created_turn = turn;
        self
    }

    #[must_use]
    pub fn as_modification(&self) -> Option<&Modification> {
        match &self.kind {
            EffectKind::Modification(m) => Some(m),
            EffectKind::Restriction(_) => None,
        }
    }

    #[must_use]
    pub fn as_restriction(&self) -> Option<Restriction> {
        match &self.kind {
            EffectKind::Restriction(r) => Some(*r),
            EffectKind::Modification(_) => None,
        }
    }
}
