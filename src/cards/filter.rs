//! Card filters.
//!
//! A `CardFilter` describes a set of cards relative to a controlling
//! player and an optional source card: "your other Hero characters",
//! "opposing damaged characters", "an action card with cost 3 or less".
//! Filters are used for targeting, counting, static ability scopes and
//! cost reductions.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::instance::{CardInstance, CardType};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;

/// Whose cards a filter considers, relative to the controlling player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerScope {
    #[default]
    Any,
    Yours,
    Opponents,
}

impl OwnerScope {
    /// Parse a scope as it appears in card data.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "all" | "any" | "each" => Some(Self::Any),
            "yours" | "your" | "mine" | "self" | "you" => Some(Self::Yours),
            "opponent" | "opponents" | "opponent's" | "opposing" => Some(Self::Opponents),
            _ => None,
        }
    }

    /// Does a card owned by `owner` fall in this scope for `controller`?
    #[must_use]
    pub fn includes(self, owner: PlayerId, controller: PlayerId) -> bool {
        match self {
            Self::Any => true,
            Self::Yours => owner == controller,
            Self::Opponents => owner != controller,
        }
    }
}

/// A predicate over cards.
///
/// ```
/// use lore_engine::cards::{CardFilter, CardInstance};
/// use lore_engine::core::{InstanceId, PlayerId};
///
/// let filter = CardFilter::characters().yours().with_subtype("Hero");
/// let card = CardInstance::character(InstanceId(1), PlayerId::new(0), "Ace", 2, 2, 2, 1)
///     .with_subtype("Hero");
///
/// assert!(filter.matches(&card, PlayerId::new(0), None));
/// assert!(!filter.matches(&card, PlayerId::new(1), None));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFilter {
    pub owner: OwnerScope,
    pub card_type: Option<CardType>,
    /// Any of these subtypes. Empty means no subtype requirement.
    pub subtypes: SmallVec<[String; 2]>,
    pub name: Option<String>,
    pub max_cost: Option<u32>,
    /// Exclude the source card ("your other characters").
    pub exclude_source: bool,
    pub damaged: Option<bool>,
    pub exerted: Option<bool>,
}

impl CardFilter {
    /// Match every card.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Match characters.
    #[must_use]
    pub fn characters() -> Self {
        Self::of_type(CardType::Character)
    }

    /// Match one card type.
    #[must_use]
    pub fn of_type(card_type: CardType) -> Self {
        Self {
            card_type: Some(card_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn yours(mut self) -> Self {
        self.owner = OwnerScope::Yours;
        self
    }

    #[must_use]
    pub fn opponents(mut self) -> Self {
        self.owner = OwnerScope::Opponents;
        self
    }

    #[must_use]
    pub fn owned_by(mut self, scope: OwnerScope) -> Self {
        self.owner = scope;
        self
    }

    #[must_use]
    pub fn other(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn max_cost(mut self, cost: u32) -> Self {
        self.max_cost = Some(cost);
        self
    }

    #[must_use]
    pub fn damaged(mut self, damaged: bool) -> Self {
        self.damaged = Some(damaged);
        self
    }

    #[must_use]
    pub fn exerted(mut self, exerted: bool) -> Self {
        self.exerted = Some(exerted);
        self
    }

    /// Check a card against this filter.
    #[must_use]
    pub fn matches(&self, card: &CardInstance, controller: PlayerId, source: Option<InstanceId>) -> bool {
        if !self.owner.includes(card.owner, controller) {
            return false;
        }
        if self.exclude_source && source == Some(card.instance_id) {
            return false;
        }
        if self.card_type.is_some_and(|t| t != card.card_type) {
            return false;
        }
        if !self.subtypes.is_empty() && !self.subtypes.iter().any(|s| card.has_subtype(s)) {
            return false;
        }
        if self.name.as_ref().is_some_and(|n| !card.name.eq_ignore_ascii_case(n)) {
            return false;
        }
        if self.max_cost.is_some_and(|max| card.cost > max) {
            return false;
        }
        if self.damaged.is_some_and(|d| d != card.is_damaged()) {
            return false;
        }
        if self.exerted.is_some_and(|e| e == card.ready) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u32, owner: u8) -> CardInstance {
        CardInstance::character(InstanceId(id), PlayerId::new(owner), "Unit", 3, 2, 2, 1)
    }

    #[test]
    fn test_owner_scope() {
        let mine = card(1, 0);
        let theirs = card(2, 1);
        let me = PlayerId::new(0);

        assert!(CardFilter::any().yours().matches(&mine, me, None));
        assert!(!CardFilter::any().yours().matches(&theirs, me, None));
        assert!(CardFilter::any().opponents().matches(&theirs, me, None));
        assert!(CardFilter::any().matches(&theirs, me, None));
    }

    #[test]
    fn test_exclude_source() {
        let c = card(1, 0);
        let filter = CardFilter::characters().yours().other();
        assert!(!filter.matches(&c, PlayerId::new(0), Some(InstanceId(1))));
        assert!(filter.matches(&c, PlayerId::new(0), Some(InstanceId(2))));
        assert!(filter.matches(&c, PlayerId::new(0), None));
    }

    #[test]
    fn test_subtypes_any_of() {
        let c = card(1, 0).with_subtype("Pirate");
        let filter = CardFilter::characters().with_subtype("Hero").with_subtype("pirate");
        assert!(filter.matches(&c, PlayerId::new(0), None));
        assert!(!CardFilter::characters().with_subtype("Hero").matches(&c, PlayerId::new(0), None));
    }

    #[test]
    fn test_state_filters() {
        let mut c = card(1, 1);
        let me = PlayerId::new(0);
        assert!(!CardFilter::characters().damaged(true).matches(&c, me, None));
        c.damage = 1;
        assert!(CardFilter::characters().damaged(true).matches(&c, me, None));

        assert!(CardFilter::characters().exerted(false).matches(&c, me, None));
        c.ready = false;
        assert!(CardFilter::characters().exerted(true).matches(&c, me, None));
    }

    #[test]
    fn test_cost_and_type() {
        let c = card(1, 0);
        assert!(CardFilter::characters().max_cost(3).matches(&c, PlayerId::new(0), None));
        assert!(!CardFilter::characters().max_cost(2).matches(&c, PlayerId::new(0), None));
        assert!(!CardFilter::of_type(CardType::Item).matches(&c, PlayerId::new(0), None));
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(OwnerScope::parse("opponent's"), Some(OwnerScope::Opponents));
        assert_eq!(OwnerScope::parse("mine"), Some(OwnerScope::Yours));
        assert_eq!(OwnerScope::parse("all"), Some(OwnerScope::Any));
        assert_eq!(OwnerScope::parse("nobody"), None);
    }
}
