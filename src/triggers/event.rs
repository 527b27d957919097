//! Lifecycle events.
//!
//! Actions announce what happened through `GameEvent`s. Some events are
//! awaited (the bus gets mutable access to the state and whatever it does
//! finishes before the action continues); others are notifications.

use serde::{Deserialize, Serialize};

use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;

/// Kinds of lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CardInked,
    CardExerted,
    CardQuested,
    LoreGained,
    CardPlayed,
    SongSung,
    AbilityActivated,
    CardMoved,
    CardChallenged,
    CardBanished,
    DamageDealt,
    CardDrawn,
    TurnStarted,
    TurnEnded,
}

impl EventKind {
    /// Whether callers wait for the bus before continuing.
    #[must_use]
    pub fn is_awaited(self) -> bool {
        !matches!(self, Self::CardInked | Self::CardExerted | Self::CardDrawn | Self::DamageDealt)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::CardInked => "card_inked",
            Self::CardExerted => "card_exerted",
            Self::CardQuested => "card_quested",
            Self::LoreGained => "lore_gained",
            Self::CardPlayed => "card_played",
            Self::SongSung => "song_sung",
            Self::AbilityActivated => "ability_activated",
            Self::CardMoved => "card_moved",
            Self::CardChallenged => "card_challenged",
            Self::CardBanished => "card_banished",
            Self::DamageDealt => "damage_dealt",
            Self::CardDrawn => "card_drawn",
            Self::TurnStarted => "turn_started",
            Self::TurnEnded => "turn_ended",
        };
        f.write_str(name)
    }
}

/// A game event with contextual data.
///
/// - `kind`: What happened
/// - `player`: The player who did it
/// - `source`: The card that did it (the quester, the singer, ...)
/// - `target`: The card it happened to (the song, the location, ...)
/// - `value`: A number, where one applies (lore gained, damage dealt)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    pub player: PlayerId,
    pub source: Option<InstanceId>,
    pub target: Option<InstanceId>,
    pub value: Option<i64>,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(kind: EventKind, player: PlayerId) -> Self {
        Self {
            kind,
            player,
            source: None,
            target: None,
            value: None,
        }
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: InstanceId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target card (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: InstanceId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    // === Convenience Constructors ===

    pub fn inked(player: PlayerId, card: InstanceId) -> Self {
        Self::new(EventKind::CardInked, player).with_source(card)
    }

    pub fn exerted(player: PlayerId, card: InstanceId) -> Self {
        Self::new(EventKind::CardExerted, player).with_source(card)
    }

    pub fn quested(player: PlayerId, card: InstanceId) -> Self {
        Self::new(EventKind::CardQuested, player).with_source(card)
    }

    pub fn lore_gained(player: PlayerId, card: Option<InstanceId>, amount: u32) -> Self {
        let event = Self::new(EventKind::LoreGained, player).with_value(i64::from(amount));
        match card {
            Some(card) => event.with_source(card),
            None => event,
        }
    }

    pub fn played(player: PlayerId, card: InstanceId) -> Self {
        Self::new(EventKind::CardPlayed, player).with_source(card)
    }

    pub fn sung(player: PlayerId, singer: InstanceId, song: InstanceId) -> Self {
        Self::new(EventKind::SongSung, player).with_source(singer).with_target(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = GameEvent::new(EventKind::DamageDealt, PlayerId::new(0))
            .with_source(InstanceId(1))
            .with_target(InstanceId(2))
            .with_value(3);

        assert_eq!(event.source, Some(InstanceId(1)));
        assert_eq!(event.target, Some(InstanceId(2)));
        assert_eq!(event.value, Some(3));
    }

    #[test]
    fn test_convenience_constructors() {
        let event = GameEvent::sung(PlayerId::new(1), InstanceId(4), InstanceId(9));
        assert_eq!(event.kind, EventKind::SongSung);
        assert_eq!(event.target, Some(InstanceId(9)));

        let lore = GameEvent::lore_gained(PlayerId::new(0), None, 3);
        assert_eq!(lore.value, Some(3));
        assert!(lore.source.is_none());
    }

    #[test]
    fn test_awaited_kinds() {
        assert!(EventKind::CardQuested.is_awaited());
        assert!(EventKind::SongSung.is_awaited());
        assert!(!EventKind::CardInked.is_awaited());
        assert_eq!(EventKind::LoreGained.to_string(), "lore_gained");
    }
}
