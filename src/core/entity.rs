//! Entity identification.
//!
//! Every card in a game has a unique `InstanceId`, allocated by the
//! `GameState` when the card is created. Active effects get an `EffectId`.
//!
//! ## ID Layout
//!
//! Durational effects take ids from a monotonically increasing counter.
//! While-active effects are rebuilt on every reconciliation pass, so they
//! take ids from a per-pass sequence starting at `EffectId::WHILE_ACTIVE_BASE`.
//! Rebuilding them therefore always yields the same ids.
//!
//! ```
//! use lore_engine::core::{EffectId, InstanceId};
//!
//! let card = InstanceId(10);
//! assert_eq!(card.raw(), 10);
//!
//! let rebuilt = EffectId::while_active(0);
//! assert!(rebuilt.is_while_active());
//! assert!(!EffectId(7).is_while_active());
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Parse an instance id from its choice-option form.
    ///
    /// ```
    /// use lore_engine::core::InstanceId;
    ///
    /// assert_eq!(InstanceId::parse_option("12"), Some(InstanceId(12)));
    /// assert_eq!(InstanceId::parse_option("x"), None);
    /// ```
    #[must_use]
    pub fn parse_option(id: &str) -> Option<Self> {
        id.parse().ok().map(Self)
    }

    /// Render this id as a choice-option id.
    #[must_use]
    pub fn option_id(self) -> String {
        self.0.to_string()
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Unique identifier for an active (continuous) effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u64);

impl EffectId {
    /// First id used for while-active effects.
    pub const WHILE_ACTIVE_BASE: u64 = 1 << 48;

    /// Id for the `seq`-th while-active effect built in a reconciliation pass.
    #[must_use]
    pub const fn while_active(seq: u64) -> Self {
        Self(Self::WHILE_ACTIVE_BASE + seq)
    }

    /// Check if this id was allocated for a while-active effect.
    #[must_use]
    pub const fn is_while_active(self) -> bool {
        self.0 >= Self::WHILE_ACTIVE_BASE
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_option_round_trip() {
        let id = InstanceId(42);
        assert_eq!(InstanceId::parse_option(&id.option_id()), Some(id));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InstanceId(42)), "Card#42");
        assert_eq!(format!("{}", EffectId(3)), "Effect(3)");
    }

    #[test]
    fn test_while_active_ids() {
        assert_eq!(EffectId::while_active(0).0, EffectId::WHILE_ACTIVE_BASE);
        assert!(EffectId::while_active(5).is_while_active());
        assert!(!EffectId(EffectId::WHILE_ACTIVE_BASE - 1).is_while_active());
    }

    #[test]
    fn test_serialization() {
        let id = InstanceId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: InstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
