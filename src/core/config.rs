//! Engine configuration.
//!
//! Games configure the engine at startup with an `EngineConfig`. The
//! defaults match the printed rules; tests and variants override them
//! with the builder methods.

use serde::{Deserialize, Serialize};

/// Complete engine configuration.
///
/// ```
/// use lore_engine::core::EngineConfig;
///
/// let config = EngineConfig::new(2).with_lore_goal(15);
/// assert_eq!(config.default_lore_goal, 15);
/// assert_eq!(config.default_song_cost, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Lore needed to win unless a static ability changes it.
    pub default_lore_goal: u32,

    /// Cost a singer must meet when a song carries no explicit requirement.
    pub default_song_cost: u32,

    /// Cards drawn into each opening hand.
    pub starting_hand_size: usize,

    /// Nested effects deeper than this are skipped.
    pub max_effect_depth: u32,

    /// Does the first player draw on the very first turn?
    pub draw_on_first_turn: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            default_lore_goal: 20,
            default_song_cost: 3,
            starting_hand_size: 7,
            max_effect_depth: 16,
            draw_on_first_turn: false,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for `player_count` players.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Set the default lore goal.
    #[must_use]
    pub fn with_lore_goal(mut self, goal: u32) -> Self {
        self.default_lore_goal = goal;
        self
    }

    /// Set the default song requirement.
    #[must_use]
    pub fn with_song_cost(mut self, cost: u32) -> Self {
        self.default_song_cost = cost;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_starting_hand(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the nesting limit for effect resolution.
    #[must_use]
    pub fn with_max_effect_depth(mut self, depth: u32) -> Self {
        self.max_effect_depth = depth;
        self
    }

    /// Let the first player draw on turn one.
    #[must_use]
    pub fn draw_on_first_turn(mut self) -> Self {
        self.draw_on_first_turn = true;
        self
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, crate::core::EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.default_lore_goal, 20);
        assert_eq!(config.default_song_cost, 3);
        assert!(!config.draw_on_first_turn);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new(3)
            .with_lore_goal(25)
            .with_song_cost(4)
            .with_starting_hand(5)
            .with_max_effect_depth(4)
            .draw_on_first_turn();

        assert_eq!(config.player_count, 3);
        assert_eq!(config.default_lore_goal, 25);
        assert_eq!(config.default_song_cost, 4);
        assert_eq!(config.starting_hand_size, 5);
        assert_eq!(config.max_effect_depth, 4);
        assert!(config.draw_on_first_turn);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{ "default_lore_goal": 12 }"#).unwrap();
        assert_eq!(config.default_lore_goal, 12);
        assert_eq!(config.default_song_cost, 3);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_zero_players() {
        EngineConfig::new(0);
    }
}
